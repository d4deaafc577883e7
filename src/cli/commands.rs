//! Subcommand execution

use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use super::{Cli, Command};
use crate::config::AppConfig;
use crate::domain::storage::VariantRecord;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::services::ExperimentEngine;
use crate::infrastructure::storage::StorageFactory;

/// Entry point used by the binary
pub fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    let engine = build_engine(&config)?;
    let stdout = io::stdout();
    execute(&engine, &cli.command, &mut stdout.lock())
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::load_from(Some(path))
            .with_context(|| format!("Failed to load configuration from '{}'", path.display())),
        None => Ok(AppConfig::load().unwrap_or_default()),
    }
}

/// Create the storage backend and engine, then apply any start-up migration
pub fn build_engine(config: &AppConfig) -> anyhow::Result<ExperimentEngine> {
    let storage_config = config.storage.storage_config()?;
    let storage = StorageFactory::create(&storage_config)?;
    let engine = ExperimentEngine::new(config.experiments.configuration(), storage);

    if let Some(from) = &config.experiments.migrate_from {
        match engine.migrate(from)? {
            Some(rejected) if !rejected.is_empty() => {
                warn!(from = %from, rejected = rejected.len(), "Some assignments were not migrated");
            }
            Some(_) => info!(from = %from, "Migrated assignments"),
            None => {}
        }
    }

    Ok(engine)
}

/// Run one command against `engine`, writing its output to `out`
pub fn execute(
    engine: &ExperimentEngine,
    command: &Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Variant { test } => {
            writeln!(out, "{}", engine.variant(test)?)?;
        }
        Command::Set { test, variant } => {
            engine.set_variant(test, variant)?;
            writeln!(out, "{}\t{}", test, variant)?;
        }
        Command::IsTest { test } => {
            writeln!(out, "{}", engine.is_test_variant(test)?)?;
        }
        Command::Weights { test } => {
            for (variant, weight) in engine.all_variants_and_weights(test)? {
                writeln!(out, "{}\t{}", variant, weight)?;
            }
        }
        Command::Tests => {
            for test in engine.all_tests() {
                writeln!(out, "{}\t{}", test.name(), test.variants())?;
            }
        }
        Command::Assignments => {
            write_sorted(out, &engine.variants_by_test_name()?, "")?;
        }
        Command::Reset => {
            engine.reset()?;
            writeln!(out, "Assignments reset")?;
        }
        Command::Migrate { from_key } => match engine.migrate(from_key)? {
            None => writeln!(out, "Nothing stored under '{}'", from_key)?,
            Some(rejected) => {
                writeln!(
                    out,
                    "Migrated '{}' into '{}'",
                    from_key,
                    engine.storage_key()
                )?;
                write_sorted(out, &rejected, "rejected\t")?;
            }
        },
    }

    Ok(())
}

fn write_sorted(out: &mut impl Write, record: &VariantRecord, prefix: &str) -> io::Result<()> {
    let mut entries: Vec<_> = record.iter().collect();
    entries.sort();

    for (test, variant) in entries {
        writeln!(out, "{}{}\t{}", prefix, test, variant)?;
    }
    Ok(())
}
