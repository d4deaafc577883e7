//! JSON file storage implementation

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::storage::{KeyValueStore, VariantRecord};
use crate::domain::DomainError;

type Document = HashMap<String, VariantRecord>;

/// Stores every key in a single JSON document on disk.
///
/// The document has the shape `{ "<key>": { "<test>": "<variant>" } }`. A
/// missing file reads as empty. Writes go to a sibling temporary file which is
/// then renamed over the original.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, DomainError> {
        match self.read_contents()? {
            Some(contents) => self.parse(&contents),
            None => Ok(Document::new()),
        }
    }

    /// Raw file contents, `None` when the file is missing or blank
    fn read_contents(&self) -> Result<Option<String>, DomainError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn parse(&self, contents: &str) -> Result<Document, DomainError> {
        serde_json::from_str(contents).map_err(|e| {
            DomainError::storage(format!("Failed to parse '{}': {}", self.path.display(), e))
        })
    }

    fn write_document(&self, document: &Document) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| DomainError::storage(format!("Failed to serialize records: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::storage(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).map_err(|e| {
            DomainError::storage(format!("Failed to write '{}': {}", temp_path.display(), e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            DomainError::storage(format!(
                "Failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read-modify-write of the whole document under the write lock
    fn update<T>(&self, apply: impl FnOnce(&mut Document) -> T) -> Result<T, DomainError> {
        let _guard = self.write_lock.lock().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        // Unparseable contents are replaced; I/O failures abort the write.
        let mut document = match self.read_contents()? {
            Some(contents) => self.parse(&contents).unwrap_or_default(),
            None => Document::new(),
        };
        let result = apply(&mut document);
        self.write_document(&document)?;
        Ok(result)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<VariantRecord>, DomainError> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, record: &VariantRecord) -> Result<(), DomainError> {
        self.update(|document| {
            document.insert(key.to_string(), record.clone());
        })
    }

    fn remove(&self, key: &str) -> Result<bool, DomainError> {
        if !self.path.exists() {
            return Ok(false);
        }
        self.update(|document| document.remove(key).is_some())
    }
}
