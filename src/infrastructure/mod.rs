//! Infrastructure layer - Storage backends, engine and logging

pub mod experiment;
pub mod logging;
pub mod services;
pub mod storage;
