//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the SQLite store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the database file. Default: `leadscore.db` in the project root.
    pub database_path: Option<String>,
}

impl StorageConfig {
    /// Returns the effective database path relative to `root`.
    pub fn effective_database_path(&self, root: &std::path::Path) -> PathBuf {
        match &self.database_path {
            Some(p) => {
                let p = PathBuf::from(p);
                if p.is_absolute() {
                    p
                } else {
                    root.join(p)
                }
            }
            None => root.join("leadscore.db"),
        }
    }
}
