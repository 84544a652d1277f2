use super::HistoryFileMigration;

use std::path::PathBuf;
use stepwise::{Dialect, Direction};

/// Configuration for migration operations
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Path to the migrations folder
    pub migrations_path: PathBuf,

    /// Name of the history file inside the migrations folder
    pub history_file: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_path: PathBuf::from("migrations"),
            history_file: "history.toml".to_string(),
        }
    }
}

impl MigrationConfig {
    /// Create a new MigrationConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the migrations path
    pub fn migrations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.migrations_path = path.into();
        self
    }

    /// Set the history file name
    pub fn history_file(mut self, name: impl Into<String>) -> Self {
        self.history_file = name.into();
        self
    }

    pub fn get_migrations_dir(&self) -> PathBuf {
        self.migrations_path.clone()
    }

    pub fn get_history_file_path(&self) -> PathBuf {
        self.migrations_path.join(&self.history_file)
    }

    /// Directory holding one step's statement files, `<id>_<name>`.
    pub fn get_step_dir(&self, migration: &HistoryFileMigration) -> PathBuf {
        self.migrations_path
            .join(format!("{}_{}", migration.id, migration.name))
    }

    /// Statement file for one dialect and direction, e.g. `mysql.up.sql`.
    pub fn get_statements_file_path(
        &self,
        migration: &HistoryFileMigration,
        dialect: Dialect,
        direction: Direction,
    ) -> PathBuf {
        self.get_step_dir(migration)
            .join(format!("{dialect}.{direction}.sql"))
    }
}
