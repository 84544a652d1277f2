use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use stepwise::Dialect;

const HISTORY_FILE_VERSION: u32 = 1;

/// History file listing every migration step known to the project, in the
/// order they were created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryFile {
    /// History file format version
    version: u32,

    /// Migration history
    #[serde(default)]
    migrations: Vec<HistoryFileMigration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryFileMigration {
    /// Creation timestamp in milliseconds, also the ordering key.
    pub id: u64,

    /// Migration name, e.g. `AlterTableOrganizationTeamEmployee`.
    pub name: String,

    /// Dialects with statement files. Every other dialect is not applicable.
    #[serde(default)]
    pub engines: Vec<Dialect>,
}

impl HistoryFileMigration {
    pub fn new(id: u64, name: impl Into<String>, engines: Vec<Dialect>) -> Self {
        Self {
            id,
            name: name.into(),
            engines,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }
}

impl HistoryFile {
    /// Create a new empty history file
    pub fn new() -> Self {
        Self {
            version: HISTORY_FILE_VERSION,
            migrations: Vec::new(),
        }
    }

    /// Load a history file from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        contents.parse()
    }

    /// Save the history file to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_string())?;
        Ok(())
    }

    /// Loads the history file, or returns an empty one if it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if std::fs::exists(&path)? {
            return Self::load(path);
        }
        Ok(Self::default())
    }

    pub fn migrations(&self) -> &[HistoryFileMigration] {
        &self.migrations
    }

    /// Add a migration to the history
    pub fn add_migration(&mut self, migration: HistoryFileMigration) -> Result<()> {
        if let Some(existing) = self.migrations.iter().find(|m| m.id == migration.id) {
            bail!(
                "migration id {} is already used by {}",
                migration.id,
                existing.name
            );
        }
        self.migrations.push(migration);
        Ok(())
    }
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for HistoryFile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let file: HistoryFile = toml::from_str(s)?;

        // Validate version
        if file.version != HISTORY_FILE_VERSION {
            bail!(
                "Unsupported history file version: {}. Expected version {}",
                file.version,
                HISTORY_FILE_VERSION
            );
        }

        Ok(file)
    }
}

impl fmt::Display for HistoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toml_str = toml::to_string_pretty(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", toml_str)
    }
}
