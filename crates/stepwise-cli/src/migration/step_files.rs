use super::{HistoryFile, HistoryFileMigration, MigrationConfig};

use anyhow::Result;
use std::fs;
use stepwise::{migration::split_script, Branch, Direction, Error, MigrationStep};

/// Build the step for a history entry from its statement files.
pub fn load_step(config: &MigrationConfig, migration: &HistoryFileMigration) -> Result<MigrationStep> {
    let mut step = MigrationStep::new(migration.id, &migration.name);

    for &dialect in &migration.engines {
        let read = |direction: Direction| -> Result<_> {
            let path = config.get_statements_file_path(migration, dialect, direction);
            if !path.exists() {
                return Err(Error::invalid_migration(format!(
                    "{}: missing statement file {}",
                    migration.qualified_name(),
                    path.display()
                ))
                .into());
            }
            Ok(split_script(&fs::read_to_string(&path)?))
        };

        let up = read(Direction::Up)?;
        let down = read(Direction::Down)?;
        step = step.branch(dialect, Branch::new(up, down));
    }

    Ok(step)
}

/// Load every step listed in the history file.
pub fn load_steps(config: &MigrationConfig) -> Result<Vec<MigrationStep>> {
    let path = config.get_history_file_path();
    let history = HistoryFile::load_or_default(&path)?;
    tracing::debug!(
        path = %path.display(),
        count = history.migrations().len(),
        "loading migration steps"
    );

    history
        .migrations()
        .iter()
        .map(|migration| load_step(config, migration))
        .collect()
}

/// Create empty statement files for a new history entry.
pub(crate) fn scaffold_step(config: &MigrationConfig, migration: &HistoryFileMigration) -> Result<()> {
    fs::create_dir_all(config.get_step_dir(migration))?;

    for &dialect in &migration.engines {
        for direction in [Direction::Up, Direction::Down] {
            fs::write(
                config.get_statements_file_path(migration, dialect, direction),
                "",
            )?;
        }
    }

    Ok(())
}
