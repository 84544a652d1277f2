use super::{step_files::scaffold_step, HistoryFile, HistoryFileMigration};
use crate::Config;
use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use stepwise::{Dialect, Direction};

#[derive(Parser, Debug)]
pub struct NewCommand {
    /// Descriptive name, e.g. AlterTableOrganizationTeamEmployee
    label: String,

    /// Dialects to create statement files for (defaults to all)
    #[arg(short, long = "engine", value_delimiter = ',')]
    engines: Vec<Dialect>,
}

impl NewCommand {
    pub(crate) fn run(self, config: &Config) -> Result<()> {
        let id = u64::try_from(chrono::Utc::now().timestamp_millis())?;
        let engines = if self.engines.is_empty() {
            Dialect::ALL.to_vec()
        } else {
            self.engines
        };

        let migration = create_step(config, id, &self.label, engines)?;

        println!();
        println!(
            "  {} {}",
            style("✓").green().bold(),
            style(format!("Created migration: {}", migration.qualified_name())).dim()
        );
        for &dialect in &migration.engines {
            for direction in [Direction::Up, Direction::Down] {
                let path =
                    config
                        .migration
                        .get_statements_file_path(&migration, dialect, direction);
                println!("    {}", style(path.display()).dim());
            }
        }
        println!();

        Ok(())
    }
}

/// Scaffold the statement files for a new step and append it to the history.
pub(crate) fn create_step(
    config: &Config,
    id: u64,
    label: &str,
    mut engines: Vec<Dialect>,
) -> Result<HistoryFileMigration> {
    if label.is_empty()
        || !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        bail!("invalid migration name `{label}`; use letters, digits, `_` and `-` only");
    }

    engines.sort();
    engines.dedup();

    let history_path = config.migration.get_history_file_path();
    std::fs::create_dir_all(config.migration.get_migrations_dir())?;
    let mut history = HistoryFile::load_or_default(&history_path)?;

    let migration = HistoryFileMigration::new(id, label, engines);
    history.add_migration(migration.clone())?;
    scaffold_step(&config.migration, &migration)?;
    history.save(&history_path)?;

    Ok(migration)
}
