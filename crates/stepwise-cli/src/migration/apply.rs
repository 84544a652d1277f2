use super::load_steps;
use crate::Config;
use anyhow::Result;
use clap::Parser;
use console::style;
use stepwise::{Connection, Migrator};

#[derive(Parser, Debug)]
pub struct ApplyCommand {}

impl ApplyCommand {
    pub(crate) async fn run(self, conn: &mut dyn Connection, config: &Config) -> Result<()> {
        println!();
        println!("  {}", style("Apply Migrations").cyan().bold().underlined());
        println!();

        let migrator = Migrator::new(load_steps(&config.migration)?)?;

        if migrator.steps().is_empty() {
            println!(
                "  {}",
                style("No migrations found in history file.")
                    .magenta()
                    .dim()
            );
            println!();
            return Ok(());
        }

        let pending = migrator.pending(conn).await?;

        if pending.is_empty() {
            println!(
                "  {}",
                style("All migrations are already applied. Database is up to date.")
                    .green()
                    .dim()
            );
            println!();
            return Ok(());
        }

        let pending_count = pending.len();
        println!(
            "  {} Found {} pending migration(s) to apply",
            style("→").cyan(),
            pending_count
        );
        println!();

        for step in pending {
            println!(
                "  {} Applying migration: {}",
                style("→").cyan(),
                style(step.qualified_name()).bold()
            );

            migrator.apply(conn, step).await?;

            println!(
                "  {} {}",
                style("✓").green().bold(),
                style(format!("Applied: {}", step.qualified_name())).dim()
            );
        }

        println!();
        println!(
            "  {}",
            style(format!(
                "Successfully applied {} migration(s)",
                pending_count
            ))
            .green()
            .bold()
        );
        println!();

        Ok(())
    }
}
