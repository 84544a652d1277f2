use super::load_steps;
use crate::{theme::dialoguer_theme, Config};
use anyhow::Result;
use clap::Parser;
use console::style;
use dialoguer::Confirm;
use stepwise::{Connection, Migrator};

#[derive(Parser, Debug)]
pub struct RevertCommand {
    /// Number of applied migrations to revert, newest first
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Revert without asking for confirmation
    #[arg(short, long)]
    yes: bool,
}

impl RevertCommand {
    pub(crate) async fn run(self, conn: &mut dyn Connection, config: &Config) -> Result<()> {
        println!();
        println!("  {}", style("Revert Migrations").cyan().bold().underlined());
        println!();

        let migrator = Migrator::new(load_steps(&config.migration)?)?;
        let applied = migrator.applied(conn, self.count).await?;

        if applied.is_empty() {
            println!(
                "  {}",
                style("No applied migrations to revert.").magenta().dim()
            );
            println!();
            return Ok(());
        }

        for step in &applied {
            println!("  {} {}", style("←").yellow(), step.qualified_name());
        }
        println!();

        if !self.yes {
            let confirmed = Confirm::with_theme(&dialoguer_theme())
                .with_prompt(format!("  Revert {} migration(s)?", applied.len()))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("  {}", style("Nothing reverted").dim());
                println!();
                return Ok(());
            }
        }

        for step in &applied {
            println!(
                "  {} Reverting migration: {}",
                style("←").yellow(),
                style(step.qualified_name()).bold()
            );

            migrator.revert(conn, step).await?;

            println!(
                "  {} {}",
                style("✓").green().bold(),
                style(format!("Reverted: {}", step.qualified_name())).dim()
            );
        }

        println!();
        println!(
            "  {}",
            style(format!(
                "Successfully reverted {} migration(s)",
                applied.len()
            ))
            .green()
            .bold()
        );
        println!();

        Ok(())
    }
}
