use super::load_steps;
use crate::Config;
use anyhow::Result;
use clap::Parser;
use console::style;
use stepwise::{Connection, Migrator};

#[derive(Parser, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    pub(crate) async fn run(self, conn: &mut dyn Connection, config: &Config) -> Result<()> {
        println!();
        println!("  {}", style("Migration Status").cyan().bold().underlined());
        println!();

        let migrator = Migrator::new(load_steps(&config.migration)?)?;
        let status = migrator.status(conn).await?;

        for step in &status.steps {
            let name = format!("{}_{}", step.id, step.name);
            if step.applied {
                println!("  {} {}", style("✓").green().bold(), style(name).dim());
            } else {
                println!("  {} {}", style("•").yellow(), style(name).bold());
            }
        }

        for orphan in &status.orphans {
            println!(
                "  {} {}",
                style("⚠").yellow().bold(),
                style(format!(
                    "{}_{} is applied but missing from the history file",
                    orphan.id(),
                    orphan.name()
                ))
                .yellow()
                .dim()
            );
        }

        let pending = status.pending().count();
        println!();
        if pending == 0 {
            println!("  {}", style("Database is up to date.").green().dim());
        } else {
            println!(
                "  {} {} pending migration(s)",
                style("→").cyan(),
                pending
            );
        }
        println!();

        Ok(())
    }
}
