use super::load_steps;
use crate::Config;
use anyhow::{bail, Result};
use clap::Parser;
use console::style;
use stepwise::{Dialect, Direction, Migrator};
use stepwise_sql::{verify_round_trip, SchemaModel};

#[derive(Parser, Debug)]
pub struct VerifyCommand {
    /// Only verify this dialect's statements
    #[arg(short, long)]
    engine: Option<Dialect>,
}

impl VerifyCommand {
    pub(crate) fn run(self, config: &Config) -> Result<()> {
        println!();
        println!("  {}", style("Verify Migrations").cyan().bold().underlined());
        println!();

        let migrator = Migrator::new(load_steps(&config.migration)?)?;

        for step in migrator.steps() {
            for lint in step.lint() {
                println!(
                    "  {} {}",
                    style("⚠").yellow().bold(),
                    style(format!("{}: {lint}", step.qualified_name()))
                        .yellow()
                        .dim()
                );
            }
        }

        let dialects = match self.engine {
            Some(dialect) => vec![dialect],
            None => Dialect::ALL.to_vec(),
        };

        let mut failures = 0;
        for dialect in dialects {
            failures += verify_dialect(&migrator, dialect);
        }

        println!();
        if failures > 0 {
            bail!("{failures} migration(s) failed verification");
        }

        println!(
            "  {}",
            style("All migrations restore the schema they started from")
                .green()
                .bold()
        );
        println!();
        Ok(())
    }
}

/// Replay every step in order, checking each round trip against the schema
/// built by the steps before it. Returns the number of failing migrations.
///
/// A failed round trip does not stop verification. Replay only stops when a
/// step's `up` statements cannot be applied, since the steps after it have no
/// schema to build on.
fn verify_dialect(migrator: &Migrator, dialect: Dialect) -> usize {
    println!("  {} {}", style("→").cyan(), style(dialect).bold());

    let mut schema = SchemaModel::new();
    let mut failures = 0;

    for step in migrator.steps() {
        if !step.branches().get(dialect).is_applicable() {
            continue;
        }

        let round_trip = verify_round_trip(step, dialect, &schema);
        match &round_trip {
            Ok(report) if report.opaque.is_empty() => {
                println!(
                    "  {} {}",
                    style("✓").green().bold(),
                    style(step.qualified_name()).dim()
                );
            }
            Ok(report) => {
                println!(
                    "  {} {} {}",
                    style("✓").green().bold(),
                    style(step.qualified_name()).dim(),
                    style(format!("({} statement(s) not modeled)", report.opaque.len()))
                        .yellow()
                        .dim()
                );
            }
            Err(err) => {
                println!("  {} {}", style("✖").red().bold(), style(err).red());
                failures += 1;
            }
        }

        // Later steps build on this one's schema
        for statement in step.branches().get(dialect).statements(Direction::Up) {
            if let Err(err) = schema.replay(dialect, statement) {
                if round_trip.is_ok() {
                    println!("  {} {}", style("✖").red().bold(), style(err).red());
                    failures += 1;
                }
                println!(
                    "  {} {}",
                    style("…").yellow(),
                    style(format!("skipping the migrations after {}", step.qualified_name())).dim()
                );
                return failures;
            }
        }
    }

    failures
}
