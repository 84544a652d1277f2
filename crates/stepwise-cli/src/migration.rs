mod apply;
mod config;
mod history_file;
mod new;
mod revert;
mod status;
mod step_files;
mod verify;

pub use apply::*;
pub use config::*;
pub use history_file::*;
pub use new::*;
pub use revert::*;
pub use status::*;
pub use step_files::{load_step, load_steps};
pub use verify::*;

use crate::{utility::redact_url_password, Config};
use anyhow::{anyhow, Result};
use clap::Parser;
use console::style;
use stepwise::{Connect, Connection, Driver};

#[derive(Parser, Debug)]
pub struct MigrationCommand {
    #[command(subcommand)]
    subcommand: MigrationSubcommand,
}

#[derive(Parser, Debug)]
enum MigrationSubcommand {
    /// Create a new, empty migration step
    New(NewCommand),

    /// Apply all pending migrations
    Apply(ApplyCommand),

    /// Revert the most recently applied migrations
    Revert(RevertCommand),

    /// Show which migrations have been applied
    Status(StatusCommand),

    /// Check that every migration's down statements undo its up statements
    Verify(VerifyCommand),
}

impl MigrationCommand {
    pub(crate) async fn run(self, url: Option<&str>, config: &Config) -> Result<()> {
        match self.subcommand {
            MigrationSubcommand::New(cmd) => cmd.run(config),
            MigrationSubcommand::Apply(cmd) => {
                let mut conn = connect(url).await?;
                cmd.run(&mut *conn, config).await
            }
            MigrationSubcommand::Revert(cmd) => {
                let mut conn = connect(url).await?;
                cmd.run(&mut *conn, config).await
            }
            MigrationSubcommand::Status(cmd) => {
                let mut conn = connect(url).await?;
                cmd.run(&mut *conn, config).await
            }
            MigrationSubcommand::Verify(cmd) => cmd.run(config),
        }
    }
}

async fn connect(url: Option<&str>) -> Result<Box<dyn Connection>> {
    let url = url.ok_or_else(|| anyhow!("no database URL; pass --url or set DATABASE_URL"))?;
    let driver = Connect::new(url)?;

    println!(
        "  {} Connecting to {}",
        style("→").cyan(),
        style(redact_url_password(url)).dim()
    );

    Ok(driver.connect().await?)
}
