mod config;
mod migration;
mod theme;
mod utility;

pub use config::*;
pub use migration::*;

use anyhow::Result;
use clap::Parser;

/// stepwise CLI library for building custom command-line tools
#[derive(Debug, Default)]
pub struct StepwiseCli {
    config: Config,
}

impl StepwiseCli {
    /// Create a new StepwiseCli instance with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new StepwiseCli instance with a custom configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse and execute CLI commands from command-line arguments
    pub async fn parse_and_run(&self) -> Result<()> {
        let cli = Cli::parse();
        self.run(cli).await
    }

    /// Parse and execute CLI commands from an iterator of arguments
    pub async fn parse_from<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args)?;
        self.run(cli).await
    }

    async fn run(&self, cli: Cli) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(path) = cli.migrations {
            config.migration = config.migration.migrations_path(path);
        }

        match cli.command {
            Command::Migration(cmd) => cmd.run(cli.url.as_deref(), &config).await,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "stepwise")]
#[command(about = "stepwise - versioned, per-dialect schema migrations")]
#[command(version)]
struct Cli {
    /// Database connection URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    url: Option<String>,

    /// Migrations folder, overriding the configured one
    #[arg(long, global = true)]
    migrations: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Database migration commands
    Migration(migration::MigrationCommand),
}
