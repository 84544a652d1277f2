use super::{Branch, Branches, Direction, Statement};
use crate::{Connection, Dialect, Result};

use std::fmt;

/// A single versioned schema change with a forward and a reverse statement
/// list for each dialect.
///
/// Running `up` then `down` is expected to leave the schema as it was. Nothing
/// here enforces that; see the replay verifier in `stepwise-sql`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    /// Creation timestamp, also the ordering key.
    id: u64,

    /// Descriptive label, e.g. `AlterTableOrganizationTeamEmployee`.
    name: String,

    branches: Branches,
}

/// Authoring issues reported by [`MigrationStep::lint`]. None of them change
/// what the step does at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lint {
    /// The branch has statement lists, but both are empty. Use
    /// [`Branch::NotApplicable`] when a dialect is skipped on purpose.
    EmptyBranch(Dialect),

    /// The branch changes the schema going up but has nothing to undo it.
    IrreversibleBranch(Dialect),

    /// Every dialect is marked not applicable.
    NoApplicableBranch,
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lint::EmptyBranch(dialect) => write!(
                f,
                "{dialect} branch has no statements; mark it not applicable if that is intended"
            ),
            Lint::IrreversibleBranch(dialect) => {
                write!(f, "{dialect} branch has up statements but no down statements")
            }
            Lint::NoApplicableBranch => f.write_str("no dialect branch is applicable"),
        }
    }
}

impl MigrationStep {
    /// Create a step with every branch marked not applicable.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            branches: Branches::default(),
        }
    }

    /// Set the branch for `dialect`.
    pub fn branch(mut self, dialect: Dialect, branch: Branch) -> Self {
        *self.branches.get_mut(dialect) = branch;
        self
    }

    pub fn mysql<U, D>(self, up: U, down: D) -> Self
    where
        U: IntoIterator,
        U::Item: Into<Statement>,
        D: IntoIterator,
        D::Item: Into<Statement>,
    {
        self.branch(Dialect::Mysql, Branch::new(up, down))
    }

    pub fn postgresql<U, D>(self, up: U, down: D) -> Self
    where
        U: IntoIterator,
        U::Item: Into<Statement>,
        D: IntoIterator,
        D::Item: Into<Statement>,
    {
        self.branch(Dialect::Postgresql, Branch::new(up, down))
    }

    pub fn sqlite<U, D>(self, up: U, down: D) -> Self
    where
        U: IntoIterator,
        U::Item: Into<Statement>,
        D: IntoIterator,
        D::Item: Into<Statement>,
    {
        self.branch(Dialect::Sqlite, Branch::new(up, down))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<id>_<name>`, the key operators see in logs and the ledger.
    pub fn qualified_name(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }

    pub fn branches(&self) -> &Branches {
        &self.branches
    }

    /// Pick the statement list to run for a connection's engine kind.
    ///
    /// Fails with an unsupported dialect error when the engine kind is not
    /// one of the supported set.
    pub fn select(&self, engine_kind: &str, direction: Direction) -> Result<&[Statement]> {
        let dialect = Dialect::from_engine_kind(engine_kind)?;
        Ok(self.branches.get(dialect).statements(direction))
    }

    /// Apply the step.
    pub async fn up(&self, conn: &mut dyn Connection) -> Result<()> {
        self.run(conn, Direction::Up).await
    }

    /// Revert the step.
    pub async fn down(&self, conn: &mut dyn Connection) -> Result<()> {
        self.run(conn, Direction::Down).await
    }

    /// Execute the selected statements in order, stopping at the first
    /// failure. Errors are returned as the driver reported them.
    pub async fn run(&self, conn: &mut dyn Connection, direction: Direction) -> Result<()> {
        let statements = self.select(conn.engine_kind(), direction)?;

        tracing::info!(
            migration = %self.qualified_name(),
            %direction,
            engine = conn.engine_kind(),
            statements = statements.len(),
            "{} {}",
            self.name,
            direction.progress_message()
        );

        for (index, statement) in statements.iter().enumerate() {
            tracing::debug!(index, sql = %statement, "executing statement");
            conn.exec(statement.as_str()).await?;
        }

        Ok(())
    }

    /// Report authoring issues across all branches.
    pub fn lint(&self) -> Vec<Lint> {
        let mut lints = Vec::new();

        for (dialect, branch) in self.branches.iter() {
            let up = branch.statements(Direction::Up);
            let down = branch.statements(Direction::Down);

            if !branch.is_applicable() {
                continue;
            }

            if up.is_empty() && down.is_empty() {
                lints.push(Lint::EmptyBranch(dialect));
            } else if down.is_empty() {
                lints.push(Lint::IrreversibleBranch(dialect));
            }
        }

        if !self.branches.iter().any(|(_, branch)| branch.is_applicable()) {
            lints.push(Lint::NoApplicableBranch);
        }

        lints
    }
}
