use crate::Result;

use std::collections::HashSet;
use stepwise_core::{
    driver::{Connection, Dialect},
    migration::AppliedMigration,
    Direction, Error, MigrationStep,
};

/// Runs a set of migration steps against a database, tracking which ones have
/// been applied in the `__stepwise_migrations` ledger table.
#[derive(Debug, Clone)]
pub struct Migrator {
    /// Sorted by id.
    steps: Vec<MigrationStep>,
}

/// Which known steps the ledger records as applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub steps: Vec<StepStatus>,

    /// Ledger entries with no matching local step.
    pub orphans: Vec<AppliedMigration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStatus {
    pub id: u64,
    pub name: String,
    pub applied: bool,
}

impl Status {
    pub fn pending(&self) -> impl Iterator<Item = &StepStatus> + '_ {
        self.steps.iter().filter(|step| !step.applied)
    }
}

impl Migrator {
    pub fn new(steps: impl IntoIterator<Item = MigrationStep>) -> Result<Self> {
        let mut steps: Vec<_> = steps.into_iter().collect();
        steps.sort_by_key(MigrationStep::id);

        for pair in steps.windows(2) {
            if pair[0].id() == pair[1].id() {
                return Err(Error::invalid_migration(format!(
                    "duplicate migration id {}: {} and {}",
                    pair[0].id(),
                    pair[0].name(),
                    pair[1].name()
                )));
            }
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    fn step(&self, id: u64) -> Option<&MigrationStep> {
        self.steps
            .binary_search_by_key(&id, MigrationStep::id)
            .ok()
            .map(|index| &self.steps[index])
    }

    pub async fn status(&self, conn: &mut dyn Connection) -> Result<Status> {
        conn.ensure_ledger().await?;
        let applied = conn.applied_migrations().await?;
        let applied_ids: HashSet<u64> = applied.iter().map(AppliedMigration::id).collect();

        let steps = self
            .steps
            .iter()
            .map(|step| StepStatus {
                id: step.id(),
                name: step.name().to_string(),
                applied: applied_ids.contains(&step.id()),
            })
            .collect();

        let orphans = applied
            .into_iter()
            .filter(|migration| self.step(migration.id()).is_none())
            .collect();

        Ok(Status { steps, orphans })
    }

    /// Steps not yet recorded in the ledger, in id order.
    pub async fn pending(&self, conn: &mut dyn Connection) -> Result<Vec<&MigrationStep>> {
        // An unsupported engine fails here, before the ledger is touched.
        Dialect::from_engine_kind(conn.engine_kind())?;

        conn.ensure_ledger().await?;
        let applied = conn.applied_migrations().await?;

        for migration in &applied {
            if self.step(migration.id()).is_none() {
                tracing::warn!(
                    id = migration.id(),
                    name = migration.name(),
                    "applied migration has no local step"
                );
            }
        }

        let applied_ids: HashSet<u64> = applied.iter().map(AppliedMigration::id).collect();
        Ok(self
            .steps
            .iter()
            .filter(|step| !applied_ids.contains(&step.id()))
            .collect())
    }

    /// The `count` most recently applied steps, newest first.
    pub async fn applied(
        &self,
        conn: &mut dyn Connection,
        count: usize,
    ) -> Result<Vec<&MigrationStep>> {
        Dialect::from_engine_kind(conn.engine_kind())?;

        conn.ensure_ledger().await?;
        let applied = conn.applied_migrations().await?;

        applied
            .iter()
            .rev()
            .take(count)
            .map(|migration| {
                self.step(migration.id()).ok_or_else(|| {
                    Error::invalid_migration(format!(
                        "migration {}_{} is applied but not known locally",
                        migration.id(),
                        migration.name()
                    ))
                })
            })
            .collect()
    }

    /// Apply every pending step in id order. Returns the steps applied.
    pub async fn up(&self, conn: &mut dyn Connection) -> Result<Vec<&MigrationStep>> {
        let pending = self.pending(conn).await?;

        for step in &pending {
            self.apply(conn, step).await?;
        }

        Ok(pending)
    }

    /// Revert the `count` most recently applied steps, newest first. Returns
    /// the steps reverted.
    pub async fn down(
        &self,
        conn: &mut dyn Connection,
        count: usize,
    ) -> Result<Vec<&MigrationStep>> {
        let applied = self.applied(conn, count).await?;

        for step in &applied {
            self.revert(conn, step).await?;
        }

        Ok(applied)
    }

    /// Run one step's `up` statements and record it in the ledger.
    pub async fn apply(&self, conn: &mut dyn Connection, step: &MigrationStep) -> Result<()> {
        transact(conn, step, Direction::Up)
            .await
            .map_err(|err| err.context(Error::migration_failed(step.qualified_name(), Direction::Up)))?;

        tracing::info!(migration = %step.qualified_name(), "applied migration");
        Ok(())
    }

    /// Run one step's `down` statements and remove it from the ledger.
    pub async fn revert(&self, conn: &mut dyn Connection, step: &MigrationStep) -> Result<()> {
        transact(conn, step, Direction::Down)
            .await
            .map_err(|err| {
                err.context(Error::migration_failed(
                    step.qualified_name(),
                    Direction::Down,
                ))
            })?;

        tracing::info!(migration = %step.qualified_name(), "reverted migration");
        Ok(())
    }
}

/// Run the step and update the ledger, inside a transaction when the
/// database can roll DDL back.
async fn transact(
    conn: &mut dyn Connection,
    step: &MigrationStep,
    direction: Direction,
) -> Result<()> {
    if !conn.capability().transactional_ddl {
        return run_and_record(conn, step, direction).await;
    }

    tracing::debug!("opening migration transaction");
    conn.exec("BEGIN").await?;

    match run_and_record(&mut *conn, step, direction).await {
        Ok(()) => {
            tracing::debug!("committing migration transaction");
            conn.exec("COMMIT").await?;
            Ok(())
        }
        Err(err) => {
            tracing::debug!("rolling back migration transaction");
            if let Err(rollback) = conn.exec("ROLLBACK").await {
                tracing::warn!(error = %rollback, "failed to roll back migration transaction");
            }
            Err(err)
        }
    }
}

async fn run_and_record(
    conn: &mut dyn Connection,
    step: &MigrationStep,
    direction: Direction,
) -> Result<()> {
    step.run(&mut *conn, direction).await?;

    match direction {
        Direction::Up => conn.record_migration(step.id(), step.name()).await,
        Direction::Down => conn.forget_migration(step.id()).await,
    }
}
