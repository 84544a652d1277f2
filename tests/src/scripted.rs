use crate::{logging_driver::DriverOp, ExecLog};

use std::sync::{Arc, Mutex};
use stepwise_core::{
    async_trait,
    driver::{Capability, Connection, Dialect},
    migration::AppliedMigration,
    Error, Result,
};

/// A connection with no database behind it. Every statement succeeds unless
/// it was registered with [`fail_on`](ScriptedConnection::fail_on).
///
/// The engine kind is free-form, so it can stand in for engines stepwise does
/// not support.
#[derive(Debug)]
pub struct ScriptedConnection {
    engine_kind: String,
    failing: Vec<String>,
    ledger: Vec<AppliedMigration>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl ScriptedConnection {
    pub fn new(engine_kind: impl Into<String>) -> Self {
        Self {
            engine_kind: engine_kind.into(),
            failing: Vec::new(),
            ledger: Vec::new(),
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reject `sql` with a driver error when it is executed.
    pub fn fail_on(mut self, sql: impl Into<String>) -> Self {
        self.failing.push(sql.into());
        self
    }

    pub fn exec_log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn engine_kind(&self) -> &str {
        &self.engine_kind
    }

    fn capability(&self) -> &'static Capability {
        match Dialect::from_engine_kind(&self.engine_kind) {
            Ok(Dialect::Mysql) => &Capability::MYSQL,
            Ok(Dialect::Postgresql) => &Capability::POSTGRESQL,
            _ => &Capability::SQLITE,
        }
    }

    async fn exec(&mut self, sql: &str) -> Result<u64> {
        let ok = !self.failing.iter().any(|failing| failing == sql);

        self.ops_log.lock().unwrap().push(DriverOp {
            sql: sql.to_string(),
            ok,
        });

        if ok {
            Ok(0)
        } else {
            Err(Error::driver_operation_failed(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("rejected by script: {sql}"),
            )))
        }
    }

    async fn ensure_ledger(&mut self) -> Result<()> {
        Ok(())
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>> {
        Ok(self.ledger.clone())
    }

    async fn record_migration(&mut self, id: u64, name: &str) -> Result<()> {
        self.ledger.push(AppliedMigration::new(id, name));
        self.ledger.sort_by_key(AppliedMigration::id);
        Ok(())
    }

    async fn forget_migration(&mut self, id: u64) -> Result<()> {
        self.ledger.retain(|migration| migration.id() != id);
        Ok(())
    }
}
