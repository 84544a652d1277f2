use crate::ExecLog;

use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};
use stepwise_core::{
    async_trait,
    driver::{Capability, Connection, Driver},
    migration::AppliedMigration,
    Result,
};

#[derive(Debug)]
pub struct LoggingDriver {
    inner: Box<dyn Driver>,

    /// Statements sent through every connection opened by this driver
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl LoggingDriver {
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            inner: driver,
            ops_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn exec_log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    fn url(&self) -> Cow<'_, str> {
        self.inner.url()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection::with_log(
            self.inner.connect().await?,
            self.ops_log.clone(),
        )))
    }
}

/// One `exec` call and whether the database accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOp {
    pub sql: String,
    pub ok: bool,
}

/// A connection wrapper that records every statement passed to `exec`.
///
/// Ledger calls are forwarded without being logged.
#[derive(Debug)]
pub struct LoggingConnection {
    inner: Box<dyn Connection>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
}

impl LoggingConnection {
    pub fn new(inner: Box<dyn Connection>) -> Self {
        Self::with_log(inner, Arc::new(Mutex::new(Vec::new())))
    }

    fn with_log(inner: Box<dyn Connection>, ops_log: Arc<Mutex<Vec<DriverOp>>>) -> Self {
        Self { inner, ops_log }
    }

    pub fn exec_log(&self) -> ExecLog {
        ExecLog::new(self.ops_log.clone())
    }
}

#[async_trait]
impl Connection for LoggingConnection {
    fn engine_kind(&self) -> &str {
        self.inner.engine_kind()
    }

    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    async fn exec(&mut self, sql: &str) -> Result<u64> {
        let result = self.inner.exec(sql).await;

        self.ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(DriverOp {
                sql: sql.to_string(),
                ok: result.is_ok(),
            });

        result
    }

    async fn ensure_ledger(&mut self) -> Result<()> {
        self.inner.ensure_ledger().await
    }

    async fn applied_migrations(&mut self) -> Result<Vec<AppliedMigration>> {
        self.inner.applied_migrations().await
    }

    async fn record_migration(&mut self, id: u64, name: &str) -> Result<()> {
        self.inner.record_migration(id, name).await
    }

    async fn forget_migration(&mut self, id: u64) -> Result<()> {
        self.inner.forget_migration(id).await
    }
}
