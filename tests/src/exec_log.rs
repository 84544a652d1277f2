use crate::logging_driver::DriverOp;
use std::sync::{Arc, Mutex};

/// A view of the statements a [`LoggingConnection`](crate::LoggingConnection)
/// has executed
#[derive(Debug, Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<DriverOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<DriverOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged statements
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// All logged statements, in execution order
    pub fn statements(&self) -> Vec<String> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .map(|op| op.sql.clone())
            .collect()
    }

    /// Logged statements, skipping transaction control
    pub fn migration_statements(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| !matches!(sql.as_str(), "BEGIN" | "COMMIT" | "ROLLBACK"))
            .collect()
    }

    /// The statements the database rejected
    pub fn failures(&self) -> Vec<String> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| !op.ok)
            .map(|op| op.sql.clone())
            .collect()
    }

    /// Clear the log
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }
}
