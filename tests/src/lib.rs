mod exec_log;
pub use exec_log::ExecLog;

mod logging_driver;
pub use logging_driver::{DriverOp, LoggingConnection, LoggingDriver};

mod scripted;
pub use scripted::ScriptedConnection;

mod sqlite;
pub use sqlite::{schema, SchemaEntry};
