mod connect;
pub use connect::Connect;

mod migrator;
pub use migrator::{Migrator, Status, StepStatus};

pub use stepwise_core::migration;
pub use stepwise_core::{
    bail,
    driver::{Capability, Connection, Dialect, Driver},
    err,
    migration::{AppliedMigration, Branch, Direction, Lint, MigrationStep, Statement},
    Error, Result,
};
