pub mod driver;
pub use driver::{Connection, Dialect, Driver};

mod error;
pub use error::{Error, IntoError};

pub mod migration;
pub use migration::{Branch, Direction, MigrationStep, Statement};

/// A Result type alias that uses stepwise's [`Error`] type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

pub use async_trait::async_trait;
