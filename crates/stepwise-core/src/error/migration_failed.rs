use super::Error;
use crate::Direction;

/// Context attached by the runner when a migration step fails.
///
/// The underlying cause (usually a driver error) stays in the chain and is
/// reachable through [`Error::root`].
#[derive(Debug)]
pub(super) struct MigrationFailed {
    migration: Box<str>,
    direction: Direction,
}

impl std::error::Error for MigrationFailed {}

impl core::fmt::Display for MigrationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "migration {} failed ({})", self.migration, self.direction)
    }
}

impl Error {
    /// Creates a migration failure naming the step and the direction it ran in.
    pub fn migration_failed(migration: impl Into<String>, direction: Direction) -> Error {
        Error::from(super::ErrorKind::MigrationFailed(MigrationFailed {
            migration: migration.into().into(),
            direction,
        }))
    }

    /// Returns `true` if this error is a migration failure.
    pub fn is_migration_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::MigrationFailed(_))
    }
}
