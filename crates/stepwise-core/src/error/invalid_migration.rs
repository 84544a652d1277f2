use super::Error;

/// Error when a set of migrations cannot be run as given.
///
/// This occurs when:
/// - Two migrations share an id
/// - A history entry points at a migration file that does not exist
/// - The ledger records an applied migration that is not known locally
#[derive(Debug)]
pub(super) struct InvalidMigration {
    message: Box<str>,
}

impl std::error::Error for InvalidMigration {}

impl core::fmt::Display for InvalidMigration {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid migration: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid migration error.
    pub fn invalid_migration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMigration(InvalidMigration {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid migration error.
    pub fn is_invalid_migration(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidMigration(_))
    }
}
