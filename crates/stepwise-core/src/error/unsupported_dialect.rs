use super::Error;

/// Error when a connection reports an engine kind outside the supported set.
///
/// Raised before any statement is sent, so a migration is never run with the
/// wrong dialect's SQL.
#[derive(Debug)]
pub(super) struct UnsupportedDialect {
    kind: Box<str>,
}

impl std::error::Error for UnsupportedDialect {}

impl core::fmt::Display for UnsupportedDialect {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported database: {}", self.kind)
    }
}

impl Error {
    /// Creates an unsupported dialect error for the given engine kind.
    pub fn unsupported_dialect(kind: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedDialect(UnsupportedDialect {
            kind: kind.into().into(),
        }))
    }

    /// Returns `true` if this error is an unsupported dialect error.
    pub fn is_unsupported_dialect(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedDialect(_))
    }
}
