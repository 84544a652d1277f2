use super::Error;

/// Error raised by the replay verifier when a statement list is ordered
/// incorrectly or does not restore the schema it started from.
#[derive(Debug)]
pub(super) struct VerificationFailed {
    message: Box<str>,
}

impl std::error::Error for VerificationFailed {}

impl core::fmt::Display for VerificationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "verification failed: {}", self.message)
    }
}

impl Error {
    pub fn verification_failed(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::VerificationFailed(VerificationFailed {
            message: message.into().into(),
        }))
    }

    pub fn is_verification_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::VerificationFailed(_))
    }
}
