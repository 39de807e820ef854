use thiserror::Error;

use crate::DirectoryError;

/// Authentication failure.
///
/// `InvalidToken` deliberately covers malformed, bad-signature and expired
/// tokens alike: the caller gets one undifferentiated signal so validation
/// internals never leak through error shape.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The Authorization header did not use the `Bearer` scheme.
    #[error("invalid authentication scheme")]
    Scheme,

    /// Malformed, badly signed, or expired token.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token verified but its subject no longer exists.
    #[error("user not found")]
    PrincipalNotFound,

    /// The user lookup itself failed (store unreachable etc).
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
