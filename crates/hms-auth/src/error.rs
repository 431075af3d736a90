//! Authentication error types.

use hms_core::error::HmsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for HmsError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                HmsError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::WeakPassword { .. } => HmsError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => HmsError::Crypto(msg),
        }
    }
}
