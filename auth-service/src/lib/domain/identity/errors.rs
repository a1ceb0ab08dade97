use thiserror::Error;

/// Error raised by the user directory backend.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Directory returned an unreadable record: {0}")]
    InvalidRecord(String),
}

/// Error raised by the session store backend.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Why a credential check failed.
///
/// The first three variants are policy outcomes and must be reported to
/// clients as one indistinguishable failure.
#[derive(Debug, Clone, Error)]
pub enum AuthenticationError {
    #[error("Unknown principal: {0}")]
    UnknownPrincipal(String),

    #[error("Account disabled: {0}")]
    AccountDisabled(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Top-level error for gateway operations
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    // Policy outcomes
    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    // Infrastructure errors
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),
}

impl From<AuthenticationError> for GatewayError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::UnknownPrincipal(_)
            | AuthenticationError::AccountDisabled(_)
            | AuthenticationError::InvalidCredentials => GatewayError::AuthenticationFailed,
            AuthenticationError::Directory(e) => GatewayError::Directory(e),
        }
    }
}
