//! Error types
//!
//! One taxonomy shared by the backend boundary, the session controller and
//! the dialogs that drive it. Client-side validation never reaches the
//! transport; transport faults and credential rejections stay distinguishable
//! all the way up to the unlock challenge.

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Incognito session errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend unreachable or failed unexpectedly
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend refused the supplied password
    #[error("Invalid credential")]
    InvalidCredential,

    /// Backend policy rejected the request
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// Input failed client-side validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Write attempted before the initial status load completed
    #[error("Session status not loaded yet")]
    NotInitialized,

    /// Another transition is already in flight
    #[error("Another operation is in progress")]
    Busy,

    /// Local configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrong password, as opposed to any transport or policy fault
    pub fn is_invalid_credential(&self) -> bool {
        matches!(self, Self::InvalidCredential)
    }

    /// Backend could not be reached or answered unexpectedly
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Raised before any backend call was made
    pub fn is_client_side(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotInitialized | Self::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::InvalidCredential.is_invalid_credential());
        assert!(!Error::InvalidCredential.is_transport());

        let transport = Error::Transport("connection refused".to_string());
        assert!(transport.is_transport());
        assert!(!transport.is_invalid_credential());
        assert!(!transport.is_client_side());

        assert!(Error::Validation("empty".to_string()).is_client_side());
        assert!(Error::NotInitialized.is_client_side());
        assert!(Error::Busy.is_client_side());
        assert!(!Error::Rejected("policy".to_string()).is_client_side());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::Transport("timeout".to_string()).to_string(),
            "Transport error: timeout"
        );
        assert_eq!(Error::InvalidCredential.to_string(), "Invalid credential");
    }
}
