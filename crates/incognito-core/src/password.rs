//! Secret password handling
//!
//! Passwords live in [`Zeroizing`] buffers so the backing memory is wiped as
//! soon as the value is dropped. `Debug` never prints the secret.

use crate::{Error, Result};
use std::fmt;
use zeroize::Zeroizing;

/// Non-empty secret password
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password, rejecting empty input before anything else sees it
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(Error::Validation("Password must not be empty".to_string()));
        }
        Ok(Self(secret))
    }

    /// Borrow the secret for handing it to the backend
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl TryFrom<&str> for Password {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_rejected() {
        let err = Password::new("").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_whitespace_password_allowed() {
        // Backend decides what counts as weak; only emptiness is checked here
        let password = Password::new(" ").unwrap();
        assert_eq!(password.len(), 1);
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("hunter2").unwrap();
        let debug = format!("{:?}", password);
        assert!(!debug.contains("hunter2"));
        assert_eq!(debug, "Password(<redacted>)");
    }

    #[test]
    fn test_expose() {
        let password = Password::try_from("correct horse").unwrap();
        assert_eq!(password.expose(), "correct horse");
        assert!(!password.is_empty());
    }
}
