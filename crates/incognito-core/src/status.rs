//! Backend-authoritative session status

use serde::{Deserialize, Serialize};

/// Incognito session status as reported by the backend
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether incognito mode is active
    pub incognito: bool,
    /// Whether the credential protecting incognito data is missing
    pub locked: bool,
}

impl SessionStatus {
    /// Create a status from its two flags
    pub const fn new(incognito: bool, locked: bool) -> Self {
        Self { incognito, locked }
    }

    /// Status substituted when the backend cannot be read.
    ///
    /// An unreachable backend is never taken as permission to show protected
    /// data, so the substitute is the most restrictive combination.
    pub const fn fail_closed() -> Self {
        Self {
            incognito: true,
            locked: true,
        }
    }

    /// `locked` only counts while incognito mode is on.
    pub fn is_effectively_locked(&self) -> bool {
        self.incognito && self.locked
    }
}
