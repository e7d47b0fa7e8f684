//! Backend request/response contract
//!
//! Five remote operations, each independently failable. Implementations carry
//! no local state; all session state lives in the controller that calls them.

use crate::{Password, Result, SessionStatus};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Remote operation names, used for logging and call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusOperation {
    /// Query status
    Query,
    /// Enable incognito mode
    Enable,
    /// Disable incognito mode
    Disable,
    /// Unlock with password
    Unlock,
    /// Drop the held credential
    Lock,
}

impl StatusOperation {
    /// Operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Query => "query_status",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Unlock => "unlock",
            Self::Lock => "lock",
        }
    }

    /// Whether the operation mutates backend state
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Query)
    }
}

impl fmt::Display for StatusOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status client trait
///
/// Errors follow the shared taxonomy: `Transport` for unreachable or
/// misbehaving backends, `InvalidCredential` only from `unlock`, `Rejected`
/// for backend policy refusals.
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// Read the live session status
    async fn query_status(&self) -> Result<SessionStatus>;

    /// Turn incognito mode on, protected by `password`
    async fn enable(&self, password: &Password) -> Result<()>;

    /// Turn incognito mode off
    async fn disable(&self) -> Result<()>;

    /// Supply the password so incognito data becomes accessible
    async fn unlock(&self, password: &Password) -> Result<()>;

    /// Drop the held credential without leaving incognito mode
    async fn lock(&self) -> Result<()>;
}

#[async_trait]
impl<T: StatusClient + ?Sized> StatusClient for Arc<T> {
    async fn query_status(&self) -> Result<SessionStatus> {
        (**self).query_status().await
    }

    async fn enable(&self, password: &Password) -> Result<()> {
        (**self).enable(password).await
    }

    async fn disable(&self) -> Result<()> {
        (**self).disable().await
    }

    async fn unlock(&self, password: &Password) -> Result<()> {
        (**self).unlock(password).await
    }

    async fn lock(&self) -> Result<()> {
        (**self).lock().await
    }
}
