//! In-memory backend for tests and offline tooling
//!
//! Behaves like the real backend at the request/response boundary: it keeps a
//! stored password and a held credential, reports `locked` while incognito data
//! is inaccessible, and fails the way a remote service would. Writes can be
//! paused so callers can observe an operation while it is in flight.

use crate::{Error, Password, Result, SessionStatus, StatusClient, StatusOperation};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use zeroize::Zeroizing;

/// Number of calls that reached the mock, per operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MockCallCounts {
    /// `query_status` calls
    pub query: u32,
    /// `enable` calls
    pub enable: u32,
    /// `disable` calls
    pub disable: u32,
    /// `unlock` calls
    pub unlock: u32,
    /// `lock` calls
    pub lock: u32,
}

impl MockCallCounts {
    /// Total number of write calls
    pub fn writes(&self) -> u32 {
        self.enable + self.disable + self.unlock + self.lock
    }

    fn record(&mut self, op: StatusOperation) {
        let slot = match op {
            StatusOperation::Query => &mut self.query,
            StatusOperation::Enable => &mut self.enable,
            StatusOperation::Disable => &mut self.disable,
            StatusOperation::Unlock => &mut self.unlock,
            StatusOperation::Lock => &mut self.lock,
        };
        *slot = slot.saturating_add(1);
    }
}

#[derive(Default)]
struct MockBackend {
    incognito: bool,
    stored_password: Option<Zeroizing<String>>,
    credential_held: bool,
    unreachable: bool,
    enable_rejection: Option<String>,
    counts: MockCallCounts,
}

impl MockBackend {
    fn status(&self) -> SessionStatus {
        SessionStatus::new(self.incognito, self.incognito && !self.credential_held)
    }
}

/// Mock status client
pub struct MockStatusClient {
    backend: Mutex<MockBackend>,
    writes_paused: watch::Sender<bool>,
}

impl MockStatusClient {
    /// Backend with incognito mode off
    pub fn new() -> Self {
        let (writes_paused, _) = watch::channel(false);
        Self {
            backend: Mutex::new(MockBackend::default()),
            writes_paused,
        }
    }

    /// Backend that starts in incognito mode, locked behind `password`
    pub fn with_password(password: &str) -> Self {
        let client = Self::new();
        {
            let mut backend = client.backend.lock();
            backend.incognito = true;
            backend.stored_password = Some(Zeroizing::new(password.to_string()));
        }
        client
    }

    /// Make every operation fail with a transport error
    pub fn set_unreachable(&self, unreachable: bool) {
        self.backend.lock().unreachable = unreachable;
    }

    /// Reject `enable` with the given policy message
    pub fn reject_enable(&self, reason: Option<String>) {
        self.backend.lock().enable_rejection = reason;
    }

    /// Hold write operations until [`resume_writes`](Self::resume_writes)
    pub fn pause_writes(&self) {
        self.writes_paused.send_replace(true);
    }

    /// Release paused write operations
    pub fn resume_writes(&self) {
        self.writes_paused.send_replace(false);
    }

    /// Current backend-side status
    pub fn status(&self) -> SessionStatus {
        self.backend.lock().status()
    }

    /// Calls received so far
    pub fn call_counts(&self) -> MockCallCounts {
        self.backend.lock().counts
    }

    async fn enter(&self, op: StatusOperation) -> Result<()> {
        self.backend.lock().counts.record(op);
        tracing::debug!("Mock backend received {}", op);

        if op.is_write() {
            let mut paused = self.writes_paused.subscribe();
            paused
                .wait_for(|paused| !*paused)
                .await
                .map_err(|e| Error::Transport(format!("mock backend closed: {}", e)))?;
        }

        if self.backend.lock().unreachable {
            return Err(Error::Transport(format!("{} failed: backend unreachable", op)));
        }
        Ok(())
    }
}

impl Default for MockStatusClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusClient for MockStatusClient {
    async fn query_status(&self) -> Result<SessionStatus> {
        self.enter(StatusOperation::Query).await?;
        Ok(self.backend.lock().status())
    }

    async fn enable(&self, password: &Password) -> Result<()> {
        self.enter(StatusOperation::Enable).await?;
        let mut backend = self.backend.lock();

        if let Some(reason) = backend.enable_rejection.clone() {
            return Err(Error::Rejected(reason));
        }

        backend.incognito = true;
        backend.stored_password = Some(Zeroizing::new(password.expose().to_string()));
        backend.credential_held = true;
        Ok(())
    }

    async fn disable(&self) -> Result<()> {
        self.enter(StatusOperation::Disable).await?;
        let mut backend = self.backend.lock();
        backend.incognito = false;
        backend.stored_password = None;
        backend.credential_held = false;
        Ok(())
    }

    async fn unlock(&self, password: &Password) -> Result<()> {
        self.enter(StatusOperation::Unlock).await?;
        let mut backend = self.backend.lock();

        if !backend.incognito {
            return Err(Error::Rejected("Incognito mode is not enabled".to_string()));
        }

        let matches = backend
            .stored_password
            .as_ref()
            .is_some_and(|stored| stored.as_str() == password.expose());
        if !matches {
            return Err(Error::InvalidCredential);
        }

        backend.credential_held = true;
        Ok(())
    }

    async fn lock(&self) -> Result<()> {
        self.enter(StatusOperation::Lock).await?;
        self.backend.lock().credential_held = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(secret: &str) -> Password {
        Password::new(secret).unwrap()
    }

    #[tokio::test]
    async fn test_enable_unlock_lock_cycle() {
        let client = MockStatusClient::new();
        assert_eq!(client.query_status().await.unwrap(), SessionStatus::new(false, false));

        client.enable(&pw("secret")).await.unwrap();
        assert_eq!(client.status(), SessionStatus::new(true, false));

        client.lock().await.unwrap();
        assert_eq!(client.status(), SessionStatus::new(true, true));

        client.unlock(&pw("secret")).await.unwrap();
        assert_eq!(client.status(), SessionStatus::new(true, false));

        client.disable().await.unwrap();
        assert_eq!(client.status(), SessionStatus::new(false, false));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credential() {
        let client = MockStatusClient::with_password("correct");
        let err = client.unlock(&pw("wrong")).await.unwrap_err();
        assert!(err.is_invalid_credential());
        assert!(client.status().locked);
    }

    #[tokio::test]
    async fn test_unreachable_is_transport() {
        let client = MockStatusClient::with_password("correct");
        client.set_unreachable(true);

        assert!(client.query_status().await.unwrap_err().is_transport());
        assert!(client.unlock(&pw("correct")).await.unwrap_err().is_transport());
        assert_eq!(client.call_counts().query, 1);
        assert_eq!(client.call_counts().unlock, 1);
    }

    #[tokio::test]
    async fn test_enable_rejection() {
        let client = MockStatusClient::new();
        client.reject_enable(Some("policy".to_string()));

        let err = client.enable(&pw("secret")).await.unwrap_err();
        assert!(matches!(err, Error::Rejected(ref reason) if reason == "policy"));
        assert!(!client.status().incognito);
    }

    #[test]
    fn test_call_counts_writes() {
        let mut counts = MockCallCounts::default();
        counts.record(StatusOperation::Query);
        counts.record(StatusOperation::Unlock);
        counts.record(StatusOperation::Lock);
        assert_eq!(counts.writes(), 2);
        assert_eq!(counts.query, 1);
    }
}
