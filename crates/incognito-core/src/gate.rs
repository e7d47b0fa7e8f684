//! Access gate decision
//!
//! Pure function of the controller snapshot. The session crate wraps it for
//! presentation; everything testable lives here.

use crate::SessionStatus;

/// What the top-level view should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessDecision {
    /// Initial status not loaded yet
    Loading,
    /// Incognito data is locked; show the unlock challenge
    Challenge,
    /// Render protected content
    Content,
}

impl AccessDecision {
    /// Whether protected content may be shown
    pub fn allows_content(&self) -> bool {
        matches!(self, Self::Content)
    }
}

/// Decide what to render for `status` once `initialized`.
pub fn decide(status: SessionStatus, initialized: bool) -> AccessDecision {
    if !initialized {
        return AccessDecision::Loading;
    }
    if status.is_effectively_locked() {
        AccessDecision::Challenge
    } else {
        AccessDecision::Content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_table() {
        let cases = [
            (false, false, true, AccessDecision::Content),
            (false, true, true, AccessDecision::Content),
            (true, false, true, AccessDecision::Content),
            (true, true, true, AccessDecision::Challenge),
            (true, true, false, AccessDecision::Loading),
            (false, false, false, AccessDecision::Loading),
        ];

        for (incognito, locked, initialized, expected) in cases {
            let status = SessionStatus::new(incognito, locked);
            assert_eq!(decide(status, initialized), expected, "{:?}", status);
        }
    }

    #[test]
    fn test_only_content_allows_content() {
        assert!(AccessDecision::Content.allows_content());
        assert!(!AccessDecision::Challenge.allows_content());
        assert!(!AccessDecision::Loading.allows_content());
    }
}
