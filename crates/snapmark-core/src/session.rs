//! Session liveness
//!
//! An editor session owns one [`LivenessToken`]. Work that outlives a single
//! call, such as a pending image decode, carries a clone of the token and
//! checks it before touching editor state. Teardown revokes the token, so a
//! decode that finishes after the session closed becomes a no-op.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag marking a session as alive
#[derive(Debug, Clone)]
pub struct LivenessToken {
    alive: Arc<AtomicBool>,
}

impl LivenessToken {
    /// Creates a live token for a new session
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Marks the session as torn down; visible through every clone
    pub fn revoke(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Whether both tokens belong to the same session
    pub fn same_session(&self, other: &LivenessToken) -> bool {
        Arc::ptr_eq(&self.alive, &other.alive)
    }
}

impl Default for LivenessToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_visible_through_clones() {
        let token = LivenessToken::new();
        let pending = token.clone();
        assert!(pending.is_live());

        token.revoke();
        assert!(!pending.is_live());
        assert!(!token.is_live());
    }

    #[test]
    fn test_same_session() {
        let a = LivenessToken::new();
        let b = LivenessToken::new();
        assert!(a.same_session(&a.clone()));
        assert!(!a.same_session(&b));
    }
}
