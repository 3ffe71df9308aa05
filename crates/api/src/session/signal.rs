//! Session state notifications
//!
//! The client never navigates. On a terminal authorization failure it
//! publishes [`SessionState::Expired`] and whoever owns the presentation
//! decides what to do with it.

use std::sync::Arc;
use tokio::sync::watch;

/// Observable session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Both tokens are stored
    Active,
    /// No session, either never logged in or logged out explicitly
    LoggedOut,
    /// The session ended because authorization could not be recovered
    Expired { redirect_to: String },
}

/// Sender side of the session state channel, shared by clones of a client
#[derive(Debug, Clone)]
pub struct SessionSignal {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SessionSignal {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Publish a new state; subscribers are only woken by actual changes
    pub fn publish(&self, state: SessionState) {
        self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_expiry() {
        let signal = SessionSignal::new(SessionState::Active);
        let mut rx = signal.subscribe();

        signal.publish(SessionState::Expired {
            redirect_to: "/login".into(),
        });

        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow(),
            SessionState::Expired {
                redirect_to: "/login".into()
            }
        );
    }

    #[tokio::test]
    async fn unchanged_state_does_not_wake_subscribers() {
        let signal = SessionSignal::new(SessionState::Active);
        let mut rx = signal.subscribe();

        signal.publish(SessionState::Active);
        assert!(!rx.has_changed().unwrap());

        signal.publish(SessionState::LoggedOut);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::LoggedOut);
    }

    #[test]
    fn publishing_without_subscribers_updates_state() {
        let signal = SessionSignal::new(SessionState::LoggedOut);
        signal.publish(SessionState::Active);
        assert_eq!(signal.state(), SessionState::Active);
    }
}
