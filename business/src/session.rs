//! Authentication session watcher.
//!
//! [`AuthSession`] owns the current [`SessionState`] and publishes every change on a
//! `tokio::sync::watch` channel. Subscribers get the current state once, then each change.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::identity::{AuthFailure, AuthOperation, Identity, IdentityProvider};

/// Whether someone is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    SignedOut,
    SignedIn(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedOut => None,
            Self::SignedIn(identity) => Some(identity),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

/// Session state bound to an identity provider.
#[derive(Clone)]
pub struct AuthSession<P> {
    provider: P,
    state: Arc<watch::Sender<SessionState>>,
}

impl<P: IdentityProvider> AuthSession<P> {
    pub fn new(provider: P) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self {
            provider,
            state: Arc::new(state),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Restores any existing session from the provider.
    ///
    /// A provider failure resolves to [`SessionState::SignedOut`].
    pub async fn start(&self) -> SessionState {
        let state = match self.provider.current().await {
            Ok(Some(identity)) => {
                info!("Restored session for {}", identity.email);
                SessionState::SignedIn(identity)
            }
            Ok(None) => SessionState::SignedOut,
            Err(e) => {
                warn!("Could not restore session: {e}");
                SessionState::SignedOut
            }
        };
        self.publish(state.clone());
        state
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthFailure> {
        match self.provider.sign_in(email, password).await {
            Ok(identity) => {
                self.publish(SessionState::SignedIn(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                warn!("Sign in failed: {e}");
                Err(AuthFailure::from_error(AuthOperation::SignIn, &e))
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthFailure> {
        match self.provider.sign_up(email, password).await {
            Ok(identity) => {
                self.publish(SessionState::SignedIn(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                warn!("Sign up failed: {e}");
                Err(AuthFailure::from_error(AuthOperation::SignUp, &e))
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), AuthFailure> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.publish(SessionState::SignedOut);
                Ok(())
            }
            Err(e) => {
                warn!("Sign out failed: {e}");
                Err(AuthFailure::from_error(AuthOperation::SignOut, &e))
            }
        }
    }

    /// Asks the provider to email a reset link. Leaves the session untouched.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthFailure> {
        self.provider.send_password_reset(email).await.map_err(|e| {
            warn!("Password reset failed: {e}");
            AuthFailure::from_error(AuthOperation::PasswordReset, &e)
        })
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Calls `callback` with the current state, then once for every change.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(&SessionState) + Send + 'static,
    {
        let mut receiver = self.state.subscribe();
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let initial = receiver.borrow_and_update().clone();
            callback(&initial);

            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    changed = receiver.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = receiver.borrow_and_update().clone();
                        callback(&state);
                    }
                }
            }
        });

        Subscription {
            token,
            handle: Some(handle),
        }
    }

    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Handle to a running session subscription. Dropping it stops delivery.
pub struct Subscription {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stops delivery and waits for the watcher task to finish.
    pub async fn unsubscribe(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Session watcher ended abnormally: {e}");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryIdentity;
    use tokio::sync::mpsc;

    fn session() -> AuthSession<MemoryIdentity> {
        AuthSession::new(MemoryIdentity::with_accounts([("a@example.com", "secret1")]))
    }

    #[tokio::test]
    async fn test_start_without_session_is_signed_out() {
        let session = session();
        assert_eq!(session.start().await, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_start_with_provider_outage_is_signed_out() {
        let session = session();
        session.provider().set_unavailable(true);
        assert_eq!(session.start().await, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_in_publishes_identity() {
        let session = session();
        let identity = session.sign_in("a@example.com", "secret1").await.unwrap();
        assert_eq!(session.state(), SessionState::SignedIn(identity.clone()));
        assert_eq!(session.identity(), Some(identity));
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_generic() {
        let session = session();
        let failure = session.sign_in("a@example.com", "wrong").await.unwrap_err();
        assert_eq!(failure, AuthFailure::InvalidCredentials);
        assert_eq!(failure.message(), "Incorrect email or password.");
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_password_reset_keeps_state() {
        let session = session();
        session.sign_in("a@example.com", "secret1").await.unwrap();
        let before = session.state();

        session.send_password_reset("a@example.com").await.unwrap();
        assert_eq!(
            session.send_password_reset("nobody@example.com").await,
            Err(AuthFailure::ResetFailed)
        );
        assert_eq!(session.state(), before);
    }

    #[tokio::test]
    async fn test_subscription_delivers_initial_state_then_changes() {
        let session = session();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = session.subscribe(move |state| {
            let _ = tx.send(state.clone());
        });

        assert_eq!(rx.recv().await, Some(SessionState::SignedOut));

        let identity = session.sign_in("a@example.com", "secret1").await.unwrap();
        assert_eq!(rx.recv().await, Some(SessionState::SignedIn(identity)));

        session.sign_out().await.unwrap();
        assert_eq!(rx.recv().await, Some(SessionState::SignedOut));

        subscription.unsubscribe().await;
        session.sign_in("a@example.com", "secret1").await.unwrap();

        // The watcher task owned the sender; it is gone once unsubscribed.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_delivery() {
        let session = session();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = session.subscribe(move |state| {
            let _ = tx.send(state.clone());
        });
        assert_eq!(rx.recv().await, Some(SessionState::SignedOut));

        drop(subscription);
        session.sign_in("a@example.com", "secret1").await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_repeated_state_is_not_redelivered() {
        let session = session();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = session.subscribe(move |state| {
            let _ = tx.send(state.clone());
        });
        assert_eq!(rx.recv().await, Some(SessionState::SignedOut));

        session.sign_out().await.unwrap();
        session.start().await;
        subscription.unsubscribe().await;

        assert_eq!(rx.recv().await, None);
    }
}
