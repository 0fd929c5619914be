//! Cancellation token and the shared single-slot registry

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Token for cancelling an in-flight stream
///
/// Clones share state: cancelling any clone cancels all of them.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationTokenInner>,
}

struct CancellationTokenInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a new cancellation token
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationTokenInner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Wait until cancellation is requested
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register as a waiter before checking the flag so a concurrent
        // `cancel` between the check and the await is not lost.
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Whether both handles refer to the same token
    pub fn same_token(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Holds at most one live cancellation token
///
/// Starting a stream replaces the registered token without cancelling the
/// previous one, so an older stream keeps running but can no longer be
/// cancelled through the registry. Clones share the same slot.
#[derive(Clone, Default)]
pub struct CancellationRegistry {
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl CancellationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh token and register it, replacing any previous one
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        self.register(token.clone());
        token
    }

    /// Register an existing token, replacing any previous one
    ///
    /// Returns the token that was replaced, if any.
    pub fn register(&self, token: CancellationToken) -> Option<CancellationToken> {
        self.slot.lock().replace(token)
    }

    /// Clear the slot if it still holds `token`
    ///
    /// Returns false when a later stream has already replaced it.
    pub fn finish(&self, token: &CancellationToken) -> bool {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(current) if current.same_token(token) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the registered token and clear the slot
    ///
    /// No-op returning false when nothing is registered.
    pub fn cancel(&self) -> bool {
        let token = self.slot.lock().take();
        match token {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a token is currently registered
    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// The currently registered token, if any
    pub fn current(&self) -> Option<CancellationToken> {
        self.slot.lock().clone()
    }
}

impl std::fmt::Debug for CancellationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationRegistry")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancellation_token() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());

        // Multiple cancels are idempotent
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cloned_token_shares_state() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();
        assert!(token1.same_token(&token2));
        assert!(!token1.same_token(&CancellationToken::new()));

        token1.cancel();
        assert!(token2.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future() {
        let token = CancellationToken::new();
        let token_clone = token.clone();

        let handle = tokio::spawn(async move {
            token_clone.cancelled().await;
            "cancelled"
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert_eq!(result, "cancelled");
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already-cancelled token should not block");
    }

    #[test]
    fn test_registry_cancel_without_token_is_noop() {
        let registry = CancellationRegistry::new();
        assert!(!registry.is_active());
        assert!(!registry.cancel());
    }

    #[test]
    fn test_registry_cancel_clears_slot() {
        let registry = CancellationRegistry::new();
        let token = registry.begin();
        assert!(registry.is_active());

        assert!(registry.cancel());
        assert!(token.is_cancelled());
        assert!(!registry.is_active());
        assert!(!registry.cancel());
    }

    #[test]
    fn test_registry_replace_does_not_cancel_previous() {
        let registry = CancellationRegistry::new();
        let first = registry.begin();
        let second = registry.begin();

        assert!(!first.is_cancelled());
        assert!(registry.current().unwrap().same_token(&second));

        // The first stream finishing must not clear the second's registration
        assert!(!registry.finish(&first));
        assert!(registry.is_active());

        registry.cancel();
        assert!(second.is_cancelled());
        assert!(!first.is_cancelled());
    }

    #[test]
    fn test_registry_finish_clears_own_token() {
        let registry = CancellationRegistry::new();
        let token = registry.begin();
        assert!(registry.finish(&token));
        assert!(!registry.is_active());
    }

    #[test]
    fn test_registry_clones_share_slot() {
        let registry = CancellationRegistry::new();
        let handle = registry.clone();
        let token = registry.begin();

        assert!(handle.cancel());
        assert!(token.is_cancelled());
    }
}
