//! Cooperative cancellation shared by every stage of a run.
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

/// Cloneable cancellation handle.
///
/// Every blocking wait inside the pipeline races [`CancelToken::cancelled`].
/// A token created with [`CancelToken::child`] observes its parent as well,
/// while canceling the child leaves the parent untouched.
///
/// Cancellation is pushed down to live children when it happens, so waiting
/// only ever watches the token's own channel.
#[derive(Clone, Debug)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    tx: watch::Sender<bool>,
    // Keeps intermediate ancestors alive for as long as a descendant is.
    _parent: Option<CancelToken>,
    children: Mutex<Vec<Weak<TokenInner>>>,
}

impl TokenInner {
    fn cancel(&self) {
        if self.tx.send_replace(true) {
            return;
        }
        let children: Vec<Arc<TokenInner>> = self
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .filter_map(|child| child.upgrade())
            .collect();
        for child in children {
            child.cancel();
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<CancelToken>) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(TokenInner {
                tx,
                _parent: parent,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates a token that is canceled together with `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        let child = Self::with_parent(Some(self.clone()));
        {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            children.retain(|known| known.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        // Registered before the check, so a concurrent cancel cannot be missed.
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Cancels this token and all of its children. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.tx.borrow()
    }

    /// Completes once this token or one of its ancestors is canceled.
    pub async fn cancelled(&self) {
        let mut rx = self.inner.tx.subscribe();
        drop(rx.wait_for(|cancelled| *cancelled).await);
    }

    #[cfg(test)]
    fn live_children(&self) -> usize {
        self.inner
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|child| child.strong_count() > 0)
            .count()
    }
}
