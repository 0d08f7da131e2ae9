//! Cancellation token shared between a controller and its host.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Callback = Box<dyn FnOnce() + Send>;

/// A flag plus an optional callback, both fixed at construction.
///
/// `cancel` sets the flag and runs the callback once, on the calling thread.
/// Clones share state.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    on_cancel: Mutex<Option<Callback>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                on_cancel: Mutex::new(Some(Box::new(on_cancel))),
            }),
        }
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let callback = self
            .inner
            .on_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn callback_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let token = CancelToken::with_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        clone.cancel();
        assert!(clone.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn plain_token_cancels_without_callback() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
