//! migrate::cancel
//!
//! Cooperative cancellation for long-running migrations.
//!
//! A [`CancelHandle`] flips a `tokio::sync::watch` flag; every
//! [`CancelToken`] cloned from the same pair observes it. Work is wrapped in
//! [`CancelToken::race`], which drops the in-flight future as soon as the
//! flag is set.

use std::future::Future;

use tokio::sync::watch;

/// Sender side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Receiver side of a cancellation pair. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        // No receivers left means nobody is listening; nothing to do.
        let _ = self.tx.send(true);
    }
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        cancel_pair().1
    }

    /// Token cancelled by Ctrl-C. Must be called inside a tokio runtime.
    pub fn ctrl_c() -> Self {
        let (handle, token) = cancel_pair();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        });
        token
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the flag is set. Never resolves if the handle is gone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Run `fut` unless cancelled first. Returns `None` on cancellation.
    pub async fn race<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
