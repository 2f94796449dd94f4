// ── Reactive state stream ──
//
// Subscription type for consuming coordinator state changes.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::state::RefreshState;

/// A subscription to the coordinator's published state.
///
/// Provides both point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`. Intermediate
/// versions may be skipped by a slow reader; use
/// [`Coordinator::subscribe`](crate::Coordinator::subscribe) to see every
/// refresh.
pub struct StateStream {
    current: Arc<RefreshState>,
    receiver: watch::Receiver<Arc<RefreshState>>,
}

impl StateStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<RefreshState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The state captured at creation time (or at the last `changed()`).
    pub fn current(&self) -> &Arc<RefreshState> {
        &self.current
    }

    /// The latest published state.
    pub fn latest(&self) -> Arc<RefreshState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new state.
    /// Returns `None` once the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<RefreshState>> {
        self.receiver.changed().await.ok()?;
        let state = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&state);
        Some(state)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current state first, then each new version.
pub struct StateWatchStream {
    inner: WatchStream<Arc<RefreshState>>,
}

impl Stream for StateWatchStream {
    type Item = Arc<RefreshState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
