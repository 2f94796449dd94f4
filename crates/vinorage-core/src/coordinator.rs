// ── Poll coordinator ──
//
// Single authoritative cache of the controller's state. Refreshes run on a
// cancellable ticker and on demand; at most one fetch is in flight per
// coordinator and every caller that arrives meanwhile awaits that same fetch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vinorage_api::{DeviceStatus, VinorageClient};

use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::state::{RefreshEvent, RefreshState};
use crate::stream::StateStream;

const EVENT_CHANNEL_SIZE: usize = 64;

type RefreshResult = Result<Arc<DeviceStatus>, CoreError>;
type InFlightRefresh = Shared<BoxFuture<'static, RefreshResult>>;

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the polling schedule and the cached [`DeviceStatus`].
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Construct with
/// [`new()`](Self::new), then call [`setup()`](Self::setup) to perform the
/// first refresh and start polling; call [`shutdown()`](Self::shutdown)
/// when the owning entry is unloaded.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    client: VinorageClient,
    state: watch::Sender<Arc<RefreshState>>,
    event_tx: broadcast::Sender<RefreshEvent>,
    in_flight: Mutex<Option<InFlightRefresh>>,
    cancel: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator around an existing device client. Does no I/O.
    pub fn new(config: CoordinatorConfig, client: VinorageClient) -> Self {
        let client = client.with_timeout(config.timeout);
        let (state, _) = watch::channel(Arc::new(RefreshState::default()));
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                state,
                event_tx,
                in_flight: Mutex::new(None),
                cancel: CancellationToken::new(),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a coordinator whose device client uses the host-owned `http`
    /// client.
    pub fn with_http(config: CoordinatorConfig, http: reqwest::Client) -> Result<Self, CoreError> {
        let client = VinorageClient::with_client(http, config.host.clone())?;
        Ok(Self::new(config, client))
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// The device client, for issuing commands.
    pub fn client(&self) -> &VinorageClient {
        &self.inner.client
    }

    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Perform the first refresh and start the poll ticker.
    ///
    /// The first refresh must succeed; its error is returned as-is and no
    /// ticker is started. With a zero poll interval the coordinator is set up
    /// without a ticker and only refreshes on demand.
    pub async fn setup(&self) -> RefreshResult {
        let snapshot = self.refresh_now().await?;

        if self.inner.config.polling_enabled() {
            let mut handles = self.inner.task_handles.lock().await;
            if handles.is_empty() {
                handles.push(tokio::spawn(poll_task(
                    Arc::downgrade(&self.inner),
                    self.inner.config.poll_interval,
                    self.inner.cancel.clone(),
                )));
            }
        }

        info!(
            host = %self.host(),
            interval_secs = self.inner.config.poll_interval.as_secs(),
            "coordinator ready"
        );
        Ok(snapshot)
    }

    /// Stop polling and refuse further refreshes.
    ///
    /// Cancels and joins the ticker and waits out any refresh in flight, so
    /// no tick fires and no state is published after this returns.
    pub async fn shutdown(&self) {
        // Cancelled under the in-flight lock: a refresh either published
        // before this point or sees the cancellation before publishing.
        let in_flight = {
            let mut slot = lock(&self.inner.in_flight);
            self.inner.cancel.cancel();
            slot.take()
        };

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if let Some(refresh) = in_flight {
            let _ = refresh.await;
        }
        info!(host = %self.host(), "coordinator shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch the device state now.
    ///
    /// If a refresh is already running, waits for it instead of starting a
    /// second fetch; every joined caller receives the same result. The fetch
    /// runs on its own task, so it completes and publishes even when every
    /// caller stops waiting for it.
    pub async fn refresh_now(&self) -> RefreshResult {
        let refresh = {
            let mut slot = lock(&self.inner.in_flight);
            if self.is_shut_down() {
                return Err(CoreError::Shutdown {
                    host: self.host().to_owned(),
                });
            }

            if let Some(running) = slot.as_ref() {
                debug!(host = %self.host(), "joining in-flight refresh");
                running.clone()
            } else {
                let refresh = spawn_refresh(Arc::clone(&self.inner));
                *slot = Some(refresh.clone());
                refresh
            }
        };

        refresh.await
    }

    /// Timer-driven refresh. Failures are recorded and logged, never returned.
    pub async fn scheduled_tick(&self) {
        let was_healthy = self.state().last_update_success();

        match self.refresh_now().await {
            Ok(snapshot) => {
                if was_healthy {
                    debug!(host = %self.host(), led_brightness = snapshot.led_brightness, "scheduled refresh");
                } else {
                    info!(host = %self.host(), "controller is reachable again");
                }
            }
            Err(CoreError::Shutdown { .. }) => {}
            Err(e) if was_healthy => {
                warn!(host = %self.host(), error = %e, "scheduled refresh failed");
            }
            Err(e) => {
                debug!(host = %self.host(), error = %e, "scheduled refresh still failing");
            }
        }
    }

    /// Refresh in the background, e.g. right after a command changed the
    /// device. The caller does not wait for the outcome.
    pub fn request_refresh(&self) {
        if self.is_shut_down() {
            return;
        }

        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                result = coordinator.refresh_now() => {
                    if let Err(e) = result {
                        debug!(host = %coordinator.host(), error = %e, "requested refresh failed");
                    }
                }
            }
        });
    }

    // ── State observation ────────────────────────────────────────

    /// Last successfully fetched state, or `None` before the first success.
    pub fn current_snapshot(&self) -> Option<Arc<DeviceStatus>> {
        self.inner.state.borrow().snapshot.clone()
    }

    /// The complete published state.
    pub fn state(&self) -> Arc<RefreshState> {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes (latest value semantics).
    pub fn watch_state(&self) -> StateStream {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Subscribe to one [`RefreshEvent`] per completed refresh.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.event_tx.subscribe()
    }
}

impl CoordinatorInner {
    /// The body of the refresh task. Releases the in-flight slot, publishes
    /// the new state, then notifies listeners, all under the in-flight lock.
    async fn run_refresh(&self) -> RefreshResult {
        let host = &self.config.host;
        debug!(%host, "refreshing");

        let fetched = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = self.client.fetch_status() => {
                Some(result.map(Arc::new).map_err(CoreError::from))
            }
        };

        let mut slot = lock(&self.in_flight);
        slot.take();
        let Some(result) = fetched.filter(|_| !self.cancel.is_cancelled()) else {
            debug!(%host, "refresh dropped at shutdown");
            return Err(CoreError::Shutdown { host: host.clone() });
        };

        // Only the refresh task writes the state, so read-then-replace
        // cannot race another writer.
        let previous = self.state.borrow().clone();
        let next = match &result {
            Ok(snapshot) => previous.succeeded(Arc::clone(snapshot)),
            Err(e) => previous.failed(e.clone()),
        };
        let sequence = next.sequence;
        let stale = next.snapshot.clone();
        self.state.send_replace(Arc::new(next));

        let event = match &result {
            Ok(snapshot) => RefreshEvent::Updated {
                sequence,
                snapshot: Arc::clone(snapshot),
            },
            Err(error) => RefreshEvent::Failed {
                sequence,
                error: error.clone(),
                stale,
            },
        };
        let _ = self.event_tx.send(event);
        drop(slot);

        debug!(%host, sequence, ok = result.is_ok(), "refresh complete");
        result
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Invoke `scheduled_tick` every `interval` until cancelled or until the
/// coordinator is gone.
async fn poll_task(inner: Weak<CoordinatorInner>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                let coordinator = Coordinator { inner };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = coordinator.scheduled_tick() => {}
                }
            }
        }
    }

    debug!("poll task stopped");
}

// ── Helpers ──────────────────────────────────────────────────────

/// Start `run_refresh` on its own task and hand back a joinable, shareable
/// handle to its result.
fn spawn_refresh(inner: Arc<CoordinatorInner>) -> InFlightRefresh {
    let host = inner.config.host.clone();
    let task = tokio::spawn(async move { inner.run_refresh().await });

    async move {
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(CoreError::Shutdown { host }),
        }
    }
    .boxed()
    .shared()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
