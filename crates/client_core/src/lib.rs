//! Vitals stream reconciler: merges an unbounded incoming event stream into
//! a bounded, surname-sorted window of patient vital records, maintaining a
//! synthetic per-patient step counter across the session.

use std::sync::Arc;

use chrono::{Local, Timelike};
use futures::StreamExt;
use rand::{rngs::StdRng, SeedableRng};
use reqwest::Client;
use shared::domain::VitalRecord;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod accumulator;
pub mod config;
pub mod error;
pub mod quotes;
pub mod sse;
pub mod window;

use accumulator::StepAccumulator;
use config::Settings;
use error::StreamError;
use quotes::{Quote, QuoteRotator};
use sse::SseDecoder;
use window::DisplayWindow;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Reconnecting,
}

/// Events fanned out to presentation consumers. Consumers receive owned
/// snapshots; nothing here aliases reconciler state.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The display window changed; carries the full committed window.
    WindowUpdated(Vec<VitalRecord>),
    ConnectionStatusChanged(ConnectionStatus),
    /// The initial snapshot fetch failed; user-visible message.
    SnapshotFailed(String),
    QuoteChanged(Quote),
}

/// State behind the single-writer lock: the stream task is the only writer
/// of the accumulator and window; every accepted event is fully processed
/// (derivation, merge, commit) before the next one is read.
struct ReconcilerState {
    accumulator: StepAccumulator,
    window: DisplayWindow,
    rng: StdRng,
}

/// The vitals stream reconciler. Bootstraps from the snapshot endpoint,
/// then holds one persistent stream subscription, reconnecting at a fixed
/// delay for as long as the client lives.
pub struct VitalsClient {
    http: Client,
    settings: Settings,
    inner: Mutex<ReconcilerState>,
    events: broadcast::Sender<ClientEvent>,
    stream_task: Mutex<Option<JoinHandle<()>>>,
    quote_task: Mutex<Option<JoinHandle<()>>>,
}

impl VitalsClient {
    pub fn new(settings: Settings) -> Arc<Self> {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Deterministic construction for tests: the derivation samples from
    /// the given seed instead of entropy.
    pub fn with_rng_seed(settings: Settings, seed: u64) -> Arc<Self> {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: Settings, rng: StdRng) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            http: Client::new(),
            settings,
            inner: Mutex::new(ReconcilerState {
                accumulator: StepAccumulator::new(),
                window: DisplayWindow::new(),
                rng,
            }),
            events,
            stream_task: Mutex::new(None),
            quote_task: Mutex::new(None),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Current committed display window.
    pub async fn window(&self) -> Vec<VitalRecord> {
        self.inner.lock().await.window.snapshot()
    }

    /// One-shot bootstrap: fetches the current snapshot record and seeds
    /// the window through the normal merge path. Failure is recoverable and
    /// surfaced as a [`ClientEvent::SnapshotFailed`] message; the caller
    /// should still proceed to [`connect`](Self::connect).
    pub async fn initialize(&self) -> Result<(), StreamError> {
        let url = self.settings.snapshot_url();
        let fetched: Result<VitalRecord, reqwest::Error> = async {
            self.http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        }
        .await;

        match fetched {
            Ok(record) => {
                info!(url, "fetched initial vitals snapshot");
                self.ingest(record).await;
                Ok(())
            }
            Err(err) => {
                let error = StreamError::Snapshot {
                    url,
                    reason: err.to_string(),
                };
                warn!(error = %error, "initial snapshot fetch failed");
                let _ = self
                    .events
                    .send(ClientEvent::SnapshotFailed(error.to_string()));
                Err(error)
            }
        }
    }

    /// Opens the persistent stream subscription in a background task.
    /// Idempotent: a second call while the task is running is a no-op.
    pub async fn connect(self: &Arc<Self>) {
        let mut guard = self.stream_task.lock().await;
        if guard.is_some() {
            return;
        }
        self.set_status(ConnectionStatus::Connecting);
        let client = Arc::clone(self);
        *guard = Some(tokio::spawn(async move { client.run_stream().await }));
    }

    /// Starts the quote rotation timer: one random quote immediately, then
    /// a fresh pick every configured interval.
    pub async fn start_quote_rotation(self: &Arc<Self>) {
        let mut guard = self.quote_task.lock().await;
        if guard.is_some() {
            return;
        }
        let client = Arc::clone(self);
        *guard = Some(tokio::spawn(async move {
            let rotator = QuoteRotator::new();
            let mut rng = StdRng::from_entropy();
            let mut ticker = tokio::time::interval(client.settings.quote_interval);
            loop {
                ticker.tick().await;
                let _ = client
                    .events
                    .send(ClientEvent::QuoteChanged(rotator.random_quote(&mut rng)));
            }
        }));
    }

    /// Tears the client down: the active subscription is closed exactly
    /// once and any pending reconnect timer dies with the task. Safe to
    /// call repeatedly. An in-flight snapshot fetch may still complete; its
    /// result is ignored.
    pub async fn shutdown(&self) {
        if let Some(task) = self.stream_task.lock().await.take() {
            task.abort();
            info!("vitals stream subscription closed");
        }
        if let Some(task) = self.quote_task.lock().await.take() {
            task.abort();
        }
    }

    /// Reconnect-forever loop. The delay is fixed: no backoff growth, no
    /// retry cap.
    async fn run_stream(self: Arc<Self>) {
        loop {
            let err = match self.consume_stream().await {
                Ok(()) => StreamError::Transport("event stream closed by server".into()),
                Err(err) => err,
            };
            warn!(
                error = %err,
                delay_seconds = self.settings.reconnect_delay.as_secs_f64(),
                "vitals stream connection lost, reconnecting"
            );
            self.set_status(ConnectionStatus::Reconnecting);
            tokio::time::sleep(self.settings.reconnect_delay).await;
        }
    }

    /// One subscription attempt: connect, then decode and ingest frames
    /// until the transport fails or the server closes the stream. Malformed
    /// payloads are dropped without ending the subscription.
    async fn consume_stream(&self) -> Result<(), StreamError> {
        let url = self.settings.stream_url();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| StreamError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| StreamError::Transport(err.to_string()))?;

        info!(url, "subscribed to vitals stream");
        self.set_status(ConnectionStatus::Live);

        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| StreamError::Transport(err.to_string()))?;
            for payload in decoder.feed(&chunk) {
                match serde_json::from_str::<VitalRecord>(&payload) {
                    Ok(record) => self.ingest(record).await,
                    Err(err) => {
                        warn!(error = %err, "discarding malformed vitals event");
                    }
                }
            }
        }
        Ok(())
    }

    /// Reconciliation step for one accepted record: re-derive the whole
    /// held window against the latest accumulator state, derive the new
    /// record, merge, and publish the committed window.
    async fn ingest(&self, record: VitalRecord) {
        let hour_of_day = Local::now().hour();
        let snapshot = {
            let mut inner = self.inner.lock().await;
            let ReconcilerState {
                accumulator,
                window,
                rng,
            } = &mut *inner;

            let refreshed = accumulator.derive_window(window.records(), hour_of_day, rng);
            window.replace_all(refreshed);

            let derived = accumulator.derive(&record, hour_of_day, rng);
            debug!(
                patient = %derived.patient_key(),
                steps = derived.steps_taken,
                "accepted vitals record"
            );
            window.merge(derived);
            window.snapshot()
        };
        let _ = self.events.send(ClientEvent::WindowUpdated(snapshot));
    }

    fn set_status(&self, status: ConnectionStatus) {
        let _ = self
            .events
            .send(ClientEvent::ConnectionStatusChanged(status));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
