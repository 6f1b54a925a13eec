/// Scan session — the client-side lifecycle of one remote scan at a time.
///
/// ```text
/// Idle ──start()──▶ Scanning ──poller──▶ Completed | Failed | Stopped
///   ▲                  │                         │
///   └────stop()────────┘          start() ◀──────┘
/// ```
///
/// The session object is owned explicitly by the frontend and shares its
/// state with the single poller thread through an `Arc<Mutex<_>>`. Neither
/// `start()` nor `stop()` waits on the network. Terminal
/// transitions are made only by the poller; `stop()` is the only
/// cancellation primitive and is optimistic: local polling halts and the
/// phase returns to `Idle` whatever the remote engine answers.
pub mod events;
pub mod poller;

use crate::config::{ClientConfig, FlattenLimits};
use crate::error::{ScanError, ScanResult};
use crate::protocol::{ScanRequest, ScanStatus};
use crate::remote::ScanBackend;
use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender};
use events::SessionEvent;
use parking_lot::Mutex;
use poller::{spawn_poller, spawn_stop_request, PollerContext, PollerHandle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use events::ScanResults;

/// Maximum number of session events that may queue up in the channel.
///
/// Terminal events are sent blocking; progress events are dropped when the
/// queue is full because the latest snapshot is also kept in the session.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No scan; the initial phase and the phase after `stop()`.
    Idle,
    /// Submitted and being polled.
    Scanning,
    /// Remote reported completion; results are being or have been retrieved.
    Completed,
    /// Remote reported an error.
    Failed,
    /// Remote reported the scan as stopped.
    Stopped,
}

impl SessionPhase {
    /// Every phase except `Scanning` accepts a new `start()`.
    pub fn can_start(self) -> bool {
        self != SessionPhase::Scanning
    }
}

/// State shared between the session and its poller thread.
#[derive(Debug)]
pub(crate) struct Shared {
    pub phase: SessionPhase,
    /// Bumped on every start and stop; stale pollers compare against it.
    pub generation: u64,
    pub status: Option<ScanStatus>,
    pub request: Option<ScanRequest>,
    pub started_at: Option<DateTime<Local>>,
    /// Consecutive progress requests that failed at transport level.
    pub missed_polls: u64,
    pub last_error: Option<String>,
}

pub(crate) type SharedState = Arc<Mutex<Shared>>;

/// Point-in-time copy of the session state for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub generation: u64,
    pub status: Option<ScanStatus>,
    pub request: Option<ScanRequest>,
    pub started_at: Option<DateTime<Local>>,
    pub missed_polls: u64,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn progress_percent(&self) -> u8 {
        self.status.as_ref().map_or(0, |s| s.progress_percent)
    }

    pub fn current_path(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.current_path.as_deref())
    }
}

/// Owner of the scan lifecycle and of the single poller.
pub struct ScanSession {
    backend: Arc<dyn ScanBackend>,
    poll_interval: Duration,
    flatten: FlattenLimits,
    shared: SharedState,
    poller: Option<PollerHandle>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
}

impl ScanSession {
    pub fn new(backend: Arc<dyn ScanBackend>, config: &ClientConfig) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            poll_interval: config.poll_interval(),
            flatten: config.flatten,
            shared: Arc::new(Mutex::new(Shared {
                phase: SessionPhase::Idle,
                generation: 0,
                status: None,
                request: None,
                started_at: None,
                missed_polls: 0,
                last_error: None,
            })),
            poller: None,
            events_tx,
            events_rx,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// `true` if `generation` is still the session's current scan.
    pub fn is_current(&self, generation: u64) -> bool {
        self.shared.lock().generation == generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let shared = self.shared.lock();
        SessionSnapshot {
            phase: shared.phase,
            generation: shared.generation,
            status: shared.status.clone(),
            request: shared.request.clone(),
            started_at: shared.started_at,
            missed_polls: shared.missed_polls,
            last_error: shared.last_error.clone(),
        }
    }

    /// Events from the poller, for the frontend to drain.
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events_rx
    }

    /// `true` while a poller is running for the current scan.
    pub fn is_polling(&self) -> bool {
        self.phase() == SessionPhase::Scanning
            && self.poller.as_ref().is_some_and(|p| !p.is_cancelled())
    }

    /// Start a scan of `request` in the background.
    ///
    /// Returns as soon as the poller thread is running; the submission
    /// itself happens there and is reported as `Started` or `Failed`.
    /// Rejected without side effects while a scan is running.
    pub fn start(&mut self, request: ScanRequest) -> ScanResult<()> {
        if !self.phase().can_start() {
            return Err(ScanError::AlreadyScanning);
        }
        if request.path.trim().is_empty() {
            return Err(self.fail_start(ScanError::Submission("scan path is empty".into())));
        }
        // A poller of a finished scan may still be fetching results.
        if let Some(old) = self.poller.take() {
            old.cancel();
        }

        let generation = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.phase = SessionPhase::Scanning;
            shared.status = None;
            shared.request = Some(request.clone());
            shared.started_at = Some(Local::now());
            shared.missed_polls = 0;
            shared.last_error = None;
            shared.generation
        };

        let ctx = PollerContext {
            backend: self.backend.clone(),
            shared: self.shared.clone(),
            events: self.events_tx.clone(),
            request,
            generation,
            interval: self.poll_interval,
            flatten: self.flatten,
        };
        match spawn_poller(ctx) {
            Ok(handle) => {
                self.poller = Some(handle);
                Ok(())
            }
            Err(e) => {
                // Nothing was submitted.
                let mut shared = self.shared.lock();
                shared.generation += 1;
                Err(fail_start_locked(
                    &mut shared,
                    ScanError::Submission(format!("could not start progress polling: {e}")),
                ))
            }
        }
    }

    fn fail_start(&self, error: ScanError) -> ScanError {
        fail_start_locked(&mut self.shared.lock(), error)
    }

    /// Stop the running scan. A no-op (returning `false`) unless `Scanning`.
    ///
    /// The local phase becomes `Idle` at once and any later poll response is
    /// ignored. One best-effort stop request is sent from a background
    /// thread; a failure is logged only.
    pub fn stop(&mut self) -> bool {
        {
            let mut shared = self.shared.lock();
            if shared.phase != SessionPhase::Scanning {
                return false;
            }
            shared.generation += 1;
            shared.phase = SessionPhase::Idle;
        }
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        spawn_stop_request(self.backend.clone());
        info!("Scan stopped");
        true
    }
}

fn fail_start_locked(shared: &mut Shared, error: ScanError) -> ScanError {
    warn!("{error}");
    shared.phase = SessionPhase::Idle;
    shared.last_error = Some(error.to_string());
    error
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
    }
}
