/// Progress poller — a background thread that submits the scan, polls the
/// remote engine at a fixed interval, and drives the session to a terminal
/// phase.
///
/// Every network call runs here or on the short-lived stop thread, never on
/// the thread that owns the session. Ticks come from a
/// `crossbeam_channel::tick` ticker and are handled one at a time, so a new
/// status request is never issued before the previous response (or failure)
/// has been processed. The loop ends on a terminal
/// status, on cancellation, or when its generation is superseded.
use super::events::{ScanResults, SessionEvent};
use super::{SessionPhase, SharedState};
use crate::analysis::ScanSummary;
use crate::config::FlattenLimits;
use crate::error::ScanError;
use crate::model::Hierarchy;
use crate::protocol::{RemoteState, ScanRequest, ScanStatus};
use crate::remote::ScanBackend;
use crossbeam_channel::{select, tick, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Entries kept in each "largest items" list of the summary.
const SUMMARY_TOP_N: usize = 10;

/// Handle to a running poller. Cancelling is cooperative and non-blocking.
pub struct PollerHandle {
    cancel_flag: Arc<AtomicBool>,
    /// Dropping or signalling wakes the loop without waiting for a tick.
    stop_tx: Sender<()>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl PollerHandle {
    /// Halt future polling. A request already in flight completes, but its
    /// response is discarded.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
        let _ = self.stop_tx.try_send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Everything the poller thread needs, moved into it at spawn time.
pub(crate) struct PollerContext {
    pub backend: Arc<dyn ScanBackend>,
    pub shared: SharedState,
    pub events: Sender<SessionEvent>,
    pub request: ScanRequest,
    pub generation: u64,
    pub interval: Duration,
    pub flatten: FlattenLimits,
}

pub(crate) fn spawn_poller(ctx: PollerContext) -> std::io::Result<PollerHandle> {
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

    let thread = thread::Builder::new()
        .name(format!("spacescope-poller-{}", ctx.generation))
        .spawn(move || run(ctx, cancel_clone, stop_rx))?;

    Ok(PollerHandle {
        cancel_flag,
        stop_tx,
        _thread: Some(thread),
    })
}

/// Send one best-effort stop request from a short-lived thread.
pub(crate) fn spawn_stop_request(backend: Arc<dyn ScanBackend>) {
    let spawned = thread::Builder::new()
        .name("spacescope-stop".into())
        .spawn(move || send_stop(backend.as_ref()));
    if let Err(e) = spawned {
        warn!("Could not send stop request: {e}");
    }
}

fn send_stop(backend: &dyn ScanBackend) {
    if let Err(e) = backend.stop() {
        warn!("Error stopping scan: {e}");
    }
}

fn run(ctx: PollerContext, cancel: Arc<AtomicBool>, stop_rx: Receiver<()>) {
    if !ctx.submit(&cancel) {
        return;
    }
    info!(
        "Polling scan #{} every {:?}",
        ctx.generation, ctx.interval
    );
    let ticker = tick(ctx.interval);

    loop {
        select! {
            recv(ticker) -> _ => {}
            recv(stop_rx) -> _ => {
                debug!("Poller #{} stopped", ctx.generation);
                return;
            }
        }
        if cancel.load(Ordering::Relaxed) {
            return;
        }

        let status = match ctx.backend.progress() {
            Ok(status) => status,
            Err(e) => {
                // A missed poll never aborts the scan.
                warn!("Error fetching progress: {e}");
                ctx.note_missed_poll();
                continue;
            }
        };
        debug!(
            "Poll #{}: {:?} {}%",
            ctx.generation, status.state, status.progress_percent
        );

        if cancel.load(Ordering::Relaxed) || !ctx.apply(status) {
            return;
        }
    }
}

impl PollerContext {
    /// Submit the request. Returns `false` when polling must not begin.
    fn submit(&self, cancel: &AtomicBool) -> bool {
        let generation = self.generation;
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        info!("Submitting scan #{generation} of {}", self.request.path);
        let outcome = self.backend.submit(&self.request).map_err(|e| match e {
            ScanError::Submission(_) => e,
            other => ScanError::Submission(other.to_string()),
        });

        let mut shared = self.shared.lock();
        if cancel.load(Ordering::Relaxed) || shared.generation != generation {
            drop(shared);
            // Stopped while the request was in flight; the engine may have
            // accepted it after the stop request arrived.
            if outcome.is_ok() {
                debug!("Scan #{generation} superseded during submission");
                send_stop(self.backend.as_ref());
            }
            return false;
        }
        match outcome {
            Ok(()) => {
                drop(shared);
                let _ = self.events.send(SessionEvent::Started { generation });
                true
            }
            Err(error) => {
                warn!("{error}");
                shared.phase = SessionPhase::Idle;
                shared.last_error = Some(error.to_string());
                drop(shared);
                let _ = self.events.send(SessionEvent::Failed { generation, error });
                false
            }
        }
    }

    fn note_missed_poll(&self) {
        let mut shared = self.shared.lock();
        if shared.generation == self.generation {
            shared.missed_polls += 1;
        }
    }

    /// Feed one status into the session. Returns `false` when polling ends.
    fn apply(&self, status: ScanStatus) -> bool {
        let state = status.state;
        {
            let mut shared = self.shared.lock();
            if shared.generation != self.generation || shared.phase != SessionPhase::Scanning {
                debug!("Ignoring late status for scan #{}", self.generation);
                return false;
            }
            shared.missed_polls = 0;
            match state {
                RemoteState::Scanning => {}
                RemoteState::Completed => shared.phase = SessionPhase::Completed,
                RemoteState::Error => {
                    shared.phase = SessionPhase::Failed;
                    shared.last_error = Some(
                        status
                            .error_message
                            .clone()
                            .unwrap_or_else(|| "unknown error".to_string()),
                    );
                }
                RemoteState::Stopped => shared.phase = SessionPhase::Stopped,
            }
            shared.status = Some(status.clone());
        }

        let generation = self.generation;
        match state {
            RemoteState::Scanning => {
                // The snapshot is in shared state too; a full channel only
                // loses an intermediate update.
                let _ = self
                    .events
                    .try_send(SessionEvent::Progress { generation, status });
                true
            }
            RemoteState::Completed => {
                info!("Scan #{generation} completed, retrieving results");
                let _ = self.events.send(SessionEvent::Completed { generation });
                self.retrieve_results();
                false
            }
            RemoteState::Error => {
                let message = status
                    .error_message
                    .unwrap_or_else(|| "unknown error".to_string());
                warn!("Scan #{generation} failed: {message}");
                let _ = self.events.send(SessionEvent::Failed {
                    generation,
                    error: ScanError::RemoteScan(message),
                });
                // The failure has been reported; the session is ready again.
                let mut shared = self.shared.lock();
                if shared.generation == generation && shared.phase == SessionPhase::Failed {
                    shared.phase = SessionPhase::Idle;
                }
                false
            }
            RemoteState::Stopped => {
                info!("Scan #{generation} stopped remotely");
                let _ = self.events.send(SessionEvent::Stopped { generation });
                false
            }
        }
    }

    /// Fetch and flatten the results once. Not retried.
    fn retrieve_results(&self) {
        let generation = self.generation;
        let outcome = self.backend.results().map(|root| ScanResults {
            hierarchy: Hierarchy::from_remote(&root, &self.flatten),
            summary: ScanSummary::from_remote(&root, SUMMARY_TOP_N),
        });

        let event = {
            let mut shared = self.shared.lock();
            if shared.generation != generation || shared.phase != SessionPhase::Completed {
                debug!("Discarding results of superseded scan #{generation}");
                return;
            }
            match outcome {
                Ok(results) => {
                    info!("Scan #{generation}: {} records ready", results.hierarchy.len());
                    SessionEvent::ResultsReady {
                        generation,
                        results: Box::new(results),
                    }
                }
                Err(error) => {
                    warn!("Scan #{generation}: {error}");
                    shared.phase = SessionPhase::Idle;
                    shared.last_error = Some(error.to_string());
                    SessionEvent::Failed { generation, error }
                }
            }
        };
        let _ = self.events.send(event);
    }
}
