/// Application state management.
///
/// Centralises all mutable state that a frontend reads and writes. The
/// poller thread communicates via the session's event channel; state
/// updates happen in `process_session_events()` which runs once per frame.
///
/// `AppState` owns the scan session explicitly. Events from a scan that was
/// stopped or replaced are dropped by generation, so a late completion can
/// never overwrite the view of a newer scan.
use chrono::Local;
use spacescope_core::analysis::ScanSummary;
use spacescope_core::filter::{SearchOutcome, SearchView};
use spacescope_core::model::{format_size, Hierarchy};
use spacescope_core::protocol::{parse_exclusions, DiscoveredPaths, ScanRequest};
use spacescope_core::remote::{discover_or_fallback, ScanBackend};
use spacescope_core::render::{render_with_timeout, ChartRenderer, RenderOutcome};
use spacescope_core::resolver::{self, DropPayload};
use spacescope_core::session::events::SessionEvent;
use spacescope_core::session::{ScanSession, SessionPhase};
use spacescope_core::{ClientConfig, ScanResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of session events drained per frame.
///
/// Keeps a backlog (e.g. after the frontend was suspended) from stalling a
/// single frame.
pub const MAX_EVENTS_PER_FRAME: usize = 100;

/// Shown when the whole filesystem is submitted.
pub const ROOT_SCAN_NOTICE: &str = "Root scan detected. Large cache/temp directories will be \
     filtered unless they contain files over 10MB.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// The last user-visible status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl AppMessage {
    fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// All application state.
pub struct AppState {
    pub config: ClientConfig,
    session: ScanSession,
    /// Locations suggested by the engine (or the fallback entry).
    pub paths: DiscoveredPaths,

    // ── Inputs ─────────────────────────────────────────
    pub path_input: String,
    /// Comma-separated exclusion list.
    pub exclude_input: String,

    // ── Progress ───────────────────────────────────────
    pub progress_percent: u8,
    pub current_path: Option<String>,
    pub status_text: &'static str,
    /// Wall-clock duration of the last completed scan.
    pub scan_duration: Option<chrono::TimeDelta>,

    // ── Results ────────────────────────────────────────
    pub summary: Option<ScanSummary>,
    /// `None` until results arrive; cleared once a new scan is accepted.
    pub view: Option<SearchView>,

    pub message: Option<AppMessage>,
}

impl AppState {
    /// Create initial state, discovering selectable paths from the engine.
    pub fn new(backend: Arc<dyn ScanBackend>, config: ClientConfig) -> Self {
        let paths = discover_or_fallback(backend.as_ref(), &config);
        let path_input = paths
            .default_selection(&config.home_root)
            .map(|p| p.path.clone())
            .unwrap_or_default();
        info!(
            "{} selectable path(s) for user {}",
            paths.paths.len(),
            paths.username
        );

        Self {
            session: ScanSession::new(backend, &config),
            config,
            paths,
            path_input,
            exclude_input: String::new(),
            progress_percent: 0,
            current_path: None,
            status_text: "",
            scan_duration: None,
            summary: None,
            view: None,
            message: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.paths.username
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn is_scanning(&self) -> bool {
        self.phase() == SessionPhase::Scanning
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Records currently shown, if results are loaded.
    pub fn current_view(&self) -> Option<&Hierarchy> {
        self.view.as_ref().map(SearchView::current)
    }

    fn set_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.message = Some(AppMessage::new(level, text));
    }

    /// Start a scan of `path_input`, excluding the comma-separated
    /// `exclude_input`. Returns `true` if the scan was started; a rejection
    /// by the engine arrives later as an error message.
    pub fn start_scan(&mut self, path_input: &str, exclude_input: &str) -> bool {
        self.path_input = path_input.to_owned();
        self.exclude_input = exclude_input.to_owned();

        if self.is_scanning() {
            self.set_message(MessageLevel::Warning, "A scan is already in progress");
            return false;
        }

        let request = ScanRequest::new(
            path_input,
            parse_exclusions(exclude_input),
            &self.paths.username,
        );

        let root_scan = request.path == "/";

        // Previous results stay visible until the engine accepts the scan.
        match self.session.start(request) {
            Ok(()) => {
                self.progress_percent = 0;
                self.current_path = None;
                self.status_text = "Initializing...";
                self.message =
                    root_scan.then(|| AppMessage::new(MessageLevel::Info, ROOT_SCAN_NOTICE));
                true
            }
            Err(e) => {
                self.set_message(MessageLevel::Error, e.to_string());
                false
            }
        }
    }

    fn clear_scan_state(&mut self) {
        self.progress_percent = 0;
        self.current_path = None;
        self.scan_duration = None;
        self.summary = None;
        self.view = None;
    }

    /// Stop the running scan. Returns `false` if nothing was running.
    pub fn stop_scan(&mut self) -> bool {
        if !self.session.stop() {
            return false;
        }
        self.progress_percent = 0;
        self.current_path = None;
        self.status_text = "";
        self.set_message(MessageLevel::Info, "Scan stopped");
        true
    }

    /// Process pending session events. Called once per frame.
    ///
    /// Returns `true` if the frontend should repaint.
    pub fn process_session_events(&mut self) -> bool {
        let mut repaint = false;
        let mut events_this_frame = 0usize;
        while events_this_frame < MAX_EVENTS_PER_FRAME {
            let event = match self.session.events().try_recv() {
                Ok(e) => e,
                Err(_) => break,
            };
            events_this_frame += 1;

            if !self.session.is_current(event.generation()) {
                debug!("Dropping event of superseded scan #{}", event.generation());
                continue;
            }
            repaint = true;
            self.apply_event(event);
        }
        repaint
    }

    fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Started { .. } => {
                self.clear_scan_state();
                self.status_text = "Initializing...";
            }
            SessionEvent::Progress { status, .. } => {
                self.progress_percent = status.progress_percent;
                self.status_text = status.status_text();
                self.current_path = status.current_path;
            }
            SessionEvent::Completed { .. } => {
                self.progress_percent = 100;
                self.status_text = "Processing results...";
            }
            SessionEvent::ResultsReady { results, .. } => {
                let results = *results;
                self.scan_duration = self
                    .session
                    .snapshot()
                    .started_at
                    .map(|started| Local::now() - started);
                self.status_text = "";
                self.current_path = None;

                let text = match (self.scan_duration, results.summary.total_size) {
                    (Some(d), total) => format!(
                        "Scan completed in {:.1}s: {}",
                        d.num_milliseconds() as f64 / 1000.0,
                        format_size(total)
                    ),
                    (None, total) => format!("Scan completed: {}", format_size(total)),
                };
                if results.hierarchy.is_empty() {
                    self.set_message(MessageLevel::Warning, "No data available for visualization");
                } else {
                    self.set_message(MessageLevel::Success, text);
                }
                self.summary = Some(results.summary);
                self.view = Some(SearchView::new(results.hierarchy));
            }
            SessionEvent::Failed { error, .. } => {
                self.status_text = "";
                self.set_message(MessageLevel::Error, error.to_string());
            }
            SessionEvent::Stopped { .. } => {
                self.status_text = "";
                self.set_message(MessageLevel::Warning, "Scan was stopped");
            }
        }
    }

    /// Filter the current results by `term`. `None` without results.
    pub fn search(&mut self, term: &str) -> Option<SearchOutcome> {
        let view = self.view.as_mut()?;
        let outcome = view.search(term);
        match outcome {
            SearchOutcome::Reset => self.message = None,
            SearchOutcome::Matched(n) => self.set_message(
                MessageLevel::Info,
                format!("Showing {n} item(s) matching \"{}\"", term.trim()),
            ),
            SearchOutcome::NoMatches => self.set_message(
                MessageLevel::Warning,
                format!("No items match \"{}\"", term.trim()),
            ),
        }
        Some(outcome)
    }

    /// Drop any search and show the full results again.
    pub fn reset_view(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.reset();
            self.message = None;
        }
    }

    /// Fill the path input from a drop. Returns `true` if a path was set.
    pub fn handle_drop(&mut self, payload: &DropPayload) -> bool {
        match resolver::resolve_single(payload, &self.paths.username, &self.config.home_root) {
            Ok(correction) => {
                let level = if correction.corrected {
                    MessageLevel::Warning
                } else {
                    MessageLevel::Success
                };
                self.set_message(level, correction.message());
                self.path_input = correction.path;
                true
            }
            Err(e) => {
                warn!("Drop not resolved: {e}");
                self.set_message(MessageLevel::Error, e.to_string());
                false
            }
        }
    }

    /// Append every dropped folder to the exclusion input.
    ///
    /// Returns the number of folders that were not already listed.
    pub fn handle_exclusion_drop(&mut self, payload: &DropPayload) -> usize {
        let candidate = match resolver::resolve(payload) {
            Ok(c) => c,
            Err(e) => {
                self.set_message(MessageLevel::Error, e.to_string());
                return 0;
            }
        };
        let merged = resolver::merge_exclusions(
            &self.exclude_input,
            candidate.paths(),
            &self.paths.username,
            &self.config.home_root,
        );
        let level = if merged.added > 0 {
            MessageLevel::Success
        } else {
            MessageLevel::Info
        };
        self.set_message(level, merged.message());
        self.exclude_input = merged.value;
        merged.added
    }

    /// Hand the current view to `renderer`, waiting at most the configured
    /// render timeout. The results stay loaded whatever the outcome.
    pub fn render_current(&mut self, renderer: Arc<dyn ChartRenderer>) -> ScanResult<RenderOutcome> {
        let nodes = self
            .current_view()
            .map(|h| h.nodes().to_vec())
            .unwrap_or_default();
        let result = render_with_timeout(renderer, nodes, self.config.render_timeout());
        match &result {
            Ok(RenderOutcome::Rendered) => {}
            Ok(RenderOutcome::Failed(message)) => {
                self.set_message(MessageLevel::Error, message.clone());
            }
            Err(e) => self.set_message(MessageLevel::Error, e.to_string()),
        }
        result
    }
}
