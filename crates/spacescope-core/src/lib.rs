/// SpaceScope Core — scan lifecycle, hierarchy model, and drop-path resolution.
///
/// This crate contains all client-side decision logic with zero UI
/// dependencies. The filesystem walk itself happens in a remote scan engine
/// reached through [`remote::ScanBackend`]; rendering is delegated to a
/// [`render::ChartRenderer`].
///
/// # Modules
///
/// - [`config`] — Client configuration (server URL, poll interval, limits).
/// - [`error`] — The `ScanError` taxonomy shared by every module.
/// - [`protocol`] — Wire types of the remote polling protocol.
/// - [`remote`] — Backend trait and its HTTP implementation.
/// - [`session`] — Scan Session state machine and Progress Poller.
/// - [`model`] — Flat hierarchy dataset built from the nested scan result.
/// - [`filter`] — Search filtering that keeps the derived tree valid.
/// - [`resolver`] — Turns drag-and-drop payloads into filesystem paths.
/// - [`analysis`] — Post-scan summary (totals, largest directories/files).
/// - [`export`] — CSV / JSON export of a flat dataset.
/// - [`render`] — Bounded-wait hand-off to the chart renderer.
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod protocol;
pub mod remote;
pub mod render;
pub mod resolver;
pub mod session;

pub use config::ClientConfig;
pub use error::{ScanError, ScanResult};
