/// SpaceScope App — frontend application state.
///
/// This crate holds everything a frontend reads and writes each frame.
/// Decision logic lives in `spacescope-core`; drawing lives in the frontend.
pub mod state;

pub use state::{AppMessage, AppState, MessageLevel, ROOT_SCAN_NOTICE};
