/// Hand-off to the external chart renderer with a bounded wait.
///
/// Rendering a large dataset can stall the renderer. The render runs on a
/// worker thread; if it does not report back within the timeout the caller
/// gets [`ScanError::RenderTimeout`] and keeps its results, so it can retry
/// or fall back to a non-chart view.
use crate::error::{ScanError, ScanResult};
use crate::model::HierarchyNode;
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Draws a flat hierarchy dataset as a proportional-area chart.
pub trait ChartRenderer: Send + Sync {
    /// Render `nodes`. An `Err` carries a message for the user.
    fn render(&self, nodes: &[HierarchyNode]) -> Result<(), String>;
}

/// Outcome of a bounded render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// The renderer returned an error before the deadline.
    Failed(String),
}

/// Render `nodes`, waiting at most `timeout`.
///
/// A renderer that overruns keeps running on its detached thread; its
/// result is discarded.
pub fn render_with_timeout(
    renderer: Arc<dyn ChartRenderer>,
    nodes: Vec<HierarchyNode>,
    timeout: Duration,
) -> ScanResult<RenderOutcome> {
    if nodes.is_empty() {
        return Ok(RenderOutcome::Failed(
            "No data available for visualization".to_string(),
        ));
    }

    let (tx, rx) = bounded::<Result<(), String>>(1);
    let spawned = thread::Builder::new()
        .name("spacescope-render".into())
        .spawn(move || {
            let _ = tx.send(renderer.render(&nodes));
        });
    if let Err(e) = spawned {
        return Ok(RenderOutcome::Failed(format!("Could not start renderer: {e}")));
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(())) => Ok(RenderOutcome::Rendered),
        Ok(Err(message)) => Ok(RenderOutcome::Failed(message)),
        Err(RecvTimeoutError::Timeout) => {
            warn!("Renderer did not finish within {timeout:?}");
            Err(ScanError::RenderTimeout(timeout.as_millis() as u64))
        }
        Err(RecvTimeoutError::Disconnected) => {
            Ok(RenderOutcome::Failed("Renderer stopped unexpectedly".to_string()))
        }
    }
}
