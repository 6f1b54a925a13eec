/// Session events — messages sent from the poller thread to the frontend
/// via a crossbeam channel.
///
/// Every event carries the generation of the scan that produced it. A
/// frontend drops events whose generation is no longer current (the scan
/// was stopped or replaced).
use crate::analysis::ScanSummary;
use crate::error::ScanError;
use crate::model::Hierarchy;
use crate::protocol::ScanStatus;

/// Everything retrieved after a completed scan.
#[derive(Debug, Clone)]
pub struct ScanResults {
    /// Flat dataset for the chart and the search filter.
    pub hierarchy: Hierarchy,
    /// Totals and largest items of the full (uncapped) result.
    pub summary: ScanSummary,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The remote engine accepted the request; polling has begun.
    Started { generation: u64 },
    /// A `scanning` snapshot.
    Progress { generation: u64, status: ScanStatus },
    /// Remote reported `completed`; result retrieval follows.
    Completed { generation: u64 },
    /// Results retrieved and flattened.
    ResultsReady {
        generation: u64,
        results: Box<ScanResults>,
    },
    /// Remote scan error or result retrieval failure.
    Failed { generation: u64, error: ScanError },
    /// Remote reported the scan as stopped / cancelled.
    Stopped { generation: u64 },
}

impl SessionEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SessionEvent::Started { generation }
            | SessionEvent::Progress { generation, .. }
            | SessionEvent::Completed { generation }
            | SessionEvent::ResultsReady { generation, .. }
            | SessionEvent::Failed { generation, .. }
            | SessionEvent::Stopped { generation } => *generation,
        }
    }
}
