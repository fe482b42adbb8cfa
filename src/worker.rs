// Background installation worker
//
// Runs the blocking orchestrator on tokio's blocking pool so the presentation
// thread stays responsive, and hands progress events back over an ordered
// channel. The channel closes once the run has emitted its last event.

use crate::models::{Selection, Summary};
use crate::progress::{ChannelSink, InstallEvent};
use crate::services::{InstallError, InstallOrchestrator};
use camino::Utf8PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A running installation.
pub struct InstallHandle {
    /// Events in emission order; yields `None` after the run finishes
    pub events: mpsc::UnboundedReceiver<InstallEvent>,
    task: JoinHandle<Result<Summary, InstallError>>,
}

impl InstallHandle {
    /// Wait for the run to finish.
    ///
    /// Drain `events` first (or concurrently) if every event matters; the
    /// result is available regardless.
    pub async fn join(self) -> Result<Summary, InstallError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Installation worker failed: {}", e);
                Err(InstallError::Worker(e.to_string()))
            }
        }
    }
}

/// Start an installation on the runtime's blocking pool.
///
/// There is no cancellation: once started, the run goes to completion.
pub fn spawn_installation(
    runtime: &tokio::runtime::Handle,
    orchestrator: Arc<InstallOrchestrator>,
    selection: Selection,
    explicit_root: Option<Utf8PathBuf>,
) -> InstallHandle {
    let (sink, events) = ChannelSink::new();

    let task = runtime.spawn_blocking(move || {
        tracing::debug!("Installation worker started");
        let result = orchestrator.run_installation(&selection, explicit_root.as_deref(), &sink);
        tracing::debug!("Installation worker finished");
        // sink drops here, closing the event channel
        result
    });

    InstallHandle { events, task }
}
