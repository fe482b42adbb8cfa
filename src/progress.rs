// Progress reporting
//
// The orchestrator emits an ordered stream of InstallEvents into a ProgressSink.
// The presentation layer owns the receiving end and renders it however it likes.

use crate::models::Summary;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Severity of a log line shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    Progress,
}

/// Lifecycle of a single installation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    ResolvingRoot,
    RunningSteps,
    Completed,
    Aborted,
}

/// Events emitted while an installation runs, in emission order.
#[derive(Debug, Clone)]
pub enum InstallEvent {
    /// A human readable log line
    Log { level: LogLevel, message: String },

    /// Completion fraction in `[0, 1]`, updated once per finished step
    Progress(f32),

    /// The run moved to a new phase
    PhaseChanged(RunPhase),

    /// Terminal event of a completed run
    Finished(Summary),
}

impl InstallEvent {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        InstallEvent::Log {
            level,
            message: message.into(),
        }
    }
}

/// Consumer of installation events.
///
/// Implementations must preserve emission order. The orchestrator calls
/// `emit` from its worker thread, so sinks are `Send + Sync`.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: InstallEvent);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn progress(&self, message: &str) {
        self.log(LogLevel::Progress, message);
    }

    /// Emit a log line and mirror it to the tracing log.
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Info | LogLevel::Success | LogLevel::Progress => {
                tracing::info!("{}", message)
            }
        }
        self.emit(InstallEvent::log(level, message));
    }
}

/// Single-producer hand-off to the presentation thread.
///
/// Unbounded so the worker never blocks on a slow renderer; a run produces
/// a few dozen events at most.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<InstallEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InstallEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: InstallEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Progress receiver dropped, event discarded");
        }
    }
}

/// Sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<InstallEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InstallEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// All progress fractions, in order
    pub fn fractions(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InstallEvent::Progress(fraction) => Some(fraction),
                _ => None,
            })
            .collect()
    }

    /// All log lines at the given level, in order
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InstallEvent::Log { level: l, message } if l == level => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn phases(&self) -> Vec<RunPhase> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InstallEvent::PhaseChanged(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: InstallEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
