use spooled_core::events::SpooledEvent;
use std::time::Instant;

/// The closed set of worker lifecycle events a
/// [`crate::WorkerRuntime`] emits.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Started {
        timestamp: Instant,
    },
    Stopped {
        timestamp: Instant,
    },
    Error {
        timestamp: Instant,
        message: String,
    },
    JobClaimed {
        timestamp: Instant,
        job_id: String,
    },
    JobStarted {
        timestamp: Instant,
        job_id: String,
    },
    JobCompleted {
        timestamp: Instant,
        job_id: String,
    },
    JobFailed {
        timestamp: Instant,
        job_id: String,
        message: String,
    },
}

impl WorkerEvent {
    pub(crate) fn started() -> Self {
        WorkerEvent::Started {
            timestamp: Instant::now(),
        }
    }

    pub(crate) fn stopped() -> Self {
        WorkerEvent::Stopped {
            timestamp: Instant::now(),
        }
    }

    pub(crate) fn error(message: impl Into<String>) -> Self {
        WorkerEvent::Error {
            timestamp: Instant::now(),
            message: message.into(),
        }
    }

    pub(crate) fn job_claimed(job_id: impl Into<String>) -> Self {
        WorkerEvent::JobClaimed {
            timestamp: Instant::now(),
            job_id: job_id.into(),
        }
    }

    pub(crate) fn job_started(job_id: impl Into<String>) -> Self {
        WorkerEvent::JobStarted {
            timestamp: Instant::now(),
            job_id: job_id.into(),
        }
    }

    pub(crate) fn job_completed(job_id: impl Into<String>) -> Self {
        WorkerEvent::JobCompleted {
            timestamp: Instant::now(),
            job_id: job_id.into(),
        }
    }

    pub(crate) fn job_failed(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        WorkerEvent::JobFailed {
            timestamp: Instant::now(),
            job_id: job_id.into(),
            message: message.into(),
        }
    }
}

impl SpooledEvent for WorkerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkerEvent::Started { .. } => "started",
            WorkerEvent::Stopped { .. } => "stopped",
            WorkerEvent::Error { .. } => "error",
            WorkerEvent::JobClaimed { .. } => "job_claimed",
            WorkerEvent::JobStarted { .. } => "job_started",
            WorkerEvent::JobCompleted { .. } => "job_completed",
            WorkerEvent::JobFailed { .. } => "job_failed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            WorkerEvent::Started { timestamp }
            | WorkerEvent::Stopped { timestamp }
            | WorkerEvent::Error { timestamp, .. }
            | WorkerEvent::JobClaimed { timestamp, .. }
            | WorkerEvent::JobStarted { timestamp, .. }
            | WorkerEvent::JobCompleted { timestamp, .. }
            | WorkerEvent::JobFailed { timestamp, .. } => *timestamp,
        }
    }
}
