//! Progress emitter and the sinks it writes to
//!
//! The emitter is the only place [`ProgressEvent`]s are created. It stamps
//! every event with a timestamp and a run-local sequence number so consumers
//! can order events even if a transport reorders them.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::Utc;
use parking_lot::Mutex;
use reason_core::{EventKind, ProgressEvent, StepId, StepOutcome, Transition};
use tokio::sync::broadcast;
use tracing::trace;

/// Receives progress events. Must not block.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Fans events out to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<ProgressEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl ProgressSink for BroadcastSink {
    fn emit(&self, event: ProgressEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

/// Keeps every event in memory, in emission order
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().push(event);
    }
}

/// Descriptive part of an event, shared by all three transitions
#[derive(Debug, Clone)]
pub struct StepUpdate {
    pub id: StepId,
    pub kind: EventKind,
    pub title: String,
    pub message: String,
    pub query: Option<String>,
    pub analysis_type: Option<String>,
    pub completed_steps: Option<u32>,
    pub total_steps: Option<u32>,
    pub is_complete: bool,
}

impl StepUpdate {
    pub fn new(
        id: StepId,
        kind: EventKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            query: None,
            analysis_type: None,
            completed_steps: None,
            total_steps: None,
            is_complete: false,
        }
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn analysis_type(mut self, analysis_type: &str) -> Self {
        self.analysis_type = Some(analysis_type.to_string());
        self
    }

    pub fn counts(mut self, completed: u32, total: u32) -> Self {
        self.completed_steps = Some(completed);
        self.total_steps = Some(total);
        self
    }

    /// Mark the event as the last one of a finished run
    pub fn finished(mut self) -> Self {
        self.is_complete = true;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

pub struct ProgressEmitter {
    sink: Arc<dyn ProgressSink>,
    sequence: AtomicU64,
}

impl ProgressEmitter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn running(&self, update: StepUpdate) {
        self.emit(update, Transition::Running);
    }

    pub fn completed(&self, update: StepUpdate, outcome: Option<StepOutcome>) {
        self.emit(update, Transition::Completed { outcome });
    }

    pub fn errored(&self, update: StepUpdate, reason: impl Into<String>) {
        self.emit(
            update,
            Transition::Error {
                reason: reason.into(),
            },
        );
    }

    /// Number of events emitted so far
    pub fn emitted(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn emit(&self, update: StepUpdate, transition: Transition) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let event = ProgressEvent {
            id: update.id,
            kind: update.kind,
            overwrite: transition.overwrites(),
            is_complete: update.is_complete,
            transition,
            title: update.title,
            message: update.message,
            timestamp: Utc::now(),
            sequence,
            query: update.query,
            analysis_type: update.analysis_type,
            completed_steps: update.completed_steps,
            total_steps: update.total_steps,
        };
        trace!(id = %event.id, sequence, "emitting progress event");
        self.sink.emit(event);
    }
}
