//! Connection events.
//!
//! A [`Base`](crate::Base) announces its lifecycle through an [`Emitter`].
//! Any number of receivers can [`subscribe`](Emitter::subscribe); events sent
//! while nobody listens are dropped.

use tokio::sync::broadcast;

use crate::logging::{debug, error, trace};

/// Buffered events per receiver before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Diagnostic message.
    Debug(String),
    /// A failure that was also returned to the caller.
    Error(String),
    /// The connection is open.
    Ready,
}

impl Event {
    /// Event name as used by listeners: `debug`, `error` or `ready`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Debug(_) => "debug",
            Self::Error(_) => "error",
            Self::Ready => "ready",
        }
    }
}

/// Fan-out sender for [`Event`]s.
#[derive(Debug, Clone)]
pub struct Emitter {
    tx: broadcast::Sender<Event>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Send an event. Returns `true` if at least one receiver got it.
    pub fn emit(&self, event: Event) -> bool {
        match &event {
            Event::Debug(message) => {
                debug!(message = %message, "debug event");
            }
            Event::Error(message) => {
                error!(message = %message, "error event");
            }
            Event::Ready => {
                trace!("ready event");
            }
        }
        self.tx.send(event).is_ok()
    }

    pub(crate) fn debug(&self, message: impl Into<String>) {
        self.emit(Event::Debug(message.into()));
    }

    pub(crate) fn error(&self, message: impl Into<String>) {
        self.emit(Event::Error(message.into()));
    }

    pub(crate) fn ready(&self) {
        self.emit(Event::Ready);
    }
}
