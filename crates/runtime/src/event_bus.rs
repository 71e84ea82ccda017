use crate::frame::Frame;

/// Structured trace record of an observable effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Append-only effect trace. Events are stamped with the current frame index.
#[derive(Debug, Default)]
pub struct EventBus {
    frame_index: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self, frame: Frame) {
        self.frame_index = frame.index;
    }

    pub fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: self.frame_index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Kinds of all recorded events, oldest first.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.kind).collect()
    }
}
