use serde_json::Value;

/// An outbound endpoint wired by the host.
///
/// Callers check `is_connected` before computing a payload, so a missing
/// consumer costs nothing.
pub trait OutputEndpoint {
    fn is_connected(&self) -> bool;

    fn push(&mut self, payload: Value);
}

/// Output that keeps every pushed payload in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingOutput {
    connected: bool,
    pushes: Vec<Value>,
}

impl RecordingOutput {
    pub fn connected() -> Self {
        Self {
            connected: true,
            pushes: Vec::new(),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn pushes(&self) -> &[Value] {
        &self.pushes
    }

    pub fn last(&self) -> Option<&Value> {
        self.pushes.last()
    }

    pub fn take(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.pushes)
    }
}

impl OutputEndpoint for RecordingOutput {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn push(&mut self, payload: Value) {
        if self.connected {
            self.pushes.push(payload);
        }
    }
}
