use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Completed,
    /// The effect was superseded before it finished (e.g. an interrupted flight).
    Cancelled,
}

/// Completion signal of a long-running effect.
///
/// The effect keeps one clone and resolves it from its own completion path;
/// observers poll their clone. Single-threaded by construction (`Rc`).
#[derive(Debug, Clone)]
pub struct OperationHandle {
    state: Rc<Cell<OperationState>>,
}

impl OperationHandle {
    pub fn pending() -> Self {
        Self {
            state: Rc::new(Cell::new(OperationState::Pending)),
        }
    }

    /// A handle for an effect that finished synchronously.
    pub fn completed() -> Self {
        Self {
            state: Rc::new(Cell::new(OperationState::Completed)),
        }
    }

    pub fn state(&self) -> OperationState {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state() == OperationState::Pending
    }

    /// Resolves the handle. Resolving twice keeps the first outcome.
    pub fn complete(&self) {
        if self.is_pending() {
            self.state.set(OperationState::Completed);
        }
    }

    pub fn cancel(&self) {
        if self.is_pending() {
            self.state.set(OperationState::Cancelled);
        }
    }
}
