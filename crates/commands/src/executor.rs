use tracing::{debug, info};

use runtime::operation::{OperationHandle, OperationState};
use runtime::scheduler::HookId;
use runtime::work_queue::WorkQueue;
use scene::Renderer;

use crate::command::{Command, CommandKind};
use crate::error::CommandError;
use crate::operations::{CommandOp, Operation, OperationContext};

#[derive(Debug)]
struct InFlight {
    key: String,
    /// `None` when the handler failed; the command then never completes.
    handle: Option<OperationHandle>,
}

/// Serializes commands against a renderer that runs one operation at a time.
///
/// Ordering contract:
/// - Commands dispatch in arrival order across batches.
/// - At most one command is in flight; a new batch never preempts it.
/// - Each trigger (`submit` or `poll`) dispatches at most one command.
///
/// Unknown or missing types are logged and skipped. A failing handler leaves
/// the executor busy with that command until [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct CommandExecutor {
    queue: WorkQueue<Command>,
    current: Option<InFlight>,
    context: OperationContext,
    debug: bool,
}

impl CommandExecutor {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Self::default()
        }
    }

    /// Lower-cased type of the in-flight command, `""` when idle.
    pub fn current_command(&self) -> &str {
        self.current.as_ref().map_or("", |c| c.key.as_str())
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn orbit_hook(&self) -> Option<HookId> {
        self.context.orbit_hook
    }

    /// Appends `commands` to the queue and, when idle, dispatches the head.
    pub fn submit(
        &mut self,
        renderer: &mut dyn Renderer,
        commands: Vec<Command>,
    ) -> Result<(), CommandError> {
        self.queue.extend(commands);
        self.drain_one(renderer)
    }

    /// Observes the in-flight operation; once it has resolved the executor
    /// goes idle and dispatches the next queued command.
    pub fn poll(&mut self, renderer: &mut dyn Renderer) -> Result<(), CommandError> {
        if let Some(InFlight {
            key,
            handle: Some(handle),
        }) = &self.current
        {
            match handle.state() {
                OperationState::Pending => return Ok(()),
                OperationState::Completed => debug!(command = %key, "command completed"),
                OperationState::Cancelled => info!(command = %key, "command was interrupted"),
            }
            self.current = None;
        }
        self.drain_one(renderer)
    }

    /// Forgets the in-flight command, including one stuck after a handler
    /// failure. Queued commands stay and dispatch on the next trigger.
    pub fn reset(&mut self) {
        if let Some(current) = self.current.take() {
            info!(command = %current.key, "executor reset");
        }
    }

    fn drain_one(&mut self, renderer: &mut dyn Renderer) -> Result<(), CommandError> {
        let result = if self.current.is_none()
            && let Some((_, command)) = self.queue.pop_next()
        {
            self.dispatch(renderer, command)
        } else {
            Ok(())
        };
        if self.debug {
            info!(
                "exec: {}, queue: {}",
                self.current_command(),
                self.queue.len()
            );
        }
        result
    }

    fn dispatch(
        &mut self,
        renderer: &mut dyn Renderer,
        command: Command,
    ) -> Result<(), CommandError> {
        let Some(key) = command.dispatch_key() else {
            info!("command without type ignored");
            return Ok(());
        };
        let Some(kind) = CommandKind::from_key(&key) else {
            info!("{key} not found");
            return Ok(());
        };

        self.current = Some(InFlight { key, handle: None });
        let op = CommandOp::parse(kind, command.value_or_empty())?;
        let handle = op.run(renderer, &mut self.context)?;
        if let Some(current) = self.current.as_mut() {
            current.handle = Some(handle);
        }
        Ok(())
    }
}
