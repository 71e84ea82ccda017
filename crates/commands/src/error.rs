use layers::SourceError;
use scene::RenderError;

/// A dispatched command whose handler failed.
///
/// The executor does not recover from these on its own; see
/// [`CommandExecutor::reset`](crate::CommandExecutor::reset).
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid value for '{kind}': {source}")]
    InvalidValue {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
