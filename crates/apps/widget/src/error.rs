use commands::CommandError;
use layers::SourceError;
use scene::RenderError;

/// Rejected inbound payload. Nothing is mutated when this is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Not JSON, or not an object/array.
    #[error("endpoint type error: {0}")]
    EndpointTypeError(String),
    /// Well-formed JSON with the wrong shape or an unknown action.
    #[error("endpoint value error: {0}")]
    EndpointValueError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
