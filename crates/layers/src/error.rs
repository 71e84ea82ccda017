use scene::RenderError;

/// A PoI location the adapter cannot turn into drawables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("unsupported geometry kind '{kind}'")]
    Unsupported { kind: String },
    #[error("{kind} coordinates are malformed: {reason}")]
    Coordinates { kind: String, reason: String },
    #[error("a position needs longitude and latitude, got {0} value(s)")]
    ShortPosition(usize),
    #[error("polygon has no outer ring")]
    MissingOuterRing,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
/// Why one PoI could not be turned into drawables.
pub enum RegistryError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// An imagery or terrain source description that cannot be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("unknown base map style '{0}'")]
    UnknownStyle(String),
    #[error("imagery source needs a style or a url")]
    MissingSource,
}
