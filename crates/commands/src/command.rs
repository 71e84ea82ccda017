use serde::Deserialize;
use serde_json::{Map, Value};

/// An imperative request as submitted by producers: `{type, value?}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Command {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl Command {
    pub fn new(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: Some(kind.into()),
            value: Some(value),
        }
    }

    /// The dispatch key: `type` lower-cased.
    pub fn dispatch_key(&self) -> Option<String> {
        self.kind.as_deref().map(str::to_lowercase)
    }

    /// `value`, or an empty object when absent.
    pub fn value_or_empty(self) -> Value {
        self.value.unwrap_or_else(|| Value::Object(Map::new()))
    }
}

/// The fixed set of recognized operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddTileset,
    SetView,
    FlyTo,
    RotateCamera,
    SetImageryProvider,
    SetTerrainProvider,
    SetProviders,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::AddTileset,
        CommandKind::SetView,
        CommandKind::FlyTo,
        CommandKind::RotateCamera,
        CommandKind::SetImageryProvider,
        CommandKind::SetTerrainProvider,
        CommandKind::SetProviders,
    ];

    /// Lower-case dispatch key.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::AddTileset => "add3dtileset",
            CommandKind::SetView => "setview",
            CommandKind::FlyTo => "flyto",
            CommandKind::RotateCamera => "rotatecamera",
            CommandKind::SetImageryProvider => "setimageryprovider",
            CommandKind::SetTerrainProvider => "setterrainprovider",
            CommandKind::SetProviders => "setproviders",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == key)
    }
}
