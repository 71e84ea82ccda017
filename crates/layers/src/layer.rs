use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

/// Layer-management requests arriving on the `layerInfo` endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerAction {
    AddLayer,
    MoveLayer,
    RemoveLayer,
    SetBaseLayer,
}

impl LayerAction {
    pub fn name(self) -> &'static str {
        match self {
            LayerAction::AddLayer => "addLayer",
            LayerAction::MoveLayer => "moveLayer",
            LayerAction::RemoveLayer => "removeLayer",
            LayerAction::SetBaseLayer => "setBaseLayer",
        }
    }

    /// Layers are not managed yet; every recognized action is accepted and
    /// has no effect.
    pub fn apply(self, data: &Value) {
        debug!(action = self.name(), %data, "layer action not implemented, ignoring");
    }
}

impl FromStr for LayerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addLayer" => Ok(LayerAction::AddLayer),
            "moveLayer" => Ok(LayerAction::MoveLayer),
            "removeLayer" => Ok(LayerAction::RemoveLayer),
            "setBaseLayer" => Ok(LayerAction::SetBaseLayer),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LayerAction;

    #[test]
    fn parses_known_actions_by_exact_name() {
        for action in [
            LayerAction::AddLayer,
            LayerAction::MoveLayer,
            LayerAction::RemoveLayer,
            LayerAction::SetBaseLayer,
        ] {
            assert_eq!(action.name().parse::<LayerAction>(), Ok(action));
        }
        assert_eq!("addlayer".parse::<LayerAction>(), Err("addlayer".to_string()));
    }
}
