use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use layers::layer::LayerAction;

use crate::error::InputError;

/// Normalizes a raw endpoint payload.
///
/// `null` becomes an empty list and JSON text is parsed. Anything that is
/// neither an object nor an array afterwards is a type error.
pub fn parse_input_endpoint_data(data: Value) -> Result<Value, InputError> {
    let value = match data {
        Value::Null => return Ok(Value::Array(Vec::new())),
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| InputError::EndpointTypeError(e.to_string()))?,
        other => other,
    };
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        Value::Null => Ok(Value::Array(Vec::new())),
        other => Err(InputError::EndpointTypeError(format!(
            "expected an object or an array, got {other}"
        ))),
    }
}

/// A single object becomes a one-element list.
pub fn normalize_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        single => vec![single],
    }
}

/// Parses, normalizes and decodes a list payload.
pub fn decode_list<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, InputError> {
    normalize_list(parse_input_endpoint_data(data)?)
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| InputError::EndpointValueError(e.to_string()))
        })
        .collect()
}

/// A PoI named for deletion, either by bare id or by PoI object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PoiRef {
    Id(String),
    Object { id: String },
}

impl PoiRef {
    pub fn id(&self) -> &str {
        match self {
            PoiRef::Id(id) | PoiRef::Object { id } => id,
        }
    }
}

/// Decodes a `layerInfo` payload into its action and the full request.
pub fn decode_layer_info(data: Value) -> Result<(LayerAction, Value), InputError> {
    let info = parse_input_endpoint_data(data)?;
    let action = info
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| InputError::EndpointValueError("missing layer action".into()))?;
    let action = action
        .parse::<LayerAction>()
        .map_err(|name| InputError::EndpointValueError(format!("unknown layer action '{name}'")))?;
    Ok((action, info))
}
