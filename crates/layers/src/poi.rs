use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::GeometryError;
use crate::symbology::PoiStyle;

/// Longitude/latitude in degrees with an optional height in meters.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
    pub height: Option<f64>,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            height: None,
        }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = GeometryError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [lon, lat] => Ok(Self::new(*lon, *lat)),
            [lon, lat, height, ..] => Ok(Self {
                lon: *lon,
                lat: *lat,
                height: Some(*height),
            }),
            _ => Err(GeometryError::ShortPosition(values.len())),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }
}

/// A PoI geometry, coordinates in GeoJSON nesting order.
///
/// Kinds outside the six supported ones deserialize to `Unsupported` so a
/// single odd PoI does not reject its whole batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawLocation")]
pub enum Location {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    /// Rings; the first is the outer ring.
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    Unsupported { kind: String },
}

impl Location {
    pub fn kind(&self) -> Option<GeometryKind> {
        Some(match self {
            Location::Point(_) => GeometryKind::Point,
            Location::MultiPoint(_) => GeometryKind::MultiPoint,
            Location::LineString(_) => GeometryKind::LineString,
            Location::MultiLineString(_) => GeometryKind::MultiLineString,
            Location::Polygon(_) => GeometryKind::Polygon,
            Location::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Location::Unsupported { .. } => return None,
        })
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Location::Unsupported { kind } => kind,
            other => other.kind().map_or("", GeometryKind::name),
        }
    }
}

#[derive(Deserialize)]
struct RawLocation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl TryFrom<RawLocation> for Location {
    type Error = GeometryError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: &str,
            coordinates: Value,
        ) -> Result<T, GeometryError> {
            serde_json::from_value(coordinates).map_err(|e| GeometryError::Coordinates {
                kind: kind.to_string(),
                reason: e.to_string(),
            })
        }

        let RawLocation { kind, coordinates } = raw;
        Ok(match kind.as_str() {
            "Point" => Location::Point(parse(&kind, coordinates)?),
            "MultiPoint" => Location::MultiPoint(parse(&kind, coordinates)?),
            "LineString" => Location::LineString(parse(&kind, coordinates)?),
            "MultiLineString" => Location::MultiLineString(parse(&kind, coordinates)?),
            "Polygon" => Location::Polygon(parse(&kind, coordinates)?),
            "MultiPolygon" => Location::MultiPolygon(parse(&kind, coordinates)?),
            _ => Location::Unsupported { kind },
        })
    }
}

/// Billboard image given directly by the producer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IconSource {
    Url(String),
    Object { src: String },
}

impl IconSource {
    pub fn src(&self) -> &str {
        match self {
            IconSource::Url(src) | IconSource::Object { src } => src,
        }
    }
}

/// A point of interest as sent by producers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: String,
    pub location: Location,
    #[serde(default)]
    pub style: PoiStyle,
    /// Returned verbatim to consumers; a missing or null payload becomes `{}`.
    #[serde(default = "empty_data", deserialize_with = "data_or_empty")]
    pub data: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tooltip: Option<String>,
    #[serde(default)]
    pub info_window: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub icon: Option<IconSource>,
}

impl Poi {
    pub fn new(id: impl Into<String>, location: Location) -> Self {
        Self {
            id: id.into(),
            location,
            style: PoiStyle::default(),
            data: empty_data(),
            title: None,
            tooltip: None,
            info_window: None,
            height: None,
            icon: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// `data.name` when it is a string.
    pub fn data_name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

fn data_or_empty<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(if value.is_null() { empty_data() } else { value })
}

#[cfg(test)]
mod tests {
    use super::{GeometryKind, IconSource, Location, Poi, Position};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_full_point_poi() {
        let poi: Poi = serde_json::from_value(json!({
            "id": "p1",
            "location": {"type": "Point", "coordinates": [10.0, 20.0]},
            "title": "Plaza",
            "infoWindow": "<b>hi</b>",
            "icon": {"src": "pin.png"},
            "data": {"name": "plaza", "kind": "square"}
        }))
        .unwrap();

        assert_eq!(poi.location, Location::Point(Position::new(10.0, 20.0)));
        assert_eq!(poi.info_window.as_deref(), Some("<b>hi</b>"));
        assert_eq!(poi.icon.as_ref().map(IconSource::src), Some("pin.png"));
        assert_eq!(poi.data_name(), Some("plaza"));
    }

    #[test]
    fn missing_or_null_data_becomes_empty_object() {
        for data in [None, Some(serde_json::Value::Null)] {
            let mut payload = json!({
                "id": "p",
                "location": {"type": "Point", "coordinates": [0, 0]}
            });
            if let Some(d) = data {
                payload["data"] = d;
            }
            let poi: Poi = serde_json::from_value(payload).unwrap();
            assert_eq!(poi.data, json!({}));
        }
    }

    #[test]
    fn unknown_kind_is_kept_as_unsupported() {
        let loc: Location =
            serde_json::from_value(json!({"type": "GeometryCollection", "geometries": []}))
                .unwrap();
        assert_eq!(
            loc,
            Location::Unsupported {
                kind: "GeometryCollection".into()
            }
        );
        assert_eq!(loc.kind(), None);
        assert_eq!(loc.kind_name(), "GeometryCollection");
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        let err = serde_json::from_value::<Location>(json!({"type": "Point", "coordinates": [1.0]}));
        assert!(err.is_err());
        let err =
            serde_json::from_value::<Location>(json!({"type": "LineString", "coordinates": 3}));
        assert!(err.is_err());
    }

    #[test]
    fn nested_kinds_parse_with_heights() {
        let loc: Location = serde_json::from_value(json!({
            "type": "MultiPolygon",
            "coordinates": [[[[0, 0, 5], [1, 0, 5], [1, 1, 5], [0, 0, 5]]]]
        }))
        .unwrap();
        let Location::MultiPolygon(polys) = &loc else {
            panic!("expected a multipolygon");
        };
        assert_eq!(polys[0][0][0].height, Some(5.0));
        assert_eq!(loc.kind(), Some(GeometryKind::MultiPolygon));
    }

    #[test]
    fn string_icons_deserialize_untagged() {
        let icon: IconSource = serde_json::from_value(json!("https://x/pin.svg")).unwrap();
        assert_eq!(icon, IconSource::Url("https://x/pin.svg".into()));
    }
}
