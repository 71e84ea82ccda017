use std::collections::BTreeMap;

use tracing::warn;

use layers::raster::{ImagerySource, STYLE_OFF, base_map_style};
use scene::components::{CameraView, Orientation};

pub const PREF_INITIAL_POSITION: &str = "initialPosition";
pub const PREF_INITIAL_ORIENTATION: &str = "initialOrientation";
pub const PREF_DEBUG: &str = "debug";
pub const PREF_MAP_STYLE: &str = "mapStyle";
pub const PREF_TOKEN: &str = "token";
pub const PREF_SAMPLE_INTERVAL_MS: &str = "sampleIntervalMs";

pub const DEFAULT_MAP_STYLE: &str = "OSM";
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 100;
pub const DEFAULT_POSITION_JA: [f64; 3] = [138.0, 30.0, 3_000_000.0];
pub const DEFAULT_POSITION: [f64; 3] = [0.0, 35.0, 3_000_000.0];
pub const DEFAULT_ORIENTATION: [f64; 3] = [0.0, -1.3, 0.0];

/// Host preference map, string valued.
pub type Prefs = BTreeMap<String, String>;

/// Widget settings read once at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    /// Longitude, latitude (degrees) and height (meters).
    pub initial_position: [f64; 3],
    /// Heading, pitch, roll (radians).
    pub initial_orientation: [f64; 3],
    /// Gates the executor's `exec:` trace lines.
    pub debug: bool,
    /// Base map style name; `"OFF"` disables imagery.
    pub map_style: String,
    /// Renderer access token, passed through untouched.
    pub token: Option<String>,
    pub sample_interval_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            initial_position: DEFAULT_POSITION,
            initial_orientation: DEFAULT_ORIENTATION,
            debug: false,
            map_style: DEFAULT_MAP_STYLE.to_string(),
            token: None,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        }
    }
}

impl WidgetConfig {
    /// Reads the host preferences. Missing or malformed values fall back to
    /// their defaults; the position default depends on `language`.
    pub fn from_prefs(prefs: &Prefs, language: &str) -> Self {
        let get = |key: &str| prefs.get(key).map(String::as_str);

        let initial_position = get(PREF_INITIAL_POSITION)
            .and_then(parse_triple)
            .unwrap_or(if language == "ja" {
                DEFAULT_POSITION_JA
            } else {
                DEFAULT_POSITION
            });
        let initial_orientation = get(PREF_INITIAL_ORIENTATION)
            .and_then(parse_triple)
            .unwrap_or(DEFAULT_ORIENTATION);

        let map_style = match get(PREF_MAP_STYLE).map(str::trim) {
            None | Some("") => DEFAULT_MAP_STYLE.to_string(),
            Some(name) if name == STYLE_OFF || base_map_style(name).is_some() => name.to_string(),
            Some(name) => {
                warn!(style = name, "unknown map style, using {DEFAULT_MAP_STYLE}");
                DEFAULT_MAP_STYLE.to_string()
            }
        };

        Self {
            initial_position,
            initial_orientation,
            debug: get(PREF_DEBUG).is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            map_style,
            token: get(PREF_TOKEN)
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
            sample_interval_ms: get(PREF_SAMPLE_INTERVAL_MS)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS),
        }
    }

    pub fn initial_view(&self) -> CameraView {
        let [lon, lat, height] = self.initial_position;
        let [heading, pitch, roll] = self.initial_orientation;
        CameraView::from_degrees(lon, lat, height)
            .with_orientation(Orientation::new(heading, pitch, roll))
    }

    pub fn imagery(&self) -> ImagerySource {
        ImagerySource::style(self.map_style.clone())
    }

    pub fn sample_interval_s(&self) -> f64 {
        self.sample_interval_ms as f64 / 1000.0
    }
}

/// `"a, b, c"` with exactly three finite numbers.
fn parse_triple(value: &str) -> Option<[f64; 3]> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [a, b, c] if parts.iter().all(|v| v.is_finite()) => Some([*a, *b, *c]),
        _ => None,
    }
}

/// Formats three numbers the way the position/orientation preferences store them.
pub fn format_triple([a, b, c]: [f64; 3]) -> String {
    format!("{a}, {b}, {c}")
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_ORIENTATION, DEFAULT_POSITION, DEFAULT_POSITION_JA, Prefs, WidgetConfig,
        format_triple, parse_triple,
    };
    use pretty_assertions::assert_eq;

    fn prefs(pairs: &[(&str, &str)]) -> Prefs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_all_preferences() {
        let config = WidgetConfig::from_prefs(
            &prefs(&[
                ("initialPosition", "139.7, 35.6, 5000"),
                ("initialOrientation", "0.5,-1.0,0"),
                ("debug", "true"),
                ("mapStyle", "GSI_STD"),
                ("token", "abc"),
                ("sampleIntervalMs", "250"),
            ]),
            "en",
        );
        assert_eq!(config.initial_position, [139.7, 35.6, 5000.0]);
        assert_eq!(config.initial_orientation, [0.5, -1.0, 0.0]);
        assert!(config.debug);
        assert_eq!(config.map_style, "GSI_STD");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.sample_interval_s(), 0.25);
    }

    #[test]
    fn malformed_position_falls_back_by_language() {
        let bad = prefs(&[("initialPosition", "1, 2"), ("initialOrientation", "x, 0, 0")]);
        assert_eq!(WidgetConfig::from_prefs(&bad, "ja").initial_position, DEFAULT_POSITION_JA);
        let en = WidgetConfig::from_prefs(&bad, "en");
        assert_eq!(en.initial_position, DEFAULT_POSITION);
        assert_eq!(en.initial_orientation, DEFAULT_ORIENTATION);
    }

    #[test]
    fn unknown_map_style_uses_default_and_off_is_kept() {
        let config = WidgetConfig::from_prefs(&prefs(&[("mapStyle", "Bing")]), "en");
        assert_eq!(config.map_style, "OSM");
        let off = WidgetConfig::from_prefs(&prefs(&[("mapStyle", "OFF")]), "en");
        assert_eq!(off.imagery().resolve(), Ok(None));
    }

    #[test]
    fn triples_need_three_finite_numbers() {
        assert_eq!(parse_triple("1,2,3"), Some([1.0, 2.0, 3.0]));
        assert_eq!(parse_triple("1,2,3,4"), None);
        assert_eq!(parse_triple("1,inf,3"), None);
        assert_eq!(parse_triple(""), None);
        assert_eq!(format_triple([1.5, -2.0, 3.0]), "1.5, -2, 3");
    }
}
