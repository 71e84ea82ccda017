use serde::Deserialize;

use scene::components::ImageryProvider;

use crate::error::SourceError;

/// Style name that disables base imagery.
pub const STYLE_OFF: &str = "OFF";

/// Zoom level every base map is capped at.
const MAX_IMAGERY_LEVEL: u32 = 18;

const GSI_ATTRIBUTION: &str = "<a href=\"https://maps.gsi.go.jp/development/ichiran.html\" target=\"_blank\">Geospatial Information Authority of Japan Tile</a>";

/// A named XYZ base map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseMapStyle {
    pub name: &'static str,
    pub title: &'static str,
    pub attribution: &'static str,
    pub url: &'static str,
    pub min_zoom: u32,
    pub max_zoom: u32,
}

pub const BASE_MAP_STYLES: &[BaseMapStyle] = &[
    BaseMapStyle {
        name: "OSM",
        title: "Open Street Map",
        attribution: "© <a href=\"http://osm.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://creativecommons.org/licenses/by-sa/2.0/\">CC-BY-SA</a>",
        url: "https://tile.openstreetmap.org/",
        min_zoom: 0,
        max_zoom: 19,
    },
    BaseMapStyle {
        name: "GSI_STD",
        title: "GSI STD",
        attribution: GSI_ATTRIBUTION,
        url: "https://cyberjapandata.gsi.go.jp/xyz/std/",
        min_zoom: 2,
        max_zoom: 18,
    },
    BaseMapStyle {
        name: "GSI_PALE",
        title: "GSI PALE",
        attribution: GSI_ATTRIBUTION,
        url: "//cyberjapandata.gsi.go.jp/xyz/pale/",
        min_zoom: 5,
        max_zoom: 18,
    },
    BaseMapStyle {
        name: "GSI_ENG",
        title: "GSI ENGLISH",
        attribution: GSI_ATTRIBUTION,
        url: "//cyberjapandata.gsi.go.jp/xyz/english/",
        min_zoom: 5,
        max_zoom: 11,
    },
    BaseMapStyle {
        name: "GSI_BLANK",
        title: "GSI BLANK",
        attribution: GSI_ATTRIBUTION,
        url: "//cyberjapandata.gsi.go.jp/xyz/blank/",
        min_zoom: 5,
        max_zoom: 14,
    },
    BaseMapStyle {
        name: "GSI_RELIEF",
        title: "GSI RELIEF",
        attribution: GSI_ATTRIBUTION,
        url: "//cyberjapandata.gsi.go.jp/xyz/relief/",
        min_zoom: 5,
        max_zoom: 15,
    },
];

pub fn base_map_style(name: &str) -> Option<&'static BaseMapStyle> {
    BASE_MAP_STYLES.iter().find(|s| s.name == name)
}

impl BaseMapStyle {
    pub fn imagery_provider(&self) -> ImageryProvider {
        ImageryProvider {
            url: self.url.to_string(),
            credit: Some(self.attribution.to_string()),
            minimum_level: 0,
            maximum_level: MAX_IMAGERY_LEVEL,
        }
    }
}

/// Imagery chosen by style name or by explicit URL.
///
/// `style` wins when both are present; `"OFF"` removes the imagery.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagerySource {
    pub style: Option<String>,
    pub url: Option<String>,
    pub credit: Option<String>,
    pub minimum_level: Option<u32>,
    pub maximum_level: Option<u32>,
}

impl ImagerySource {
    pub fn style(name: impl Into<String>) -> Self {
        Self {
            style: Some(name.into()),
            ..Self::default()
        }
    }

    /// The provider to install, `None` to turn base imagery off.
    pub fn resolve(&self) -> Result<Option<ImageryProvider>, SourceError> {
        if let Some(name) = self.style.as_deref() {
            if name == STYLE_OFF {
                return Ok(None);
            }
            let style =
                base_map_style(name).ok_or_else(|| SourceError::UnknownStyle(name.to_string()))?;
            return Ok(Some(style.imagery_provider()));
        }

        let url = self.url.as_deref().ok_or(SourceError::MissingSource)?;
        let mut provider = ImageryProvider::new(url);
        provider.credit = self.credit.clone();
        if let Some(min) = self.minimum_level {
            provider.minimum_level = min;
        }
        if let Some(max) = self.maximum_level {
            provider.maximum_level = max;
        }
        Ok(Some(provider))
    }
}
