use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use scene::components::{BillboardImage, PinSpec, Rgba};
use scene::entity::ImageId;
use scene::{RenderError, Renderer};

use crate::poi::Poi;

pub const DEFAULT_GLYPH: &str = "star";
pub const DEFAULT_PIN_SIZE: u32 = 48;
pub const DEFAULT_LINE_WIDTH: f64 = 3.0;
pub const DEFAULT_OUTLINE_WIDTH: f64 = 5.0;
pub const DEFAULT_FILL_ALPHA: f32 = 0.1;

/// Named colors accepted anywhere a style takes a color.
const COLOR_TABLE: &[(&str, &str)] = &[
    ("white", "#ffffff"),
    ("silver", "#c0c0c0"),
    ("gray", "#808080"),
    ("black", "#000000"),
    ("red", "#ff0000"),
    ("maroon", "#800000"),
    ("yellow", "#ffff00"),
    ("olive", "#808000"),
    ("lime", "#00ff00"),
    ("green", "#008000"),
    ("aqua", "#00ffff"),
    ("teal", "#008080"),
    ("blue", "#0000ff"),
    ("navy", "#000080"),
    ("fuchsia", "#ff00ff"),
    ("purple", "#800080"),
    ("orange", "#ffa500"),
    ("naivy", "#1f2f54"),
    ("fi-cyan", "#5dc0cf"),
    ("fi-naivy", "#002e67"),
    ("fi-green", "#15a97c"),
    ("fi-grey", "#b1b2b4"),
    ("fi-red", "#d36b59"),
];

/// Resolves a style color by table name or hex code, case-insensitively.
///
/// `None`, unknown names and malformed hex codes all yield `default`.
pub fn color_code(color: Option<&str>, default: Rgba) -> Rgba {
    let Some(color) = color else {
        return default;
    };
    let color = color.trim().to_ascii_lowercase();
    if color == "transparent" {
        return Rgba::TRANSPARENT;
    }
    let hex = if color.starts_with('#') {
        Some(color.as_str())
    } else {
        COLOR_TABLE
            .iter()
            .find(|(name, _)| *name == color)
            .map(|(_, hex)| *hex)
    };
    hex.and_then(Rgba::from_hex).unwrap_or(default)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSymbol {
    pub glyph: Option<String>,
    pub color: Option<String>,
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokeStyle {
    pub width: Option<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FillStyle {
    pub color: Option<String>,
    pub outline_color: Option<String>,
    pub outline_width: Option<f64>,
}

/// Optional per-kind rendering hints. Every attribute has a default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoiStyle {
    pub font_symbol: FontSymbol,
    pub stroke: StrokeStyle,
    pub fill: FillStyle,
}

impl PoiStyle {
    pub fn line_width(&self) -> f64 {
        positive_or(self.stroke.width, DEFAULT_LINE_WIDTH)
    }

    pub fn line_color(&self) -> Rgba {
        color_code(self.stroke.color.as_deref(), Rgba::RED)
    }

    pub fn fill_color(&self) -> Rgba {
        color_code(
            self.fill.color.as_deref(),
            Rgba::BLUE.with_alpha(DEFAULT_FILL_ALPHA),
        )
    }

    pub fn outline_color(&self) -> Rgba {
        color_code(self.fill.outline_color.as_deref(), Rgba::BLUE)
    }

    pub fn outline_width(&self) -> f64 {
        positive_or(self.fill.outline_width, DEFAULT_OUTLINE_WIDTH)
    }

    /// The glyph pin this style asks for, `None` when no glyph is named.
    pub fn glyph_pin(&self) -> Option<PinSpec> {
        let symbol = &self.font_symbol;
        let glyph = symbol.glyph.as_deref()?;
        Some(PinSpec {
            glyph: glyph.to_string(),
            color: color_code(symbol.color.as_deref(), Rgba::GREEN),
            size: symbol.size.filter(|s| *s > 0).unwrap_or(DEFAULT_PIN_SIZE),
        })
    }
}

/// Zero, negative and non-finite widths fall back to `default`.
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn default_pin() -> PinSpec {
    PinSpec {
        glyph: DEFAULT_GLYPH.to_string(),
        color: Rgba::GREEN,
        size: DEFAULT_PIN_SIZE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GlyphKey {
    glyph: String,
    color: [u8; 4],
    size: u32,
}

/// Rasterized marker images, kept for the lifetime of the widget.
///
/// Glyph pins are keyed by their full visual tuple; the default marker is
/// rasterized at most once.
#[derive(Debug, Default)]
pub struct IconCache {
    glyphs: BTreeMap<GlyphKey, ImageId>,
    default_marker: Option<ImageId>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len() + usize::from(self.default_marker.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marker image for a point PoI.
    ///
    /// Precedence: icon url string, icon object `src`, glyph pin, default marker.
    pub fn resolve(
        &mut self,
        renderer: &mut dyn Renderer,
        poi: &Poi,
    ) -> Result<BillboardImage, RenderError> {
        if let Some(icon) = &poi.icon {
            return Ok(BillboardImage::Url(icon.src().to_string()));
        }

        if let Some(pin) = poi.style.glyph_pin() {
            let key = GlyphKey {
                glyph: pin.glyph.clone(),
                color: pin.color.to_rgba8(),
                size: pin.size,
            };
            if let Some(image) = self.glyphs.get(&key) {
                return Ok(BillboardImage::Raster(*image));
            }
            let image = renderer.rasterize_pin(&pin)?;
            debug!(glyph = %pin.glyph, size = pin.size, "rasterized glyph pin");
            self.glyphs.insert(key, image);
            return Ok(BillboardImage::Raster(image));
        }

        if let Some(image) = self.default_marker {
            return Ok(BillboardImage::Raster(image));
        }
        let image = renderer.rasterize_pin(&default_pin())?;
        self.default_marker = Some(image);
        Ok(BillboardImage::Raster(image))
    }
}
