use crate::components::Rgba;

/// Raster imagery source for the globe surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageryProvider {
    pub url: String,
    pub credit: Option<String>,
    pub minimum_level: u32,
    pub maximum_level: u32,
}

impl ImageryProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credit: None,
            minimum_level: 0,
            maximum_level: 18,
        }
    }
}

/// Elevation source. `Ellipsoid` is the flat WGS84 surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TerrainProvider {
    #[default]
    Ellipsoid,
    Url {
        url: String,
        request_vertex_normals: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TilesetOptions {
    pub url: String,
    pub point_size: f64,
}

/// Parameters of a rasterized map pin: maki glyph, color, pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct PinSpec {
    pub glyph: String,
    pub color: Rgba,
    pub size: u32,
}

/// Work the renderer performs once per frame until the hook is removed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickHook {
    /// Orbit the current look-at target by rotating the camera right.
    RotateRight { radians_per_tick: f64 },
}
