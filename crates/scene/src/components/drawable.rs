use foundation::bounds::GeoBounds;
use foundation::math::Geodetic;

use crate::components::Rgba;
use crate::entity::ImageId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerticalOrigin {
    Center,
    /// Image anchored at its bottom edge, so pins point at the position.
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BillboardImage {
    Url(String),
    Raster(ImageId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Billboard {
    pub label: String,
    pub position: Geodetic,
    pub image: BillboardImage,
    pub vertical_origin: VerticalOrigin,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub name: String,
    pub positions: Vec<Geodetic>,
    pub width: f64,
    pub color: Rgba,
}

/// Filled polygon over a single outer ring.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGraphic {
    pub name: String,
    pub outer: Vec<Geodetic>,
    pub height: f64,
    pub fill: Rgba,
    pub outline: bool,
    pub outline_color: Rgba,
    pub outline_width: f64,
}

/// Renderer-ready description of one visual object.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Billboard(Billboard),
    Polyline(Polyline),
    Polygon(PolygonGraphic),
}

impl Drawable {
    /// Positions as `[lon, lat]` degrees.
    pub fn positions_deg(&self) -> Vec<[f64; 2]> {
        let to_deg = |g: &Geodetic| [g.lon_deg(), g.lat_deg()];
        match self {
            Drawable::Billboard(b) => vec![to_deg(&b.position)],
            Drawable::Polyline(l) => l.positions.iter().map(to_deg).collect(),
            Drawable::Polygon(p) => p.outer.iter().map(to_deg).collect(),
        }
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_positions(self.positions_deg())
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawable, Polyline};
    use crate::components::Rgba;
    use foundation::bounds::GeoBounds;
    use foundation::math::Geodetic;

    #[test]
    fn polyline_bounds_cover_vertices() {
        let line = Drawable::Polyline(Polyline {
            name: String::new(),
            positions: vec![
                Geodetic::from_degrees(0.0, 0.0, 0.0),
                Geodetic::from_degrees(10.0, 5.0, 0.0),
            ],
            width: 3.0,
            color: Rgba::RED,
        });
        let b = line.bounds().unwrap();
        assert!((b.east - 10.0).abs() < 1e-9);
        assert!((b.north - 5.0).abs() < 1e-9);
        assert!(b.intersects(&GeoBounds::point(5.0, 2.0)));
    }
}
