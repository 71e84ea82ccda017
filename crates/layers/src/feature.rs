use foundation::bounds::GeoBounds;
use geo::{
    BoundingRect, Coord, Geometry, Intersects, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Rect,
};

use crate::poi::{Location, Position};

fn coord(p: &Position) -> Coord<f64> {
    Coord { x: p.lon, y: p.lat }
}

fn line(points: &[Position]) -> LineString<f64> {
    points.iter().map(coord).collect()
}

fn polygon(rings: &[Vec<Position>]) -> Polygon<f64> {
    let mut rings = rings.iter().map(|r| line(r));
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

/// Analytical geometry for a location, 1:1 with its kind.
///
/// Pure: the same location always yields the same geometry. Holes are kept
/// here even though they are not drawn. `None` for unsupported kinds.
pub fn build_feature(location: &Location) -> Option<Geometry<f64>> {
    let geometry = match location {
        Location::Point(p) => Geometry::Point(Point(coord(p))),
        Location::MultiPoint(points) => {
            Geometry::MultiPoint(MultiPoint(points.iter().map(|p| Point(coord(p))).collect()))
        }
        Location::LineString(points) => Geometry::LineString(line(points)),
        Location::MultiLineString(lines) => {
            Geometry::MultiLineString(MultiLineString(lines.iter().map(|l| line(l)).collect()))
        }
        Location::Polygon(rings) => Geometry::Polygon(polygon(rings)),
        Location::MultiPolygon(polygons) => {
            Geometry::MultiPolygon(MultiPolygon(polygons.iter().map(|p| polygon(p)).collect()))
        }
        Location::Unsupported { .. } => return None,
    };
    Some(geometry)
}

pub fn feature_bounds(feature: &Geometry<f64>) -> Option<GeoBounds> {
    let rect = feature.bounding_rect()?;
    Some(GeoBounds::new(
        rect.min().x,
        rect.min().y,
        rect.max().x,
        rect.max().y,
    ))
}

/// Combined bounding envelope of several features.
pub fn envelope<'a, I>(features: I) -> Option<GeoBounds>
where
    I: IntoIterator<Item = &'a Geometry<f64>>,
{
    features
        .into_iter()
        .filter_map(feature_bounds)
        .reduce(|a, b| a.union(&b))
}

/// Closed-interval intersection with a non-crossing rectangle.
pub fn intersects_region(feature: &Geometry<f64>, region: &GeoBounds) -> bool {
    let rect = Rect::new(
        Coord {
            x: region.west,
            y: region.south,
        },
        Coord {
            x: region.east,
            y: region.north,
        },
    );
    feature.intersects(&rect)
}
