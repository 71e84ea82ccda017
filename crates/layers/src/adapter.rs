use foundation::math::Geodetic;
use scene::Renderer;
use scene::components::{
    Billboard, BillboardImage, Drawable, PolygonGraphic, Polyline, VerticalOrigin,
};

use crate::error::{GeometryError, RegistryError};
use crate::poi::{Location, Poi, Position};
use crate::symbology::IconCache;

const UNNAMED_MARKER: &str = "no name";

/// Renderer-ready description of one PoI.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawableSet {
    Single(Drawable),
    /// Named sub-collection, removed as a unit. The name is the PoI id.
    Collection { name: String, members: Vec<Drawable> },
}

impl DrawableSet {
    pub(crate) fn len(&self) -> usize {
        match self {
            DrawableSet::Single(_) => 1,
            DrawableSet::Collection { members, .. } => members.len(),
        }
    }
}

fn geodetic(p: &Position) -> Geodetic {
    Geodetic::from_degrees(p.lon, p.lat, 0.0)
}

fn marker(label: String, position: &Position, image: BillboardImage) -> Billboard {
    Billboard {
        label,
        position: geodetic(position),
        image,
        vertical_origin: VerticalOrigin::Bottom,
        description: None,
    }
}

fn polyline(poi: &Poi, line: &[Position]) -> Drawable {
    Drawable::Polyline(Polyline {
        name: poi.data_name().unwrap_or_default().to_string(),
        positions: line.iter().map(geodetic).collect(),
        width: poi.style.line_width(),
        color: poi.style.line_color(),
    })
}

/// Holes are not drawn; only the outer ring is used.
fn polygon(poi: &Poi, rings: &[Vec<Position>]) -> Result<Drawable, GeometryError> {
    let outer = rings.first().ok_or(GeometryError::MissingOuterRing)?;
    Ok(Drawable::Polygon(PolygonGraphic {
        name: poi.data_name().unwrap_or_default().to_string(),
        outer: outer.iter().map(geodetic).collect(),
        height: poi.height.unwrap_or(0.0),
        fill: poi.style.fill_color(),
        outline: true,
        outline_color: poi.style.outline_color(),
        outline_width: poi.style.outline_width(),
    }))
}

/// Converts a PoI location into its drawables.
///
/// Marker icons are resolved through `icons`, rasterizing on the renderer
/// only on a cache miss. Unsupported kinds fail with
/// [`RegistryError::Geometry`] before anything is rasterized.
pub fn build_drawable(
    poi: &Poi,
    icons: &mut IconCache,
    renderer: &mut dyn Renderer,
) -> Result<DrawableSet, RegistryError> {
    let collection = |members: Vec<Drawable>| DrawableSet::Collection {
        name: poi.id.clone(),
        members,
    };

    let set = match &poi.location {
        Location::Point(p) => {
            let image = icons.resolve(renderer, poi)?;
            let label = poi.title.clone().unwrap_or_else(|| poi.id.clone());
            let mut billboard = marker(label, p, image);
            billboard.description = poi.info_window.clone().or_else(|| poi.tooltip.clone());
            DrawableSet::Single(Drawable::Billboard(billboard))
        }
        Location::MultiPoint(points) => {
            let image = icons.resolve(renderer, poi)?;
            let label = poi.data_name().unwrap_or(UNNAMED_MARKER);
            collection(
                points
                    .iter()
                    .map(|p| Drawable::Billboard(marker(label.to_string(), p, image.clone())))
                    .collect(),
            )
        }
        Location::LineString(line) => DrawableSet::Single(polyline(poi, line)),
        Location::MultiLineString(lines) => {
            collection(lines.iter().map(|line| polyline(poi, line)).collect())
        }
        Location::Polygon(rings) => DrawableSet::Single(polygon(poi, rings)?),
        Location::MultiPolygon(polygons) => collection(
            polygons
                .iter()
                .map(|rings| polygon(poi, rings))
                .collect::<Result<_, _>>()?,
        ),
        Location::Unsupported { kind } => {
            return Err(GeometryError::Unsupported { kind: kind.clone() }.into());
        }
    };
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::{DrawableSet, build_drawable};
    use crate::error::{GeometryError, RegistryError};
    use crate::poi::Poi;
    use crate::symbology::IconCache;
    use pretty_assertions::assert_eq;
    use scene::HeadlessGlobe;
    use scene::components::{BillboardImage, Drawable, Rgba, VerticalOrigin};
    use serde_json::{Value, json};

    fn poi(location: Value) -> Poi {
        serde_json::from_value(json!({
            "id": "x",
            "location": location,
            "data": {"name": "river"}
        }))
        .unwrap()
    }

    fn build(p: &Poi) -> Result<DrawableSet, RegistryError> {
        build_drawable(p, &mut IconCache::new(), &mut HeadlessGlobe::default())
    }

    #[test]
    fn point_is_a_labelled_bottom_anchored_billboard() {
        let mut p = poi(json!({"type": "Point", "coordinates": [10, 20]}));
        p.tooltip = Some("tip".into());
        p.icon = Some(crate::poi::IconSource::Url("pin.svg".into()));

        let DrawableSet::Single(Drawable::Billboard(b)) = build(&p).unwrap() else {
            panic!("expected a single billboard");
        };
        assert_eq!(b.label, "x");
        assert_eq!(b.description.as_deref(), Some("tip"));
        assert_eq!(b.vertical_origin, VerticalOrigin::Bottom);
        assert_eq!(b.image, BillboardImage::Url("pin.svg".into()));
        assert!((b.position.lon_deg() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn multi_kinds_build_one_member_per_part() {
        let cases = [
            (json!({"type": "MultiPoint", "coordinates": [[0, 0], [1, 1], [2, 2]]}), 3),
            (
                json!({"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]]}),
                2,
            ),
            (
                json!({"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 5]]]
                ]}),
                2,
            ),
        ];
        for (location, expected) in cases {
            let set = build(&poi(location)).unwrap();
            let DrawableSet::Collection { name, members } = &set else {
                panic!("expected a collection");
            };
            assert_eq!(name, "x");
            assert_eq!(members.len(), expected);
        }
    }

    #[test]
    fn polygon_uses_outer_ring_and_defaults() {
        let mut p = poi(json!({"type": "Polygon", "coordinates": [
            [[0, 0], [4, 0], [4, 4], [0, 0]],
            [[1, 1], [2, 1], [2, 2], [1, 1]]
        ]}));
        p.height = Some(12.0);

        let DrawableSet::Single(Drawable::Polygon(g)) = build(&p).unwrap() else {
            panic!("expected a polygon");
        };
        assert_eq!(g.outer.len(), 4);
        assert_eq!(g.name, "river");
        assert_eq!(g.height, 12.0);
        assert_eq!(g.fill, Rgba::BLUE.with_alpha(0.1));
        assert_eq!(g.outline_width, 5.0);
    }

    #[test]
    fn line_defaults_to_red_width_three() {
        let p = poi(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}));
        let DrawableSet::Single(Drawable::Polyline(l)) = build(&p).unwrap() else {
            panic!("expected a polyline");
        };
        assert_eq!(l.width, 3.0);
        assert_eq!(l.color, Rgba::RED);
    }

    #[test]
    fn unsupported_kind_builds_nothing() {
        let mut globe = HeadlessGlobe::default();
        let p = poi(json!({"type": "Circle", "coordinates": [0, 0]}));
        let err = build_drawable(&p, &mut IconCache::new(), &mut globe).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Geometry(GeometryError::Unsupported {
                kind: "Circle".into()
            })
        );
        assert!(globe.rasterized_pins().is_empty());
    }

    #[test]
    fn polygon_without_rings_is_rejected() {
        let p = poi(json!({"type": "Polygon", "coordinates": []}));
        assert_eq!(
            build(&p).unwrap_err(),
            RegistryError::Geometry(GeometryError::MissingOuterRing)
        );
    }
}
