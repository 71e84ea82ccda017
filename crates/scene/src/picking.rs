use foundation::bounds::GeoBounds;
use foundation::math::precision::stable_total_cmp_f64;

use crate::entity::DrawableHandle;
use crate::spatial::{Bvh, Item as BvhItem};

/// A pickable drawable and its longitude/latitude extent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickCandidate {
    pub handle: DrawableHandle,
    pub bounds: GeoBounds,
}

/// Maps a canvas pixel to `[lon, lat]` inside the visible rectangle.
///
/// `(0, 0)` is the top-left corner. Returns `None` outside the canvas.
pub fn screen_to_lon_lat(
    view: &GeoBounds,
    canvas_px: [f64; 2],
    screen_px: [f64; 2],
) -> Option<[f64; 2]> {
    let [w, h] = canvas_px;
    let [x, y] = screen_px;
    if w <= 0.0 || h <= 0.0 || !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
        return None;
    }
    let span_lon = if view.crosses_antimeridian() {
        view.east + 360.0 - view.west
    } else {
        view.width()
    };
    let mut lon = view.west + x / w * span_lon;
    if lon > 180.0 {
        lon -= 360.0;
    }
    let lat = view.north - y / h * view.height();
    Some([lon, lat])
}

/// Deterministic point picking.
///
/// Ordering contract:
/// - Candidates whose bounds (grown by `tolerance_deg`) contain the point are hits.
/// - The hit whose bounds center is closest wins; ties go to the earlier candidate.
pub fn pick_at(
    candidates: &[PickCandidate],
    lon: f64,
    lat: f64,
    tolerance_deg: f64,
) -> Option<DrawableHandle> {
    let items: Vec<BvhItem> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| BvhItem {
            key: i as u32,
            bounds: GeoBounds::new(
                c.bounds.west - tolerance_deg,
                c.bounds.south - tolerance_deg,
                c.bounds.east + tolerance_deg,
                c.bounds.north + tolerance_deg,
            ),
        })
        .collect();

    let bvh = Bvh::build(items);
    let hits = bvh.query(&GeoBounds::point(lon, lat));

    let distance2 = |key: u32| {
        let [clon, clat] = candidates[key as usize].bounds.center();
        (clon - lon).powi(2) + (clat - lat).powi(2)
    };

    hits.into_iter()
        .min_by(|a, b| stable_total_cmp_f64(distance2(*a), distance2(*b)).then_with(|| a.cmp(b)))
        .map(|key| candidates[key as usize].handle)
}
