use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use foundation::bounds::GeoBounds;
use geo::Geometry;
use serde_json::Value;
use tracing::{debug, warn};

use scene::components::FlyTarget;
use scene::entity::DrawableHandle;
use scene::spatial::{Bvh, Item as BvhItem};
use scene::{RenderError, Renderer};

use crate::adapter::{DrawableSet, build_drawable};
use crate::feature::{build_feature, envelope, feature_bounds, intersects_region};
use crate::poi::{Location, Poi};
use crate::symbology::IconCache;

/// Camera height above a single centered point, on top of the PoI `height`.
pub const POINT_TARGET_HEIGHT_M: f64 = 1_000.0;

/// One registered PoI and what it owns on the renderer.
#[derive(Debug)]
pub struct PoiRecord {
    poi: Poi,
    handle: DrawableHandle,
    drawable_count: usize,
    /// Analytical geometry of `poi.location`, built on first read.
    feature: OnceCell<Option<Geometry<f64>>>,
}

impl PoiRecord {
    pub fn poi(&self) -> &Poi {
        &self.poi
    }

    pub fn handle(&self) -> DrawableHandle {
        self.handle
    }

    pub fn drawable_count(&self) -> usize {
        self.drawable_count
    }

    pub fn feature(&self) -> Option<&Geometry<f64>> {
        self.feature
            .get_or_init(|| build_feature(&self.poi.location))
            .as_ref()
    }

    pub fn is_feature_built(&self) -> bool {
        self.feature.get().is_some()
    }
}

#[derive(Debug)]
struct SpatialIndex {
    bvh: Bvh,
    ids: Vec<String>,
}

/// The set of displayed PoIs, keyed by id.
///
/// Every record owns exactly one renderer handle (an entity or a
/// sub-collection) and every handle the registry created belongs to a record.
///
/// Ordering contract:
/// - Batches apply in input order; a later duplicate id wins.
/// - `query` results follow ascending id order.
#[derive(Debug, Default)]
pub struct PoiRegistry {
    records: BTreeMap<String, PoiRecord>,
    icons: IconCache,
    /// Rebuilt lazily after any mutation.
    index: OnceCell<SpatialIndex>,
}

impl PoiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PoiRecord> {
        self.records.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn icons(&self) -> &IconCache {
        &self.icons
    }

    /// Total renderer drawables owned by all records.
    pub fn drawable_count(&self) -> usize {
        self.records.values().map(|r| r.drawable_count).sum()
    }

    /// Inserts or replaces each PoI, returning how many were registered.
    ///
    /// An existing record is removed from the renderer before its replacement
    /// is built, so a kind change never leaves an orphan behind. A PoI whose
    /// geometry is unsupported or that the renderer rejects is logged and
    /// skipped; its id ends up absent and the rest of the batch still applies.
    pub fn upsert_many(&mut self, renderer: &mut dyn Renderer, pois: Vec<Poi>) -> usize {
        let mut applied = 0;
        for poi in pois {
            self.remove_record(renderer, &poi.id);
            let set = match build_drawable(&poi, &mut self.icons, renderer) {
                Ok(set) => set,
                Err(err) => {
                    warn!(id = %poi.id, kind = poi.location.kind_name(), %err, "skipping poi");
                    continue;
                }
            };
            let id = poi.id.clone();
            match self.insert(renderer, poi, set) {
                Ok(()) => applied += 1,
                Err(err) => warn!(%id, %err, "renderer rejected poi, skipping"),
            }
        }
        applied
    }

    /// Clears every record and drawable, then registers `pois`.
    pub fn replace_all(&mut self, renderer: &mut dyn Renderer, pois: Vec<Poi>) -> usize {
        renderer.remove_all_drawables();
        self.records.clear();
        self.index.take();
        self.upsert_many(renderer, pois)
    }

    /// Removes the given ids; unknown ids are ignored. Returns how many went.
    pub fn remove_many<I, S>(&mut self, renderer: &mut dyn Renderer, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for id in ids {
            if self.remove_record(renderer, id.as_ref()) {
                removed += 1;
            }
        }
        removed
    }

    /// Registers `pois` and returns where the camera should go to show them.
    ///
    /// Exactly one Point PoI given targets its position, lifted by the PoI
    /// `height` plus [`POINT_TARGET_HEIGHT_M`]. Anything else (several PoIs,
    /// duplicates included, or one non-Point PoI) targets the envelope of
    /// whichever of them registered. Nothing registered means no target.
    pub fn center_on(&mut self, renderer: &mut dyn Renderer, pois: Vec<Poi>) -> Option<FlyTarget> {
        let single_point = match pois.as_slice() {
            [poi] => match &poi.location {
                Location::Point(p) => Some((p.lon, p.lat, poi.height.unwrap_or(0.0))),
                _ => None,
            },
            _ => None,
        };
        let mut ids: Vec<String> = Vec::new();
        for poi in &pois {
            if !ids.contains(&poi.id) {
                ids.push(poi.id.clone());
            }
        }
        self.upsert_many(renderer, pois);

        let records: Vec<&PoiRecord> = ids.iter().filter_map(|id| self.records.get(id)).collect();
        if records.is_empty() {
            return None;
        }
        if let Some((lon, lat, height)) = single_point {
            return Some(FlyTarget::point_degrees(lon, lat, height + POINT_TARGET_HEIGHT_M));
        }
        envelope(records.iter().filter_map(|r| r.feature())).map(FlyTarget::Rectangle)
    }

    /// `data` of every record whose feature intersects `region`.
    ///
    /// Read-only with respect to the records; a rectangle crossing the
    /// antimeridian is queried as its two halves.
    pub fn query(&self, region: &GeoBounds) -> Vec<Value> {
        let index = self.index.get_or_init(|| self.build_index());
        let (first, second) = region.split_antimeridian();

        let mut hits: BTreeSet<&str> = BTreeSet::new();
        for part in std::iter::once(first).chain(second) {
            for key in index.bvh.query(&part) {
                let id = index.ids[key as usize].as_str();
                if let Some(feature) = self.records.get(id).and_then(PoiRecord::feature)
                    && intersects_region(feature, &part)
                {
                    hits.insert(id);
                }
            }
        }

        hits.into_iter()
            .filter_map(|id| self.records.get(id))
            .map(|r| r.poi.data.clone())
            .collect()
    }

    /// The PoI owning a picked drawable.
    pub fn poi_for_handle(&self, handle: DrawableHandle) -> Option<&Poi> {
        self.records
            .values()
            .find(|r| r.handle == handle)
            .map(|r| &r.poi)
    }

    fn insert(
        &mut self,
        renderer: &mut dyn Renderer,
        poi: Poi,
        set: DrawableSet,
    ) -> Result<(), RenderError> {
        let drawable_count = set.len();
        let handle = match set {
            DrawableSet::Single(drawable) => DrawableHandle::Entity(renderer.add_entity(drawable)?),
            DrawableSet::Collection { name, members } => {
                DrawableHandle::Collection(renderer.add_collection(&name, members)?)
            }
        };
        debug!(id = %poi.id, kind = poi.location.kind_name(), drawable_count, "registered poi");
        self.index.take();
        self.records.insert(
            poi.id.clone(),
            PoiRecord {
                poi,
                handle,
                drawable_count,
                feature: OnceCell::new(),
            },
        );
        Ok(())
    }

    fn remove_record(&mut self, renderer: &mut dyn Renderer, id: &str) -> bool {
        let Some(record) = self.records.remove(id) else {
            return false;
        };
        if !renderer.remove_drawable(record.handle) {
            warn!(id, "drawable was already gone from the renderer");
        }
        self.index.take();
        true
    }

    fn build_index(&self) -> SpatialIndex {
        let mut ids = Vec::new();
        let mut items = Vec::new();
        for (id, record) in &self.records {
            if let Some(bounds) = record.feature().and_then(feature_bounds) {
                items.push(BvhItem {
                    key: ids.len() as u32,
                    bounds,
                });
                ids.push(id.clone());
            }
        }
        SpatialIndex {
            bvh: Bvh::build(items),
            ids,
        }
    }
}
