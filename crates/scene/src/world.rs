use foundation::arena::Arena;
use foundation::bounds::GeoBounds;
use foundation::ids::IdAllocator;
use foundation::math::{Geodetic, ecef_to_geodetic, wrap_longitude_deg};
use runtime::event_bus::{Event, EventBus};
use runtime::frame::Frame;
use runtime::operation::OperationHandle;
use runtime::scheduler::{HookId, Scheduler};

use crate::components::{
    CameraEvent, CameraState, CameraView, Drawable, FlyTarget, HeadingPitchRange,
    ImageryProvider, Orientation, PinSpec, TerrainProvider, TickHook, TilesetOptions,
};
use crate::entity::{CollectionId, DrawableHandle, EntityId, ImageId, TilesetId};
use crate::picking::{PickCandidate, pick_at, screen_to_lon_lat};
use crate::renderer::{RenderError, Renderer};

/// Rough ground distance of one degree at the equator.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Lowest camera height used when framing a degenerate rectangle.
const MIN_FRAMING_HEIGHT_M: f64 = 1_000.0;

/// Padding applied around a framed rectangle.
const FRAMING_MARGIN: f64 = 1.1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeadlessConfig {
    pub canvas_px: [f64; 2],
    pub fov_deg: f64,
    /// Frames an animated flight takes to land.
    pub flight_frames: u32,
    /// Frames a tileset takes to become ready.
    pub tileset_load_frames: u32,
    pub pick_radius_px: f64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            canvas_px: [1280.0, 720.0],
            fov_deg: 60.0,
            flight_frames: 30,
            tileset_load_frames: 10,
            pick_radius_px: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: String,
    pub members: Vec<Drawable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub options: TilesetOptions,
    pub ready: bool,
}

#[derive(Debug)]
struct Flight {
    handle: OperationHandle,
    from: Geodetic,
    to: Geodetic,
    orientation: Orientation,
    total: u32,
    elapsed: u32,
}

#[derive(Debug)]
struct TilesetLoad {
    id: TilesetId,
    handle: OperationHandle,
    frames_left: u32,
}

/// Deterministic in-memory globe.
///
/// Implements [`Renderer`] without a GPU: drawables live in generational
/// arenas, flights and tileset loads finish after a fixed number of frames and
/// every effect is traced on an [`EventBus`].
#[derive(Debug)]
pub struct HeadlessGlobe {
    config: HeadlessConfig,
    entities: Arena<Drawable>,
    collections: Arena<Collection>,
    tilesets: Arena<Tileset>,
    images: IdAllocator,
    pins: Vec<PinSpec>,
    camera: CameraState,
    moving: bool,
    flight: Option<Flight>,
    loads: Vec<TilesetLoad>,
    imagery: Option<ImageryProvider>,
    terrain: TerrainProvider,
    hooks: Scheduler<TickHook>,
    pending_events: Vec<CameraEvent>,
    fail_next_tileset: Option<String>,
    bus: EventBus,
}

impl Default for HeadlessGlobe {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl HeadlessGlobe {
    pub fn new(config: HeadlessConfig) -> Self {
        Self {
            config,
            entities: Arena::new(),
            collections: Arena::new(),
            tilesets: Arena::new(),
            images: IdAllocator::new(),
            pins: Vec::new(),
            camera: CameraState {
                position: Geodetic::from_degrees(0.0, 0.0, 20_000_000.0),
                orientation: Orientation::top_down(),
            },
            moving: false,
            flight: None,
            loads: Vec::new(),
            imagery: None,
            terrain: TerrainProvider::Ellipsoid,
            hooks: Scheduler::new(),
            pending_events: Vec::new(),
            fail_next_tileset: None,
            bus: EventBus::new(),
        }
    }

    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Entities plus every collection member.
    pub fn drawable_count(&self) -> usize {
        self.entities.len()
            + self
                .collections
                .iter()
                .map(|(_, c)| c.members.len())
                .sum::<usize>()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Drawable> {
        self.entities.get(id.0)
    }

    pub fn collection(&self, id: CollectionId) -> Option<&Collection> {
        self.collections.get(id.0)
    }

    pub fn collection_named(&self, name: &str) -> Option<&Collection> {
        self.collections
            .iter()
            .map(|(_, c)| c)
            .find(|c| c.name == name)
    }

    pub fn tilesets(&self) -> impl Iterator<Item = &Tileset> {
        self.tilesets.iter().map(|(_, t)| t)
    }

    pub fn imagery(&self) -> Option<&ImageryProvider> {
        self.imagery.as_ref()
    }

    pub fn terrain(&self) -> &TerrainProvider {
        &self.terrain
    }

    pub fn tick_hook_count(&self) -> usize {
        self.hooks.hook_count()
    }

    pub fn rasterized_pins(&self) -> &[PinSpec] {
        &self.pins
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn events(&self) -> &[Event] {
        self.bus.events()
    }

    pub fn event_kinds(&self) -> Vec<&'static str> {
        self.bus.kinds()
    }

    /// Makes the next `add_tileset` call fail with `reason`.
    pub fn fail_next_tileset(&mut self, reason: impl Into<String>) {
        self.fail_next_tileset = Some(reason.into());
    }

    fn begin_motion(&mut self) {
        if !self.moving {
            self.moving = true;
            self.pending_events.push(CameraEvent::MoveStart);
        }
    }

    fn end_motion(&mut self) {
        if self.moving {
            self.moving = false;
            self.pending_events.push(CameraEvent::MoveEnd);
        }
    }

    fn cancel_flight(&mut self) {
        if let Some(flight) = self.flight.take() {
            flight.handle.cancel();
            self.bus.emit("camera.fly_to.cancel", "");
        }
    }

    /// Moves the camera instantly, interrupting any flight.
    fn jump_to(&mut self, position: Geodetic, orientation: Orientation) {
        self.cancel_flight();
        self.begin_motion();
        self.camera = CameraState {
            position,
            orientation,
        };
        self.end_motion();
    }

    fn framing_height(&self, rect: &GeoBounds) -> f64 {
        let half_extent_deg = rect.width().max(rect.height()) * 0.5 * FRAMING_MARGIN;
        let half_fov = (self.config.fov_deg * 0.5).to_radians();
        (half_extent_deg * METERS_PER_DEGREE / half_fov.tan()).max(MIN_FRAMING_HEIGHT_M)
    }

    fn pick_candidates(&self) -> Vec<PickCandidate> {
        let mut out = Vec::new();
        for (handle, drawable) in self.entities.iter() {
            if let Some(bounds) = drawable.bounds() {
                out.push(PickCandidate {
                    handle: DrawableHandle::Entity(EntityId(handle)),
                    bounds,
                });
            }
        }
        for (handle, collection) in self.collections.iter() {
            for bounds in collection.members.iter().filter_map(Drawable::bounds) {
                out.push(PickCandidate {
                    handle: DrawableHandle::Collection(CollectionId(handle)),
                    bounds,
                });
            }
        }
        out
    }

    fn step_flight(&mut self) {
        let Some(flight) = self.flight.as_mut() else {
            return;
        };
        flight.elapsed += 1;
        if flight.elapsed < flight.total {
            let t = flight.elapsed as f64 / flight.total as f64;
            let lerp = |a: f64, b: f64| a + (b - a) * t;
            self.camera.position = Geodetic::new(
                lerp(flight.from.lat_rad, flight.to.lat_rad),
                lerp(flight.from.lon_rad, flight.to.lon_rad),
                lerp(flight.from.alt_m, flight.to.alt_m),
            );
            return;
        }

        if let Some(flight) = self.flight.take() {
            self.camera = CameraState {
                position: flight.to,
                orientation: flight.orientation,
            };
            flight.handle.complete();
            self.bus.emit("camera.fly_to.complete", "");
            self.end_motion();
        }
    }

    fn step_loads(&mut self) {
        let mut still_loading = Vec::new();
        for mut load in std::mem::take(&mut self.loads) {
            load.frames_left = load.frames_left.saturating_sub(1);
            if load.frames_left > 0 {
                still_loading.push(load);
                continue;
            }
            if let Some(tileset) = self.tilesets.get_mut(load.id.0) {
                tileset.ready = true;
                self.bus.emit("tileset.ready", tileset.options.url.clone());
            }
            load.handle.complete();
        }
        self.loads = still_loading;
    }
}

impl Renderer for HeadlessGlobe {
    fn add_entity(&mut self, drawable: Drawable) -> Result<EntityId, RenderError> {
        validate(&drawable)?;
        let id = EntityId(self.entities.insert(drawable));
        self.bus.emit("entity.add", format!("{}", id.index()));
        Ok(id)
    }

    fn add_collection(
        &mut self,
        name: &str,
        drawables: Vec<Drawable>,
    ) -> Result<CollectionId, RenderError> {
        for d in &drawables {
            validate(d)?;
        }
        let len = drawables.len();
        let id = CollectionId(self.collections.insert(Collection {
            name: name.to_string(),
            members: drawables,
        }));
        self.bus.emit("collection.add", format!("{name} ({len})"));
        Ok(id)
    }

    fn remove_drawable(&mut self, handle: DrawableHandle) -> bool {
        match handle {
            DrawableHandle::Entity(id) => {
                let removed = self.entities.remove(id.0).is_some();
                if removed {
                    self.bus.emit("entity.remove", format!("{}", id.index()));
                }
                removed
            }
            DrawableHandle::Collection(id) => match self.collections.remove(id.0) {
                Some(collection) => {
                    self.bus.emit("collection.remove", collection.name);
                    true
                }
                None => false,
            },
        }
    }

    fn remove_all_drawables(&mut self) {
        self.entities.clear();
        self.collections.clear();
        self.bus.emit("drawables.clear", "");
    }

    fn rasterize_pin(&mut self, pin: &PinSpec) -> Result<ImageId, RenderError> {
        if pin.size == 0 {
            return Err(RenderError::Icon(format!("zero-sized pin '{}'", pin.glyph)));
        }
        self.pins.push(pin.clone());
        self.bus.emit("pin.rasterize", format!("{}@{}", pin.glyph, pin.size));
        Ok(ImageId(self.images.next_id()))
    }

    fn camera(&self) -> CameraState {
        self.camera
    }

    fn view_rectangle(&self) -> Option<GeoBounds> {
        let pos = self.camera.position;
        if !pos.alt_m.is_finite() || pos.alt_m <= 0.0 {
            return None;
        }
        let half_fov = (self.config.fov_deg * 0.5).to_radians();
        let half_extent = pos.alt_m * half_fov.tan() / METERS_PER_DEGREE;

        let lat = pos.lat_deg();
        let south = (lat - half_extent).max(-90.0);
        let north = (lat + half_extent).min(90.0);
        if half_extent >= 180.0 {
            return Some(GeoBounds::new(-180.0, south, 180.0, north));
        }

        let lon = pos.lon_deg();
        Some(GeoBounds::new(
            wrap_longitude_deg(lon - half_extent),
            south,
            wrap_longitude_deg(lon + half_extent),
            north,
        ))
    }

    fn pick(&self, screen_px: [f64; 2]) -> Option<DrawableHandle> {
        let view = self.view_rectangle()?;
        let [lon, lat] = screen_to_lon_lat(&view, self.config.canvas_px, screen_px)?;
        let span_lon = if view.crosses_antimeridian() {
            view.east + 360.0 - view.west
        } else {
            view.width()
        };
        let tolerance = self.config.pick_radius_px * span_lon / self.config.canvas_px[0];
        pick_at(&self.pick_candidates(), lon, lat, tolerance)
    }

    fn set_view(&mut self, view: CameraView) {
        let orientation = view.orientation.unwrap_or(self.camera.orientation);
        let position = ecef_to_geodetic(view.destination);
        self.bus.emit(
            "camera.set_view",
            format!("{:.4},{:.4}", position.lon_deg(), position.lat_deg()),
        );
        self.jump_to(position, orientation);
    }

    fn fly_to(&mut self, target: FlyTarget) -> OperationHandle {
        self.cancel_flight();
        let to = match target {
            FlyTarget::Destination(ecef) => ecef_to_geodetic(ecef),
            FlyTarget::Rectangle(rect) => {
                let [lon, lat] = rect.center();
                Geodetic::from_degrees(lon, lat, self.framing_height(&rect))
            }
        };
        self.bus.emit(
            "camera.fly_to",
            format!("{:.4},{:.4}", to.lon_deg(), to.lat_deg()),
        );

        let handle = OperationHandle::pending();
        self.flight = Some(Flight {
            handle: handle.clone(),
            from: self.camera.position,
            to,
            orientation: Orientation::top_down(),
            total: self.config.flight_frames,
            elapsed: 0,
        });
        self.begin_motion();
        handle
    }

    fn look_at(&mut self, center: Geodetic, offset: HeadingPitchRange) {
        let above = offset.range * (-offset.pitch).sin().max(0.0);
        let position = Geodetic::new(center.lat_rad, center.lon_rad, center.alt_m + above);
        self.bus.emit(
            "camera.look_at",
            format!("{:.4},{:.4}", center.lon_deg(), center.lat_deg()),
        );
        self.jump_to(
            position,
            Orientation::new(offset.heading, offset.pitch, 0.0),
        );
    }

    fn add_tick_hook(&mut self, hook: TickHook) -> HookId {
        let id = self.hooks.add_hook(hook);
        self.bus.emit("hook.add", format!("{}", id.0));
        id
    }

    fn remove_tick_hook(&mut self, id: HookId) -> bool {
        let removed = self.hooks.remove_hook(id).is_some();
        if removed {
            self.bus.emit("hook.remove", format!("{}", id.0));
        }
        removed
    }

    fn add_tileset(&mut self, options: TilesetOptions) -> Result<OperationHandle, RenderError> {
        if let Some(reason) = self.fail_next_tileset.take() {
            return Err(RenderError::Tileset {
                url: options.url,
                reason,
            });
        }
        self.bus.emit("tileset.add", options.url.clone());
        let id = TilesetId(self.tilesets.insert(Tileset {
            options,
            ready: false,
        }));
        let handle = OperationHandle::pending();
        self.loads.push(TilesetLoad {
            id,
            handle: handle.clone(),
            frames_left: self.config.tileset_load_frames.max(1),
        });
        Ok(handle)
    }

    fn set_imagery_provider(
        &mut self,
        provider: Option<ImageryProvider>,
    ) -> Result<(), RenderError> {
        if let Some(p) = &provider
            && p.url.trim().is_empty()
        {
            return Err(RenderError::Provider("imagery url is empty".into()));
        }
        let label = provider.as_ref().map_or("none", |p| p.url.as_str());
        self.bus.emit("imagery.set", label.to_string());
        self.imagery = provider;
        Ok(())
    }

    fn set_terrain_provider(&mut self, provider: TerrainProvider) -> Result<(), RenderError> {
        let label = match &provider {
            TerrainProvider::Ellipsoid => "ellipsoid".to_string(),
            TerrainProvider::Url { url, .. } if url.trim().is_empty() => {
                return Err(RenderError::Provider("terrain url is empty".into()));
            }
            TerrainProvider::Url { url, .. } => url.clone(),
        };
        self.bus.emit("terrain.set", label);
        self.terrain = provider;
        Ok(())
    }

    fn advance(&mut self, frame: Frame) -> Vec<CameraEvent> {
        self.bus.begin_frame(frame);

        let rotation: f64 = self
            .hooks
            .hooks()
            .map(|(_, hook)| match hook {
                TickHook::RotateRight { radians_per_tick } => *radians_per_tick,
            })
            .sum();
        if rotation != 0.0 {
            let heading = self.camera.orientation.heading + rotation;
            self.camera.orientation.heading = heading.rem_euclid(std::f64::consts::TAU);
        }

        self.step_flight();
        self.step_loads();
        std::mem::take(&mut self.pending_events)
    }
}

fn validate(drawable: &Drawable) -> Result<(), RenderError> {
    let finite = drawable
        .positions_deg()
        .iter()
        .all(|[lon, lat]| lon.is_finite() && lat.is_finite());
    if !finite {
        return Err(RenderError::InvalidDrawable(
            "non-finite coordinate".to_string(),
        ));
    }
    Ok(())
}
