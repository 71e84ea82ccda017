use foundation::bounds::GeoBounds;
use foundation::math::Geodetic;
use runtime::frame::Frame;
use runtime::operation::OperationHandle;
use runtime::scheduler::HookId;

use crate::components::{
    CameraEvent, CameraState, CameraView, Drawable, FlyTarget, HeadingPitchRange,
    ImageryProvider, PinSpec, TerrainProvider, TickHook, TilesetOptions,
};
use crate::entity::{CollectionId, DrawableHandle, EntityId, ImageId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("invalid drawable: {0}")]
    InvalidDrawable(String),
    #[error("tileset {url} failed to load: {reason}")]
    Tileset { url: String, reason: String },
    #[error("provider rejected: {0}")]
    Provider(String),
    #[error("pin rasterization failed: {0}")]
    Icon(String),
}

/// The globe-rendering engine, seen from the widget core.
///
/// Everything here is single-threaded: the widget calls in from its own
/// callbacks and never holds a borrow across frames. Long-running effects
/// return an [`OperationHandle`] that the renderer resolves from `advance`.
pub trait Renderer {
    fn add_entity(&mut self, drawable: Drawable) -> Result<EntityId, RenderError>;

    /// Adds a named sub-collection; removing its handle removes every member.
    fn add_collection(
        &mut self,
        name: &str,
        drawables: Vec<Drawable>,
    ) -> Result<CollectionId, RenderError>;

    /// Returns `false` when the handle is stale or unknown.
    fn remove_drawable(&mut self, handle: DrawableHandle) -> bool;

    /// Removes every entity and collection. Tilesets and providers stay.
    fn remove_all_drawables(&mut self);

    fn rasterize_pin(&mut self, pin: &PinSpec) -> Result<ImageId, RenderError>;

    fn camera(&self) -> CameraState;

    /// Visible longitude/latitude extent, `None` when the globe is not in view.
    fn view_rectangle(&self) -> Option<GeoBounds>;

    /// Drawable under a canvas pixel. Collection members resolve to their collection.
    fn pick(&self, screen_px: [f64; 2]) -> Option<DrawableHandle>;

    fn set_view(&mut self, view: CameraView);

    fn fly_to(&mut self, target: FlyTarget) -> OperationHandle;

    /// Locks the camera onto `center` at the given offset.
    fn look_at(&mut self, center: Geodetic, offset: HeadingPitchRange);

    fn add_tick_hook(&mut self, hook: TickHook) -> HookId;

    fn remove_tick_hook(&mut self, id: HookId) -> bool;

    /// Starts loading a tileset; the handle resolves once it is ready and framed.
    fn add_tileset(&mut self, options: TilesetOptions) -> Result<OperationHandle, RenderError>;

    /// `None` removes the base imagery.
    fn set_imagery_provider(&mut self, provider: Option<ImageryProvider>)
    -> Result<(), RenderError>;

    fn set_terrain_provider(&mut self, provider: TerrainProvider) -> Result<(), RenderError>;

    /// Advances the renderer clock one frame: runs tick hooks, progresses
    /// animations and loads, and returns the camera motion edges seen since the
    /// previous call.
    fn advance(&mut self, frame: Frame) -> Vec<CameraEvent>;
}
