use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use foundation::math::Geodetic;
use layers::raster::ImagerySource;
use layers::terrain::TerrainSource;
use runtime::operation::OperationHandle;
use runtime::scheduler::HookId;
use scene::Renderer;
use scene::components::{CameraView, FlyTarget, HeadingPitchRange, TickHook, TilesetOptions};

use crate::command::CommandKind;
use crate::error::CommandError;

pub const DEFAULT_POINT_SIZE: f64 = 5.0;
pub const DEFAULT_ORBIT_PITCH: f64 = -std::f64::consts::FRAC_PI_8;
pub const DEFAULT_ORBIT_RANGE_M: f64 = 2_900.0;
pub const DEFAULT_ORBIT_RATE: f64 = 0.005;

/// Executor-owned state that operations may read and replace.
#[derive(Debug, Default)]
pub struct OperationContext {
    /// The installed orbit hook, if any. At most one is active.
    pub orbit_hook: Option<HookId>,
}

/// One recognized command kind, ready to run against the renderer.
///
/// The returned handle resolves when the effect is over; effects that finish
/// synchronously return an already completed handle.
pub trait Operation {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError>;
}

/// A camera position in degrees; `height` defaults to 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPlacement {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub height: Option<f64>,
}

impl CameraPlacement {
    fn height(&self) -> f64 {
        self.height.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SetView(pub CameraPlacement);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FlyTo(pub CameraPlacement);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTileset {
    pub url: String,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub point_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateCamera {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub range: Option<f64>,
    /// Radians per tick.
    #[serde(default)]
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SetProviders {
    pub imagery: Option<ImagerySource>,
    pub terrain: Option<TerrainSource>,
}

/// A command with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOp {
    AddTileset(AddTileset),
    SetView(SetView),
    FlyTo(FlyTo),
    RotateCamera(RotateCamera),
    SetImageryProvider(ImagerySource),
    SetTerrainProvider(TerrainSource),
    SetProviders(SetProviders),
}

fn params<T: DeserializeOwned>(kind: CommandKind, value: Value) -> Result<T, CommandError> {
    serde_json::from_value(value).map_err(|source| CommandError::InvalidValue {
        kind: kind.name(),
        source,
    })
}

impl CommandOp {
    pub fn parse(kind: CommandKind, value: Value) -> Result<Self, CommandError> {
        Ok(match kind {
            CommandKind::AddTileset => CommandOp::AddTileset(params(kind, value)?),
            CommandKind::SetView => CommandOp::SetView(params(kind, value)?),
            CommandKind::FlyTo => CommandOp::FlyTo(params(kind, value)?),
            CommandKind::RotateCamera => CommandOp::RotateCamera(params(kind, value)?),
            CommandKind::SetImageryProvider => CommandOp::SetImageryProvider(params(kind, value)?),
            CommandKind::SetTerrainProvider => CommandOp::SetTerrainProvider(params(kind, value)?),
            CommandKind::SetProviders => CommandOp::SetProviders(params(kind, value)?),
        })
    }

    fn as_operation(&self) -> &dyn Operation {
        match self {
            CommandOp::AddTileset(op) => op,
            CommandOp::SetView(op) => op,
            CommandOp::FlyTo(op) => op,
            CommandOp::RotateCamera(op) => op,
            CommandOp::SetImageryProvider(op) => op,
            CommandOp::SetTerrainProvider(op) => op,
            CommandOp::SetProviders(op) => op,
        }
    }
}

impl Operation for CommandOp {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        self.as_operation().run(renderer, ctx)
    }
}

impl Operation for SetView {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        _ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        let p = &self.0;
        renderer.set_view(CameraView::from_degrees(p.longitude, p.latitude, p.height()));
        Ok(OperationHandle::completed())
    }
}

impl Operation for FlyTo {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        _ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        let p = &self.0;
        Ok(renderer.fly_to(FlyTarget::point_degrees(
            p.longitude,
            p.latitude,
            p.height(),
        )))
    }
}

impl Operation for AddTileset {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        _ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        if let (Some(lon), Some(lat)) = (self.longitude, self.latitude) {
            renderer.set_view(CameraView::from_degrees(
                lon,
                lat,
                self.height.unwrap_or(0.0),
            ));
        }
        let handle = renderer.add_tileset(TilesetOptions {
            url: self.url.clone(),
            point_size: self.point_size.unwrap_or(DEFAULT_POINT_SIZE),
        })?;
        Ok(handle)
    }
}

impl Operation for RotateCamera {
    /// Locks onto the point and orbits it, replacing any earlier orbit.
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        if let Some(previous) = ctx.orbit_hook.take() {
            renderer.remove_tick_hook(previous);
            debug!(hook = previous.0, "replaced orbit hook");
        }
        renderer.look_at(
            Geodetic::from_degrees(self.longitude, self.latitude, self.height.unwrap_or(0.0)),
            HeadingPitchRange::new(
                0.0,
                self.pitch.unwrap_or(DEFAULT_ORBIT_PITCH),
                self.range.unwrap_or(DEFAULT_ORBIT_RANGE_M),
            ),
        );
        ctx.orbit_hook = Some(renderer.add_tick_hook(TickHook::RotateRight {
            radians_per_tick: self.rate.unwrap_or(DEFAULT_ORBIT_RATE),
        }));
        Ok(OperationHandle::completed())
    }
}

impl Operation for ImagerySource {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        _ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        renderer.set_imagery_provider(self.resolve()?)?;
        Ok(OperationHandle::completed())
    }
}

impl Operation for TerrainSource {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        _ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        renderer.set_terrain_provider(self.resolve())?;
        Ok(OperationHandle::completed())
    }
}

impl Operation for SetProviders {
    fn run(
        &self,
        renderer: &mut dyn Renderer,
        ctx: &mut OperationContext,
    ) -> Result<OperationHandle, CommandError> {
        if let Some(imagery) = &self.imagery {
            imagery.run(renderer, ctx)?;
        }
        if let Some(terrain) = &self.terrain {
            terrain.run(renderer, ctx)?;
        }
        Ok(OperationHandle::completed())
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandOp, Operation, OperationContext};
    use crate::command::CommandKind;
    use crate::error::CommandError;
    use pretty_assertions::assert_eq;
    use runtime::operation::OperationState;
    use scene::{HeadlessGlobe, Renderer};
    use scene::components::TerrainProvider;
    use serde_json::json;

    fn run(globe: &mut HeadlessGlobe, kind: CommandKind, value: serde_json::Value) -> OperationState {
        let op = CommandOp::parse(kind, value).unwrap();
        op.run(globe, &mut OperationContext::default())
            .unwrap()
            .state()
    }

    #[test]
    fn set_view_completes_synchronously() {
        let mut globe = HeadlessGlobe::default();
        let state = run(
            &mut globe,
            CommandKind::SetView,
            json!({"longitude": 10, "latitude": 20}),
        );
        assert_eq!(state, OperationState::Completed);
        assert!((globe.camera().position.lat_deg() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn fly_to_stays_pending_until_landing() {
        let mut globe = HeadlessGlobe::default();
        let state = run(
            &mut globe,
            CommandKind::FlyTo,
            json!({"longitude": 30, "latitude": 40, "height": 500}),
        );
        assert_eq!(state, OperationState::Pending);
        assert!(globe.is_flying());
    }

    #[test]
    fn add_tileset_applies_location_and_default_point_size() {
        let mut globe = HeadlessGlobe::default();
        let state = run(
            &mut globe,
            CommandKind::AddTileset,
            json!({"url": "city/tileset.json", "longitude": 139.7, "latitude": 35.6}),
        );
        assert_eq!(state, OperationState::Pending);
        let tileset = globe.tilesets().next().unwrap();
        assert_eq!(tileset.options.point_size, 5.0);
        assert_eq!(globe.event_kinds(), vec!["camera.set_view", "tileset.add"]);
    }

    #[test]
    fn rotate_camera_replaces_previous_orbit() {
        let mut globe = HeadlessGlobe::default();
        let mut ctx = OperationContext::default();
        for lon in [10, 20] {
            CommandOp::parse(
                CommandKind::RotateCamera,
                json!({"longitude": lon, "latitude": 0}),
            )
            .unwrap()
            .run(&mut globe, &mut ctx)
            .unwrap();
        }
        assert_eq!(globe.tick_hook_count(), 1);
        assert!(ctx.orbit_hook.is_some());
    }

    #[test]
    fn providers_swap_together() {
        let mut globe = HeadlessGlobe::default();
        run(
            &mut globe,
            CommandKind::SetProviders,
            json!({
                "imagery": {"style": "GSI_PALE"},
                "terrain": {"url": "https://terrain.example/"}
            }),
        );
        assert_eq!(
            globe.imagery().map(|p| p.url.as_str()),
            Some("//cyberjapandata.gsi.go.jp/xyz/pale/")
        );
        assert!(matches!(globe.terrain(), TerrainProvider::Url { .. }));

        run(&mut globe, CommandKind::SetTerrainProvider, json!({}));
        assert_eq!(globe.terrain(), &TerrainProvider::Ellipsoid);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = CommandOp::parse(CommandKind::FlyTo, json!({"longitude": "east"})).unwrap_err();
        assert!(matches!(err, CommandError::InvalidValue { kind: "flyto", .. }));
    }

    #[test]
    fn unknown_imagery_style_fails_the_handler() {
        let mut globe = HeadlessGlobe::default();
        let op = CommandOp::parse(CommandKind::SetImageryProvider, json!({"style": "Bing"})).unwrap();
        let err = op.run(&mut globe, &mut OperationContext::default()).unwrap_err();
        assert!(matches!(err, CommandError::Source(_)));
    }
}
