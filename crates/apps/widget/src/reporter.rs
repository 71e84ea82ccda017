use serde_json::Value;
use tracing::trace;

use layers::PoiRegistry;
use scene::Renderer;
use scene::components::CameraEvent;

use crate::outputs::OutputEndpoint;

/// Decimal places the sampled view rectangle is rounded to.
pub const VIEW_DECIMALS: i32 = 4;

/// Pushes the visible PoI list while the camera moves.
///
/// Two states, idle and moving, switched by camera motion edges. A sampling
/// timer accumulates frame time and fires every `interval_s` regardless of
/// frame rate; a firing reports only while moving.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportReporter {
    is_moving: bool,
    interval_s: f64,
    elapsed_s: f64,
}

impl ViewportReporter {
    pub fn new(interval_s: f64) -> Self {
        Self {
            is_moving: false,
            interval_s: interval_s.max(0.0),
            elapsed_s: 0.0,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn on_camera_event(&mut self, event: CameraEvent) {
        self.is_moving = matches!(event, CameraEvent::MoveStart);
    }

    /// Advances the timer by `dt_s`; `true` when it fired at least once.
    pub fn advance_timer(&mut self, dt_s: f64) -> bool {
        self.elapsed_s += dt_s.max(0.0);
        if self.elapsed_s < self.interval_s {
            return false;
        }
        self.elapsed_s = if self.interval_s > 0.0 {
            self.elapsed_s % self.interval_s
        } else {
            0.0
        };
        true
    }

    /// Timer tick: reports when the timer fires while moving.
    pub fn tick(
        &mut self,
        dt_s: f64,
        registry: &PoiRegistry,
        renderer: &dyn Renderer,
        output: &mut dyn OutputEndpoint,
    ) -> bool {
        self.advance_timer(dt_s) && self.is_moving && report_visible(registry, renderer, output)
    }
}

/// Pushes the `data` of every PoI in the current view.
///
/// Skips all work when `output` is not connected. With no view rectangle the
/// pushed list is empty. Returns whether a push happened.
pub fn report_visible(
    registry: &PoiRegistry,
    renderer: &dyn Renderer,
    output: &mut dyn OutputEndpoint,
) -> bool {
    if !output.is_connected() {
        return false;
    }
    let visible = match renderer.view_rectangle() {
        Some(view) => registry.query(&view.rounded(VIEW_DECIMALS)),
        None => Vec::new(),
    };
    trace!(count = visible.len(), "visible pois");
    output.push(Value::Array(visible));
    true
}
