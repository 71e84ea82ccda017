use serde_json::Value;
use tracing::{debug, info};

use commands::{Command, CommandExecutor};
use layers::layer::LayerAction;
use layers::{Poi, PoiRegistry};
use runtime::frame::Frame;
use runtime::operation::OperationHandle;
use scene::Renderer;
use scene::components::CameraEvent;

use crate::config::{
    PREF_INITIAL_ORIENTATION, PREF_INITIAL_POSITION, Prefs, WidgetConfig, format_triple,
};
use crate::endpoints::{PoiRef, decode_layer_info, decode_list};
use crate::error::WidgetError;
use crate::outputs::OutputEndpoint;
use crate::reporter::{ViewportReporter, report_visible};

/// One widget instance.
///
/// Owns the PoI registry, the command executor and the viewport reporter, and
/// holds the renderer and both outbound endpoints. Every host callback enters
/// through a method here and runs to completion.
pub struct WidgetSession<R: Renderer, O: OutputEndpoint> {
    config: WidgetConfig,
    renderer: R,
    registry: PoiRegistry,
    executor: CommandExecutor,
    reporter: ViewportReporter,
    poi_list: O,
    single_poi: O,
}

impl<R: Renderer, O: OutputEndpoint> WidgetSession<R, O> {
    pub fn new(config: WidgetConfig, renderer: R, poi_list: O, single_poi: O) -> Self {
        let executor = CommandExecutor::new(config.debug);
        let reporter = ViewportReporter::new(config.sample_interval_s());
        Self {
            config,
            renderer,
            registry: PoiRegistry::new(),
            executor,
            reporter,
            poi_list,
            single_poi,
        }
    }

    /// Installs the configured base imagery and initial camera view.
    pub fn start(&mut self) -> Result<(), WidgetError> {
        let imagery = self.config.imagery().resolve()?;
        self.renderer.set_imagery_provider(imagery)?;
        self.renderer.set_view(self.config.initial_view());
        info!(
            style = %self.config.map_style,
            token = self.config.token.is_some(),
            "widget session started"
        );
        Ok(())
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn registry(&self) -> &PoiRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn poi_list(&self) -> &O {
        &self.poi_list
    }

    pub fn poi_list_mut(&mut self) -> &mut O {
        &mut self.poi_list
    }

    pub fn single_poi(&self) -> &O {
        &self.single_poi
    }

    pub fn single_poi_mut(&mut self) -> &mut O {
        &mut self.single_poi
    }

    /// `poiInput`: inserts or replaces PoIs.
    ///
    /// A PoI that cannot be drawn is skipped; the rest of the batch applies
    /// and the visible list is still pushed.
    pub fn poi_input(&mut self, data: Value) -> Result<usize, WidgetError> {
        let pois: Vec<Poi> = decode_list(data)?;
        let applied = self.registry.upsert_many(&mut self.renderer, pois);
        self.report();
        Ok(applied)
    }

    /// `replacePoIs`: clears the globe, then registers the given PoIs.
    pub fn replace_pois(&mut self, data: Value) -> Result<usize, WidgetError> {
        let pois: Vec<Poi> = decode_list(data)?;
        let applied = self.registry.replace_all(&mut self.renderer, pois);
        self.report();
        Ok(applied)
    }

    /// `poiInputCenter`: registers PoIs and flies the camera to them.
    ///
    /// Returns the flight handle, `None` when nothing could be framed.
    pub fn poi_input_center(
        &mut self,
        data: Value,
    ) -> Result<Option<OperationHandle>, WidgetError> {
        let pois: Vec<Poi> = decode_list(data)?;
        let target = self.registry.center_on(&mut self.renderer, pois);
        self.report();
        Ok(target.map(|target| self.renderer.fly_to(target)))
    }

    /// `deletePoiInput`: removes PoIs given by id or by PoI object.
    pub fn delete_poi_input(&mut self, data: Value) -> Result<usize, WidgetError> {
        let refs: Vec<PoiRef> = decode_list(data)?;
        let removed = self
            .registry
            .remove_many(&mut self.renderer, refs.iter().map(PoiRef::id));
        self.report();
        Ok(removed)
    }

    /// `commandInput`: queues one command or an ordered batch.
    pub fn command_input(&mut self, data: Value) -> Result<(), WidgetError> {
        let commands: Vec<Command> = decode_list(data)?;
        self.executor.submit(&mut self.renderer, commands)?;
        Ok(())
    }

    /// `layerInfo`: recognized actions are accepted and ignored.
    pub fn layer_info(&mut self, data: Value) -> Result<LayerAction, WidgetError> {
        let (action, info) = decode_layer_info(data)?;
        action.apply(&info);
        Ok(action)
    }

    /// Unsticks the executor after a failed command.
    pub fn reset_executor(&mut self) {
        self.executor.reset();
    }

    /// Runs one renderer frame and everything that hangs off it.
    ///
    /// The viewport reporter ticks even when the executor fails to dispatch
    /// its next command; that failure is returned afterwards.
    pub fn tick(&mut self, frame: Frame) -> Result<Vec<CameraEvent>, WidgetError> {
        let events = self.renderer.advance(frame);
        for event in &events {
            self.reporter.on_camera_event(*event);
        }
        let polled = self.executor.poll(&mut self.renderer);
        self.reporter
            .tick(frame.dt_s, &self.registry, &self.renderer, &mut self.poi_list);
        polled?;
        Ok(events)
    }

    /// Left click at a canvas pixel. Pushes the picked PoI's `data` once.
    pub fn on_left_click(&mut self, screen_px: [f64; 2]) -> bool {
        if !self.single_poi.is_connected() {
            return false;
        }
        let Some(poi) = self
            .renderer
            .pick(screen_px)
            .and_then(|handle| self.registry.poi_for_handle(handle))
        else {
            return false;
        };
        debug!(id = %poi.id, "poi picked");
        self.single_poi.push(poi.data.clone());
        true
    }

    /// Current camera position as an `initialPosition` update.
    pub fn capture_position(&self) -> Prefs {
        let position = self.renderer.camera().position;
        Prefs::from([(
            PREF_INITIAL_POSITION.to_string(),
            format_triple([position.lon_deg(), position.lat_deg(), position.alt_m]),
        )])
    }

    /// Current camera orientation as an `initialOrientation` update.
    pub fn capture_orientation(&self) -> Prefs {
        let o = self.renderer.camera().orientation;
        Prefs::from([(
            PREF_INITIAL_ORIENTATION.to_string(),
            format_triple([o.heading, o.pitch, o.roll]),
        )])
    }

    pub fn capture_location(&self) -> Prefs {
        let mut prefs = self.capture_position();
        prefs.extend(self.capture_orientation());
        prefs
    }

    fn report(&mut self) {
        report_visible(&self.registry, &self.renderer, &mut self.poi_list);
    }
}

#[cfg(test)]
mod tests {
    use super::WidgetSession;
    use crate::config::{PREF_INITIAL_ORIENTATION, PREF_INITIAL_POSITION, Prefs, WidgetConfig};
    use crate::error::{InputError, WidgetError};
    use crate::outputs::{OutputEndpoint, RecordingOutput};
    use layers::layer::LayerAction;
    use pretty_assertions::assert_eq;
    use runtime::frame::Frame;
    use scene::components::CameraEvent;
    use scene::{HeadlessGlobe, Renderer};
    use serde_json::{Value, json};

    type Session = WidgetSession<HeadlessGlobe, RecordingOutput>;

    fn session_with(prefs: &[(&str, &str)]) -> Session {
        let prefs: Prefs = prefs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut session = WidgetSession::new(
            WidgetConfig::from_prefs(&prefs, "en"),
            HeadlessGlobe::default(),
            RecordingOutput::connected(),
            RecordingOutput::connected(),
        );
        session.start().unwrap();
        session
    }

    fn session() -> Session {
        session_with(&[(PREF_INITIAL_POSITION, "10, 20, 1000000")])
    }

    fn run_frames(session: &mut Session, frames: u64) -> Vec<CameraEvent> {
        let mut frame = Frame::first_at_rate(60.0);
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(session.tick(frame).unwrap());
            frame = frame.next();
        }
        events
    }

    fn point(id: &str, lon: f64, lat: f64) -> Value {
        json!({
            "id": id,
            "location": {"type": "Point", "coordinates": [lon, lat]},
            "data": {"id": id}
        })
    }

    #[test]
    fn start_applies_imagery_and_initial_view() {
        let session = session();
        let camera = session.renderer().camera();
        assert!((camera.position.lon_deg() - 10.0).abs() < 1e-6);
        assert!((camera.position.lat_deg() - 20.0).abs() < 1e-6);
        assert!((camera.orientation.pitch + 1.3).abs() < 1e-12);
        assert!(session.renderer().imagery().is_some());
    }

    #[test]
    fn map_style_off_removes_imagery() {
        let session = session_with(&[("mapStyle", "OFF")]);
        assert!(session.renderer().imagery().is_none());
    }

    #[test]
    fn every_mutation_pushes_the_visible_list() {
        let mut session = session();
        session.poi_input(point("p1", 10.0, 20.0)).unwrap();
        assert_eq!(session.poi_list().last(), Some(&json!([{"id": "p1"}])));

        session
            .poi_input(json!([point("p2", 10.5, 20.5), point("far", -120.0, -40.0)]))
            .unwrap();
        assert_eq!(
            session.poi_list().last(),
            Some(&json!([{"id": "p1"}, {"id": "p2"}]))
        );

        session.delete_poi_input(json!(["p1", {"id": "p2"}])).unwrap();
        assert_eq!(session.poi_list().last(), Some(&json!([])));
        assert_eq!(session.poi_list().pushes().len(), 3);

        session.replace_pois(Value::Null).unwrap();
        assert_eq!(session.registry().len(), 0);
        assert_eq!(session.renderer().drawable_count(), 0);
        assert_eq!(session.poi_list().pushes().len(), 4);
    }

    #[test]
    fn zero_size_glyph_between_siblings_applies_and_pushes() {
        let mut session = session();
        session.poi_input(point("a", 10.0, 20.0)).unwrap();
        let pushes_before = session.poi_list().pushes().len();

        let applied = session
            .poi_input(json!([
                point("a", 10.1, 20.0),
                {
                    "id": "b",
                    "location": {"type": "Point", "coordinates": [10.2, 20.0]},
                    "style": {"fontSymbol": {"glyph": "bus", "size": 0}},
                    "data": {"id": "b"}
                },
                point("c", 10.4, 20.0)
            ]))
            .unwrap();
        assert_eq!(applied, 3);
        assert_eq!(session.registry().ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(session.poi_list().pushes().len(), pushes_before + 1);
    }

    #[test]
    fn json_text_payloads_are_accepted() {
        let mut session = session();
        let text = point("p1", 10.0, 20.0).to_string();
        assert_eq!(session.poi_input(Value::String(text)).unwrap(), 1);
    }

    #[test]
    fn malformed_payloads_mutate_nothing() {
        let mut session = session();
        let err = session.poi_input(json!("not json")).unwrap_err();
        assert!(matches!(
            err,
            WidgetError::Input(InputError::EndpointTypeError(_))
        ));
        let err = session
            .poi_input(json!([{"id": "p1", "location": {"type": "Point", "coordinates": ["x"]}}]))
            .unwrap_err();
        assert!(matches!(
            err,
            WidgetError::Input(InputError::EndpointValueError(_))
        ));
        assert!(session.registry().is_empty());
        assert!(session.poi_list().pushes().is_empty());
    }

    #[test]
    fn disconnected_list_output_is_never_pushed() {
        let mut session = session();
        session.poi_list_mut().set_connected(false);
        session.poi_input(point("p1", 10.0, 20.0)).unwrap();
        assert!(session.poi_list().pushes().is_empty());
    }

    #[test]
    fn center_on_one_point_flies_there_and_reports_while_moving() {
        let mut session = session();
        run_frames(&mut session, 1);
        let handle = session
            .poi_input_center(point("p1", 12.0, 22.0))
            .unwrap()
            .unwrap();
        assert!(handle.is_pending());
        let pushes_before = session.poi_list().pushes().len();

        let events = run_frames(&mut session, 40);
        assert_eq!(events, vec![CameraEvent::MoveStart, CameraEvent::MoveEnd]);
        assert!(!handle.is_pending());
        assert!(session.poi_list().pushes().len() > pushes_before);

        let camera = session.renderer().camera();
        assert!((camera.position.lon_deg() - 12.0).abs() < 1e-6);
        assert!((camera.position.alt_m - 1_000.0).abs() < 1e-2);
    }

    #[test]
    fn center_on_nothing_does_not_fly() {
        let mut session = session();
        assert!(session.poi_input_center(json!([])).unwrap().is_none());
        assert!(!session.renderer().is_flying());
    }

    #[test]
    fn commands_run_in_order_across_frames() {
        let mut session = session();
        session
            .command_input(json!([
                {"type": "flyTo", "value": {"longitude": 30, "latitude": 40}},
                {"type": "setView", "value": {"longitude": 10, "latitude": 20}}
            ]))
            .unwrap();
        assert_eq!(session.executor().current_command(), "flyto");

        session
            .command_input(json!({"type": "rotateCamera", "value": {"longitude": 0, "latitude": 0}}))
            .unwrap();
        assert_eq!(session.executor().queue_len(), 2);

        run_frames(&mut session, 40);
        assert!(session.executor().is_idle());
        assert_eq!(session.executor().queue_len(), 0);
        assert_eq!(session.renderer().tick_hook_count(), 1);

        let kinds = session.renderer().event_kinds();
        let fly = kinds.iter().position(|k| *k == "camera.fly_to.complete");
        let set = kinds.iter().rposition(|k| *k == "camera.set_view");
        let look = kinds.iter().position(|k| *k == "camera.look_at");
        assert!(fly < set && set < look, "{kinds:?}");
    }

    #[test]
    fn failed_command_sticks_until_reset() {
        let mut session = session();
        let err = session
            .command_input(json!({"type": "setview", "value": {"longitude": "east"}}))
            .unwrap_err();
        assert!(matches!(err, WidgetError::Command(_)));
        session
            .command_input(json!({"type": "setview", "value": {"longitude": 1, "latitude": 2}}))
            .unwrap();
        assert_eq!(session.executor().current_command(), "setview");
        assert_eq!(session.executor().queue_len(), 1);

        session.reset_executor();
        run_frames(&mut session, 2);
        assert!(session.executor().is_idle());
        assert_eq!(session.executor().queue_len(), 0);
    }

    #[test]
    fn reporter_ticks_on_the_frame_a_queued_command_fails() {
        let mut session = session_with(&[
            (PREF_INITIAL_POSITION, "10, 20, 1000000"),
            ("sampleIntervalMs", "0"),
        ]);
        session
            .command_input(json!([
                {"type": "add3dtileset", "value": {"url": "tiles.json"}},
                {"type": "setview", "value": {"longitude": "east"}}
            ]))
            .unwrap();
        session.poi_input_center(point("p1", 12.0, 22.0)).unwrap();

        let mut frame = Frame::first_at_rate(60.0);
        let err = loop {
            let pushes_before = session.poi_list().pushes().len();
            match session.tick(frame) {
                Ok(_) => frame = frame.next(),
                Err(err) => {
                    assert_eq!(session.poi_list().pushes().len(), pushes_before + 1);
                    break err;
                }
            }
            assert!(frame.index < 20, "queued command never failed");
        };
        assert!(matches!(err, WidgetError::Command(_)));
        assert!(session.renderer().is_flying());
        assert_eq!(session.executor().current_command(), "setview");
    }

    #[test]
    fn layer_info_accepts_known_actions_only() {
        let mut session = session();
        assert_eq!(
            session.layer_info(json!({"action": "addLayer"})).unwrap(),
            LayerAction::AddLayer
        );
        assert!(matches!(
            session.layer_info(json!({"action": "dropTables"})),
            Err(WidgetError::Input(InputError::EndpointValueError(_)))
        ));
    }

    #[test]
    fn click_pushes_the_picked_poi_once() {
        let mut session = session();
        session.poi_input(point("p1", 10.0, 20.0)).unwrap();
        let [w, h] = session.renderer().config().canvas_px;

        assert!(session.on_left_click([w / 2.0, h / 2.0]));
        assert_eq!(session.single_poi().pushes(), &[json!({"id": "p1"})]);

        assert!(!session.on_left_click([0.0, 0.0]));
        assert_eq!(session.single_poi().pushes().len(), 1);
    }

    #[test]
    fn click_without_consumer_does_nothing() {
        let mut session = session();
        session.poi_input(point("p1", 10.0, 20.0)).unwrap();
        session.single_poi_mut().set_connected(false);
        let [w, h] = session.renderer().config().canvas_px;
        assert!(!session.on_left_click([w / 2.0, h / 2.0]));
        assert!(!session.single_poi().is_connected());
    }

    #[test]
    fn camera_capture_formats_preferences() {
        let session = session_with(&[
            (PREF_INITIAL_POSITION, "10, 20, 1000000"),
            (PREF_INITIAL_ORIENTATION, "0, -1.5, 0"),
        ]);
        let prefs = session.capture_location();
        assert_eq!(prefs[PREF_INITIAL_ORIENTATION], "0, -1.5, 0");
        let position: Vec<f64> = prefs[PREF_INITIAL_POSITION]
            .split(", ")
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(position.len(), 3);
        assert!((position[0] - 10.0).abs() < 1e-6);
        assert!((position[2] - 1_000_000.0).abs() < 1e-3);
    }
}
