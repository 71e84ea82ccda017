//! Replays a scripted widget session against the headless globe.
//!
//! A script is a JSON document of host preferences plus an ordered list of
//! steps (inbound endpoint payloads, frame ticks, clicks and camera captures).
//! Every outbound push is collected as an [`Emission`] tagged with the step
//! that caused it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use runtime::frame::Frame;
use scene::HeadlessGlobe;
use widget::{Prefs, RecordingOutput, WidgetConfig, WidgetError, WidgetSession};

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_FRAME_RATE: f64 = 60.0;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("session failed to start: {0}")]
    Start(#[from] WidgetError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub prefs: Prefs,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    pub steps: Vec<Step>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    PoiInput(Value),
    #[serde(rename = "replacePoIs")]
    ReplacePois(Value),
    PoiInputCenter(Value),
    DeletePoiInput(Value),
    CommandInput(Value),
    LayerInfo(Value),
    /// Advances this many frames.
    Tick(u64),
    Click([f64; 2]),
    ResetExecutor,
    Capture(Capture),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capture {
    Position,
    Orientation,
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emission {
    pub step: usize,
    pub port: &'static str,
    pub payload: Value,
}

pub fn load_script(path: &Path) -> Result<Script, ReplayError> {
    let text = fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

type Session = WidgetSession<HeadlessGlobe, RecordingOutput>;

/// Runs `script` to the end.
///
/// A step that fails is reported on the `error` port and the replay moves on,
/// the way a host surfaces endpoint errors without tearing the widget down.
pub fn replay(script: &Script, force_debug: bool) -> Result<Vec<Emission>, ReplayError> {
    let mut config = WidgetConfig::from_prefs(&script.prefs, &script.language);
    config.debug |= force_debug;

    let mut session = WidgetSession::new(
        config,
        HeadlessGlobe::default(),
        RecordingOutput::connected(),
        RecordingOutput::connected(),
    );
    session.start()?;

    let mut frame = Frame::first_at_rate(script.frame_rate);
    let mut emissions = Vec::new();
    for (index, step) in script.steps.iter().enumerate() {
        match run_step(&mut session, step, &mut frame) {
            Ok(Some(prefs)) => emissions.push(Emission {
                step: index,
                port: "prefs",
                payload: prefs_to_json(prefs),
            }),
            Ok(None) => {}
            Err(err) => {
                warn!(step = index, %err, "step failed");
                emissions.push(Emission {
                    step: index,
                    port: "error",
                    payload: Value::String(err.to_string()),
                });
            }
        }
        drain(&mut session, index, &mut emissions);
    }

    info!(
        steps = script.steps.len(),
        emissions = emissions.len(),
        frames = frame.index,
        "replay finished"
    );
    Ok(emissions)
}

fn run_step(
    session: &mut Session,
    step: &Step,
    frame: &mut Frame,
) -> Result<Option<Prefs>, WidgetError> {
    match step {
        Step::PoiInput(data) => {
            session.poi_input(data.clone())?;
        }
        Step::ReplacePois(data) => {
            session.replace_pois(data.clone())?;
        }
        Step::PoiInputCenter(data) => {
            session.poi_input_center(data.clone())?;
        }
        Step::DeletePoiInput(data) => {
            session.delete_poi_input(data.clone())?;
        }
        Step::CommandInput(data) => session.command_input(data.clone())?,
        Step::LayerInfo(data) => {
            session.layer_info(data.clone())?;
        }
        Step::Tick(count) => {
            for _ in 0..*count {
                session.tick(*frame)?;
                *frame = frame.next();
            }
        }
        Step::Click(px) => {
            session.on_left_click(*px);
        }
        Step::ResetExecutor => session.reset_executor(),
        Step::Capture(Capture::Position) => return Ok(Some(session.capture_position())),
        Step::Capture(Capture::Orientation) => return Ok(Some(session.capture_orientation())),
        Step::Capture(Capture::Location) => return Ok(Some(session.capture_location())),
    }
    Ok(None)
}

fn drain(session: &mut Session, step: usize, emissions: &mut Vec<Emission>) {
    for payload in session.poi_list_mut().take() {
        emissions.push(Emission {
            step,
            port: "poiList",
            payload,
        });
    }
    for payload in session.single_poi_mut().take() {
        emissions.push(Emission {
            step,
            port: "singlePoi",
            payload,
        });
    }
}

fn prefs_to_json(prefs: Prefs) -> Value {
    Value::Object(
        prefs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
    )
}
