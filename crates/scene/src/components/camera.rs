use foundation::bounds::GeoBounds;
use foundation::math::{Ecef, Geodetic, geodetic_to_ecef};

/// Camera orientation in radians.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orientation {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    /// Straight down, north up.
    pub fn top_down() -> Self {
        Self::new(0.0, -std::f64::consts::FRAC_PI_2, 0.0)
    }
}

/// Camera offset relative to a target point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeadingPitchRange {
    pub heading: f64,
    pub pitch: f64,
    /// Distance from the target (meters).
    pub range: f64,
}

impl HeadingPitchRange {
    pub fn new(heading: f64, pitch: f64, range: f64) -> Self {
        Self {
            heading,
            pitch,
            range,
        }
    }
}

/// Instant camera placement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    pub destination: Ecef,
    /// `None` keeps the current orientation.
    pub orientation: Option<Orientation>,
}

impl CameraView {
    pub fn from_degrees(lon: f64, lat: f64, height: f64) -> Self {
        Self {
            destination: geodetic_to_ecef(Geodetic::from_degrees(lon, lat, height)),
            orientation: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

/// Where an animated camera flight lands.
///
/// A rectangle target frames the whole extent; a destination target lands on
/// one position. The two zoom differently and are kept apart on purpose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FlyTarget {
    Destination(Ecef),
    Rectangle(GeoBounds),
}

impl FlyTarget {
    pub fn point_degrees(lon: f64, lat: f64, height: f64) -> Self {
        FlyTarget::Destination(geodetic_to_ecef(Geodetic::from_degrees(lon, lat, height)))
    }
}

/// Current camera pose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub position: Geodetic,
    pub orientation: Orientation,
}

/// Edge-triggered camera motion signals.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    MoveStart,
    MoveEnd,
}
