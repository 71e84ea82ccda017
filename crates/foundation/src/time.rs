/// Widget clock time in seconds since session start.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub fn seconds(&self) -> f64 {
        self.0
    }
}
