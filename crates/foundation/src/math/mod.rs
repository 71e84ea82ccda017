pub mod ecef;
pub mod geodesy;
pub mod precision;

pub use ecef::*;
pub use geodesy::*;
pub use precision::*;
