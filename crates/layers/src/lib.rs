pub mod adapter;
pub mod error;
pub mod feature;
pub mod layer;
pub mod poi;
pub mod raster;
pub mod registry;
pub mod symbology;
pub mod terrain;

pub use error::*;
pub use poi::*;
pub use registry::*;
