pub mod camera;
pub mod color;
pub mod drawable;
pub mod providers;

pub use camera::*;
pub use color::*;
pub use drawable::*;
pub use providers::*;
