pub mod components;
pub mod entity;
pub mod picking;
pub mod renderer;
pub mod spatial;
pub mod world;

pub use renderer::*;
pub use world::*;
