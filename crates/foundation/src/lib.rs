pub mod arena;
pub mod bounds;
pub mod handles;
pub mod ids;
pub mod math;
pub mod time;

// Dependency-free primitives shared by every crate.
pub use arena::*;
pub use bounds::*;
pub use handles::*;
pub use ids::*;
pub use time::*;
