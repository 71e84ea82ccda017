pub mod config;
pub mod endpoints;
pub mod error;
pub mod outputs;
pub mod reporter;
pub mod session;

pub use config::*;
pub use error::*;
pub use outputs::*;
pub use session::*;
