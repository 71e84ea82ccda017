pub mod command;
pub mod error;
pub mod executor;
pub mod operations;

pub use command::*;
pub use error::*;
pub use executor::*;
