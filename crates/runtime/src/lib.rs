pub mod event_bus;
pub mod frame;
pub mod operation;
pub mod scheduler;
pub mod work_queue;

pub use event_bus::*;
pub use frame::*;
pub use operation::*;
pub use scheduler::*;
pub use work_queue::*;
