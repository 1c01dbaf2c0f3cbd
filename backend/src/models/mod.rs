//! Domain models for the buffer simulator

pub mod event;
pub mod line;
pub mod state;
pub mod vehicle;

// Re-exports
pub use event::{Event, EventLog};
pub use line::{BufferLine, LineRole};
pub use state::{BufferLineSet, LineSetError};
pub use vehicle::{Vehicle, VehicleError, VehicleId, VehicleKind};
