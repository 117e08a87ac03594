mod id;
mod timestamp;

pub use id::{EntityId, EntityIdError};
pub use timestamp::{Timestamp, TimestampError};
