//! Numbers core: pure merge state shared by the engine and the service.
mod accumulator;
mod payload;

pub use accumulator::NumberSet;
pub use payload::NumbersPayload;
