//! In-memory reference collaborators for entitydb
//!
//! The production document store and event dispatcher are external
//! systems; this crate provides in-memory stand-ins implementing the same
//! traits, used by tests and embedders that need no persistence.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod memory;

pub use bus::RecordingEventBus;
pub use memory::{MemoryCollection, MemoryStore};
