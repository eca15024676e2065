//! Storage backends for the payment engine.
//!
//! There is exactly one backend, an in-memory store. State is process-local and does not survive
//! a restart; the server crate runs a reaper task to bound its growth.
pub mod in_memory;

pub use in_memory::InMemoryStore;
