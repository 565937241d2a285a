//! Ports (trait boundaries) for external collaborators.
//!
//! These traits are owned by the simulation core and implemented by
//! adapters (persistence) or pipeline observers (presentation, export).

pub mod observer;
pub mod repository;

pub use observer::Observer;
pub use repository::ValueRepository;
