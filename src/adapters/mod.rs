//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits defined in the ports
//! module. Adapters depend on ports, not the other way around.

pub mod csv_repository;
pub mod in_memory_repository;
pub mod msgpack_repository;

pub use csv_repository::CsvRepository;
pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
