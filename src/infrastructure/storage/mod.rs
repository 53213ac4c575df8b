//! In-memory storage

mod memory;

pub use memory::InMemoryRepositoryProvider;
