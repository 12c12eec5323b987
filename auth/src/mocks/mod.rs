//! In-memory implementations for tests.

pub mod storage;

pub use storage::MemoryTokenStorage;
