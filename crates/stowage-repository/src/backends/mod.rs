//! Repository backends.
//!
//! Backends implement [`Repository`](crate::Repository) and any optional
//! capability traits for a storage type.

mod memory;

pub use memory::MemoryRepository;
