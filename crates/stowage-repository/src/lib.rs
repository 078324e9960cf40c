//! # stowage-repository
//!
//! Scheme-keyed repositories for URI storage.
//!
//! A [`Repository`] handles every URI of the schemes it is registered for.
//! Key components:
//!
//! - [`Repository`] - Minimal contract: exists, read, can-read, teardown
//! - [`WritableRepository`], [`ListableRepository`],
//!   [`HierarchicalRepository`], [`CopyableRepository`],
//!   [`MovableRepository`] - Optional capabilities, queried at call time
//! - [`Registry`] - Routes a URI to the repository for its scheme
//! - [`generic`] - Fallbacks built on the minimal contract: RFC3986
//!   parent/child, copy by streaming, move by copy-then-delete
//! - [`Storage`] - Dispatch: resolve, check capability, call or fall back
//! - [`MemoryRepository`] - In-memory backend (scratch, testing)
//!
//! ## Design Decisions
//!
//! - **Synchronous**: every operation runs on the caller's thread. The
//!   registry table is the only shared mutable state.
//! - **Capability queries, not downcasts**: `as_writable()` and friends
//!   default to `None`; a backend opts in by returning `Some(self)`.
//! - **Copies never overwrite by default**: replacing a destination goes
//!   through [`Storage::copy_overwrite`].
//! - **No retries**: backend errors are wrapped and returned as-is.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use stowage_repository::{MemoryRepository, Registry, Storage};
//! use stowage_uri::Uri;
//!
//! let registry = Arc::new(Registry::new());
//! let scratch = Arc::new(MemoryRepository::new());
//! registry.register("mem", scratch.clone());
//!
//! let src = Uri::parse("mem:///a.txt").unwrap();
//! scratch.insert(&src, b"hello");
//!
//! let storage = Storage::new(registry);
//! let dst = storage.child(&storage.parent(&src).unwrap(), "b.txt").unwrap();
//! storage.copy(&src, &dst).unwrap();
//! assert_eq!(scratch.get(&dst).unwrap(), b"hello");
//! ```

pub mod backends;
pub mod config;
mod error;
pub mod generic;
mod registry;
mod repository;
mod storage;
mod stream;

pub use backends::MemoryRepository;
pub use config::{ConfigError, StorageConfig};
pub use error::{ErrorKind, RepositoryError, RepositoryResult};
pub use generic::{
    CopyOptions, generic_child, generic_copy, generic_copy_with, generic_move, generic_move_with,
    generic_parent,
};
pub use registry::{Registry, register, registered_repository};
pub use repository::{
    Capabilities, CopyableRepository, HierarchicalRepository, ListableRepository,
    MovableRepository, Repository, WritableRepository,
};
pub use storage::Storage;
pub use stowage_uri::{Uri, UriError};
pub use stream::{UriReadCloser, UriWriteCloser};
