//! Repository capability traits.
//!
//! [`Repository`] is the minimal contract every registered backend meets.
//! The optional contracts ([`WritableRepository`], [`ListableRepository`],
//! [`HierarchicalRepository`], [`CopyableRepository`],
//! [`MovableRepository`]) extend it. Callers holding a `dyn Repository`
//! discover them at call time through the `as_*` queries:
//!
//! ```ignore
//! impl WritableRepository for MyRepo { ... }
//!
//! impl Repository for MyRepo {
//!     // ...
//!     fn as_writable(&self) -> Option<&dyn WritableRepository> {
//!         Some(self)
//!     }
//! }
//! ```
//!
//! A backend that leaves a query at its default `None` is treated as lacking
//! the capability, and dispatch falls back to the generic algorithms in
//! [`crate::generic`] where one exists.

use serde::{Deserialize, Serialize};
use stowage_uri::Uri;

use crate::error::RepositoryResult;
use crate::stream::{UriReadCloser, UriWriteCloser};

/// Minimal repository contract.
///
/// Registered for one or more schemes via [`crate::Registry::register`].
pub trait Repository: Send + Sync {
    // ========================================================================
    // Required
    // ========================================================================

    /// Whether a resource is addressable at `uri`.
    ///
    /// Absence is `Ok(false)`; errors are for access or transport failures.
    fn exists(&self, uri: &Uri) -> RepositoryResult<bool>;

    /// Open a byte stream for reading.
    fn reader(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriReadCloser>>;

    /// Cheap probe for readability, without opening the resource.
    fn can_read(&self, uri: &Uri) -> RepositoryResult<bool>;

    /// Release held resources.
    ///
    /// Called once when the repository is replaced or unregistered. Must be
    /// safe when nothing is held.
    fn teardown(&self);

    // ========================================================================
    // Capability queries
    // ========================================================================

    fn as_writable(&self) -> Option<&dyn WritableRepository> {
        None
    }

    fn as_listable(&self) -> Option<&dyn ListableRepository> {
        None
    }

    fn as_hierarchical(&self) -> Option<&dyn HierarchicalRepository> {
        None
    }

    fn as_copyable(&self) -> Option<&dyn CopyableRepository> {
        None
    }

    fn as_movable(&self) -> Option<&dyn MovableRepository> {
        None
    }
}

/// A repository that can write and delete resources.
pub trait WritableRepository: Repository {
    /// Open a byte stream for writing, creating or truncating the resource.
    fn writer(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriWriteCloser>>;

    /// Cheap probe for writability.
    fn can_write(&self, uri: &Uri) -> RepositoryResult<bool>;

    /// Delete the resource at `uri`.
    fn delete(&self, uri: &Uri) -> RepositoryResult<()>;
}

/// A repository that can enumerate the children of container-like URIs.
pub trait ListableRepository: Repository {
    /// Whether `uri` can be listed.
    fn can_list(&self, uri: &Uri) -> RepositoryResult<bool>;

    /// Children of `uri`. Order is defined by the implementation.
    fn list(&self, uri: &Uri) -> RepositoryResult<Vec<Uri>>;
}

/// A repository with its own notion of parent and child.
///
/// Repositories without this fall back to
/// [`generic_parent`](crate::generic::generic_parent) and
/// [`generic_child`](crate::generic::generic_child).
pub trait HierarchicalRepository: Repository {
    fn parent(&self, uri: &Uri) -> RepositoryResult<Uri>;

    fn child(&self, uri: &Uri, name: &str) -> RepositoryResult<Uri>;
}

/// A repository that copies natively.
///
/// Only consulted when source and destination share a scheme; otherwise
/// [`generic_copy`](crate::generic::generic_copy) streams the bytes.
pub trait CopyableRepository: Repository {
    fn copy(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()>;
}

/// A repository that moves natively.
///
/// Only consulted when source and destination share a scheme.
pub trait MovableRepository: Repository {
    fn move_to(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()>;
}

/// Which optional contracts a repository implements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub writable: bool,
    pub listable: bool,
    pub hierarchical: bool,
    pub copyable: bool,
    pub movable: bool,
}

impl Capabilities {
    /// Query every capability of `repo`.
    pub fn of(repo: &dyn Repository) -> Self {
        Self {
            writable: repo.as_writable().is_some(),
            listable: repo.as_listable().is_some(),
            hierarchical: repo.as_hierarchical().is_some(),
            copyable: repo.as_copyable().is_some(),
            movable: repo.as_movable().is_some(),
        }
    }
}
