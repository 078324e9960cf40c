//! Scheme → repository registry.
//!
//! Routes URIs to the repository registered for their scheme. Schemes are
//! ASCII-lowercased on the way in, matching [`Uri::scheme`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use stowage_uri::Uri;

use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::Repository;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Maps schemes to repositories.
///
/// Lookups take a shared lock and registrations an exclusive one, so a lookup
/// racing a registration sees either the old or the new repository.
///
/// One instance may serve several schemes. It is torn down when the last
/// scheme referencing it is replaced or unregistered, while the write lock is
/// held and before the slot is reused. `teardown` therefore must not call
/// back into the registry.
pub struct Registry {
    repositories: RwLock<HashMap<String, Arc<dyn Repository>>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            repositories: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry. Empty until something registers.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Register `repository` for `scheme`, tearing down the previous occupant.
    ///
    /// `scheme` must be non-empty; passing an empty one is a caller bug.
    pub fn register(&self, scheme: &str, repository: Arc<dyn Repository>) {
        let scheme = scheme.to_ascii_lowercase();
        debug_assert!(!scheme.is_empty(), "repository registered for empty scheme");

        let mut repositories = self.repositories.write();
        if let Some(previous) = repositories.remove(&scheme) {
            if Arc::ptr_eq(&previous, &repository) {
                tracing::debug!(scheme = %scheme, "repository re-registered");
            } else {
                Self::release(&repositories, &scheme, previous);
            }
        }
        tracing::debug!(scheme = %scheme, "repository registered");
        repositories.insert(scheme, repository);
    }

    /// Remove the repository for `scheme`.
    ///
    /// Returns `true` if one was registered.
    pub fn unregister(&self, scheme: &str) -> bool {
        let scheme = scheme.to_ascii_lowercase();
        let mut repositories = self.repositories.write();
        match repositories.remove(&scheme) {
            Some(previous) => {
                Self::release(&repositories, &scheme, previous);
                true
            }
            None => false,
        }
    }

    /// Tear down `previous` unless another scheme still routes to it.
    fn release(
        remaining: &HashMap<String, Arc<dyn Repository>>,
        scheme: &str,
        previous: Arc<dyn Repository>,
    ) {
        let shared = remaining.values().any(|r| Arc::ptr_eq(r, &previous));
        if shared {
            tracing::debug!(scheme, "repository still serves other schemes, keeping it");
        } else {
            tracing::info!(scheme, "tearing down replaced repository");
            previous.teardown();
        }
    }

    /// The repository registered for `uri`'s scheme.
    pub fn lookup(&self, uri: &Uri) -> RepositoryResult<Arc<dyn Repository>> {
        self.lookup_scheme(uri.scheme())
    }

    /// The repository registered for `scheme`.
    pub fn lookup_scheme(&self, scheme: &str) -> RepositoryResult<Arc<dyn Repository>> {
        let scheme = scheme.to_ascii_lowercase();
        self.repositories
            .read()
            .get(&scheme)
            .cloned()
            .ok_or_else(|| RepositoryError::no_repository(scheme))
    }

    /// Whether anything is registered for `scheme`.
    pub fn is_registered(&self, scheme: &str) -> bool {
        self.repositories
            .read()
            .contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.repositories.read().keys().cloned().collect();
        schemes.sort();
        schemes
    }
}

/// Register `repository` for `scheme` in the process-wide registry.
pub fn register(scheme: &str, repository: Arc<dyn Repository>) {
    GLOBAL.register(scheme, repository);
}

/// The repository the process-wide registry routes `uri` to.
pub fn registered_repository(uri: &Uri) -> RepositoryResult<Arc<dyn Repository>> {
    GLOBAL.lookup(uri)
}
