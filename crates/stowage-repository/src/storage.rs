//! Dispatch layer.
//!
//! [`Storage`] resolves a URI's repository through an injected [`Registry`],
//! checks for the optional capability an operation needs, and either calls it
//! or falls back to [`crate::generic`]. Operations without a fallback (write,
//! delete, list) fail with `NotSupported`.

use std::sync::Arc;

use stowage_uri::Uri;

use crate::config::StorageConfig;
use crate::error::{RepositoryError, RepositoryResult};
use crate::generic::{self, CopyOptions};
use crate::registry::Registry;
use crate::repository::Capabilities;
use crate::stream::{UriReadCloser, UriWriteCloser};

/// URI operations over every registered repository.
#[derive(Debug, Clone)]
pub struct Storage {
    registry: Arc<Registry>,
    config: StorageConfig,
}

impl Storage {
    /// Dispatch through `registry` with the default configuration.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, StorageConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: StorageConfig) -> Self {
        Self { registry, config }
    }

    /// Dispatch through the process-wide registry.
    pub fn global() -> Self {
        Self::new(Registry::global())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn copy_options(&self, overwrite: bool) -> CopyOptions {
        CopyOptions {
            buffer_size: self.config.copy_buffer_size,
            overwrite,
        }
    }

    // ========================================================================
    // Minimal contract
    // ========================================================================

    #[tracing::instrument(skip(self), name = "storage.exists")]
    pub fn exists(&self, uri: &Uri) -> RepositoryResult<bool> {
        self.registry.lookup(uri)?.exists(uri)
    }

    #[tracing::instrument(skip(self), name = "storage.reader")]
    pub fn reader(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriReadCloser>> {
        self.registry.lookup(uri)?.reader(uri)
    }

    #[tracing::instrument(skip(self), name = "storage.can_read")]
    pub fn can_read(&self, uri: &Uri) -> RepositoryResult<bool> {
        self.registry.lookup(uri)?.can_read(uri)
    }

    /// Which optional contracts the repository for `uri` implements.
    pub fn capabilities(&self, uri: &Uri) -> RepositoryResult<Capabilities> {
        let repo = self.registry.lookup(uri)?;
        Ok(Capabilities::of(repo.as_ref()))
    }

    // ========================================================================
    // Writable
    // ========================================================================

    #[tracing::instrument(skip(self), name = "storage.writer")]
    pub fn writer(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriWriteCloser>> {
        let repo = self.registry.lookup(uri)?;
        repo.as_writable()
            .ok_or_else(|| RepositoryError::not_supported("write", uri))?
            .writer(uri)
    }

    /// `Ok(false)` when the repository cannot write at all.
    #[tracing::instrument(skip(self), name = "storage.can_write")]
    pub fn can_write(&self, uri: &Uri) -> RepositoryResult<bool> {
        let repo = self.registry.lookup(uri)?;
        match repo.as_writable() {
            Some(writable) => writable.can_write(uri),
            None => Ok(false),
        }
    }

    #[tracing::instrument(skip(self), name = "storage.delete")]
    pub fn delete(&self, uri: &Uri) -> RepositoryResult<()> {
        let repo = self.registry.lookup(uri)?;
        repo.as_writable()
            .ok_or_else(|| RepositoryError::not_supported("delete", uri))?
            .delete(uri)
    }

    // ========================================================================
    // Listable
    // ========================================================================

    /// `Ok(false)` when the repository cannot list at all.
    #[tracing::instrument(skip(self), name = "storage.can_list")]
    pub fn can_list(&self, uri: &Uri) -> RepositoryResult<bool> {
        let repo = self.registry.lookup(uri)?;
        match repo.as_listable() {
            Some(listable) => listable.can_list(uri),
            None => Ok(false),
        }
    }

    #[tracing::instrument(skip(self), name = "storage.list")]
    pub fn list(&self, uri: &Uri) -> RepositoryResult<Vec<Uri>> {
        let repo = self.registry.lookup(uri)?;
        repo.as_listable()
            .ok_or_else(|| RepositoryError::not_supported("list", uri))?
            .list(uri)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    #[tracing::instrument(skip(self), name = "storage.parent")]
    pub fn parent(&self, uri: &Uri) -> RepositoryResult<Uri> {
        let repo = self.registry.lookup(uri)?;
        match repo.as_hierarchical() {
            Some(hierarchical) => hierarchical.parent(uri),
            None => generic::generic_parent(uri),
        }
    }

    #[tracing::instrument(skip(self), name = "storage.child")]
    pub fn child(&self, uri: &Uri, segment: &str) -> RepositoryResult<Uri> {
        let repo = self.registry.lookup(uri)?;
        match repo.as_hierarchical() {
            Some(hierarchical) => hierarchical.child(uri, segment),
            None => generic::generic_child(uri, segment),
        }
    }

    // ========================================================================
    // Copy / move
    // ========================================================================

    /// Copy `source` to `destination`; an existing destination is an error.
    #[tracing::instrument(skip(self), name = "storage.copy")]
    pub fn copy(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
        generic::generic_copy_with(&self.registry, source, destination, self.copy_options(false))
    }

    /// Copy `source` to `destination`, replacing an existing destination.
    ///
    /// A native same-scheme copy decides for itself how to treat an existing
    /// destination.
    #[tracing::instrument(skip(self), name = "storage.copy_overwrite")]
    pub fn copy_overwrite(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
        generic::generic_copy_with(&self.registry, source, destination, self.copy_options(true))
    }

    /// Move `source` to `destination`. See [`generic::generic_move_with`] for
    /// how partial failures are reported.
    #[tracing::instrument(skip(self), name = "storage.move")]
    pub fn move_to(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
        generic::generic_move_with(&self.registry, source, destination, self.copy_options(false))
    }
}
