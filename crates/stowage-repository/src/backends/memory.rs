//! In-memory repository.
//!
//! Used for testing and as scratch storage. All data is ephemeral and lost
//! on teardown.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use parking_lot::RwLock;
use stowage_uri::{SEPARATOR, Uri};

use crate::error::{RepositoryError, RepositoryResult};
use crate::generic::generic_child;
use crate::repository::{ListableRepository, Repository, WritableRepository};
use crate::stream::{UriReadCloser, UriWriteCloser};

type Entries = Arc<RwLock<BTreeMap<Uri, Vec<u8>>>>;

/// In-memory repository.
///
/// Scheme agnostic: one instance may be registered for any number of
/// schemes. Containers are implicit; a URI is a container when some stored
/// URI lies beneath it, and the root of every hierarchical URI exists.
///
/// Implements [`WritableRepository`] and [`ListableRepository`] but not
/// hierarchy, copy or move, so dispatch uses the generic algorithms for
/// those. [`list`](ListableRepository::list) returns children sorted by URI.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    entries: Entries,
}

impl MemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `uri`, replacing anything already there.
    pub fn insert(&self, uri: &Uri, data: &[u8]) {
        self.entries.write().insert(uri.clone(), data.to_vec());
    }

    /// A copy of the bytes stored at `uri`.
    pub fn get(&self, uri: &Uri) -> Option<Vec<u8>> {
        self.entries.read().get(uri).cloned()
    }

    /// Number of stored resources.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Prefix every descendant of `uri` starts with.
    fn descendant_prefix(uri: &Uri) -> String {
        let base = uri.as_str();
        if base.ends_with(SEPARATOR) {
            base.to_string()
        } else {
            format!("{base}{SEPARATOR}")
        }
    }

    fn is_container(entries: &BTreeMap<Uri, Vec<u8>>, uri: &Uri) -> bool {
        if uri.is_root() && uri.authority().is_some() {
            return true;
        }
        let prefix = Self::descendant_prefix(uri);
        entries.keys().any(|k| k.as_str().starts_with(&prefix))
    }
}

impl Repository for MemoryRepository {
    fn exists(&self, uri: &Uri) -> RepositoryResult<bool> {
        let entries = self.entries.read();
        Ok(entries.contains_key(uri) || Self::is_container(&entries, uri))
    }

    fn reader(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriReadCloser>> {
        let entries = self.entries.read();
        match entries.get(uri) {
            Some(data) => Ok(Box::new(MemoryReader {
                uri: uri.clone(),
                cursor: Cursor::new(data.clone()),
            })),
            None if Self::is_container(&entries, uri) => {
                Err(RepositoryError::is_a_container(uri))
            }
            None => Err(RepositoryError::not_found(uri)),
        }
    }

    fn can_read(&self, uri: &Uri) -> RepositoryResult<bool> {
        Ok(self.entries.read().contains_key(uri))
    }

    fn teardown(&self) {
        let mut entries = self.entries.write();
        tracing::debug!(count = entries.len(), "clearing memory repository");
        entries.clear();
    }

    fn as_writable(&self) -> Option<&dyn WritableRepository> {
        Some(self)
    }

    fn as_listable(&self) -> Option<&dyn ListableRepository> {
        Some(self)
    }
}

impl WritableRepository for MemoryRepository {
    fn writer(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriWriteCloser>> {
        if Self::is_container(&self.entries.read(), uri) {
            return Err(RepositoryError::is_a_container(uri));
        }
        Ok(Box::new(MemoryWriter {
            uri: uri.clone(),
            buf: Vec::new(),
            entries: Arc::clone(&self.entries),
        }))
    }

    fn can_write(&self, uri: &Uri) -> RepositoryResult<bool> {
        Ok(!Self::is_container(&self.entries.read(), uri))
    }

    fn delete(&self, uri: &Uri) -> RepositoryResult<()> {
        self.entries
            .write()
            .remove(uri)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(uri))
    }
}

impl ListableRepository for MemoryRepository {
    fn can_list(&self, uri: &Uri) -> RepositoryResult<bool> {
        Ok(Self::is_container(&self.entries.read(), uri))
    }

    fn list(&self, uri: &Uri) -> RepositoryResult<Vec<Uri>> {
        let entries = self.entries.read();
        if !Self::is_container(&entries, uri) {
            return Err(if entries.contains_key(uri) {
                RepositoryError::not_a_container(uri)
            } else {
                RepositoryError::not_found(uri)
            });
        }

        let prefix = Self::descendant_prefix(uri);
        let names: BTreeSet<&str> = entries
            .keys()
            .filter_map(|k| k.as_str().strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split(SEPARATOR).next())
            .filter(|name| !name.is_empty())
            .collect();

        names
            .into_iter()
            .map(|name| generic_child(uri, name))
            .collect()
    }
}

/// Reader over a snapshot of the stored bytes.
struct MemoryReader {
    uri: Uri,
    cursor: Cursor<Vec<u8>>,
}

impl Read for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl UriReadCloser for MemoryReader {
    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn close(self: Box<Self>) -> RepositoryResult<()> {
        Ok(())
    }
}

/// Writer that buffers until close, then replaces the stored bytes.
struct MemoryWriter {
    uri: Uri,
    buf: Vec<u8>,
    entries: Entries,
}

impl Write for MemoryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl UriWriteCloser for MemoryWriter {
    fn uri(&self) -> &Uri {
        &self.uri
    }

    fn close(self: Box<Self>) -> RepositoryResult<()> {
        let MemoryWriter { uri, buf, entries } = *self;
        entries.write().insert(uri, buf);
        Ok(())
    }

    fn abort(self: Box<Self>) -> RepositoryResult<()> {
        tracing::debug!(uri = %self.uri, bytes = self.buf.len(), "discarding aborted write");
        Ok(())
    }
}
