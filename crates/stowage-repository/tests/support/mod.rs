//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stowage_repository::{
    CopyableRepository, ListableRepository, MemoryRepository, MovableRepository, Repository,
    RepositoryError, RepositoryResult, Uri, UriReadCloser, UriWriteCloser, WritableRepository,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn uri(s: &str) -> Uri {
    Uri::parse(s).unwrap()
}

pub fn read_string(repo: &dyn Repository, u: &Uri) -> String {
    let mut reader = repo.reader(u).unwrap();
    let mut out = String::new();
    reader.read_to_string(&mut out).unwrap();
    reader.close().unwrap();
    out
}

/// Counters shared between a [`Tracked`] repository and its streams.
#[derive(Debug, Default)]
pub struct Counters {
    pub readers_opened: AtomicUsize,
    pub readers_closed: AtomicUsize,
    pub writers_opened: AtomicUsize,
    pub writers_closed: AtomicUsize,
    pub writers_aborted: AtomicUsize,
    pub native_copies: AtomicUsize,
    pub native_moves: AtomicUsize,
    pub teardowns: AtomicUsize,
}

/// Current value of one of the [`Counters`].
pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// A memory repository with fault injection and stream accounting.
#[derive(Default)]
pub struct Tracked {
    pub inner: MemoryRepository,
    pub counters: Arc<Counters>,
    /// `delete` always fails with permission denied.
    pub fail_delete: bool,
    /// Reads fail once this many bytes have been returned.
    pub fail_read_after: Option<usize>,
    /// Writes fail once this many bytes have been accepted.
    pub fail_write_after: Option<usize>,
    /// Opening a writer fails.
    pub fail_open_writer: bool,
    /// Advertise native copy and move.
    pub native: bool,
}

impl Tracked {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    pub fn failing_read_after(bytes: usize) -> Self {
        Self {
            fail_read_after: Some(bytes),
            ..Self::default()
        }
    }

    pub fn native() -> Self {
        Self {
            native: true,
            ..Self::default()
        }
    }
}

impl Repository for Tracked {
    fn exists(&self, uri: &Uri) -> RepositoryResult<bool> {
        self.inner.exists(uri)
    }

    fn reader(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriReadCloser>> {
        let inner = self.inner.reader(uri)?;
        self.counters.readers_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedReader {
            inner,
            counters: Arc::clone(&self.counters),
            remaining: self.fail_read_after,
        }))
    }

    fn can_read(&self, uri: &Uri) -> RepositoryResult<bool> {
        self.inner.can_read(uri)
    }

    fn teardown(&self) {
        self.counters.teardowns.fetch_add(1, Ordering::SeqCst);
        self.inner.teardown();
    }

    fn as_writable(&self) -> Option<&dyn WritableRepository> {
        Some(self)
    }

    fn as_listable(&self) -> Option<&dyn ListableRepository> {
        Some(self)
    }

    fn as_copyable(&self) -> Option<&dyn CopyableRepository> {
        if self.native { Some(self) } else { None }
    }

    fn as_movable(&self) -> Option<&dyn MovableRepository> {
        if self.native { Some(self) } else { None }
    }
}

impl WritableRepository for Tracked {
    fn writer(&self, uri: &Uri) -> RepositoryResult<Box<dyn UriWriteCloser>> {
        if self.fail_open_writer {
            return Err(RepositoryError::permission_denied(uri));
        }
        let inner = self.inner.writer(uri)?;
        self.counters.writers_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedWriter {
            inner,
            counters: Arc::clone(&self.counters),
            remaining: self.fail_write_after,
        }))
    }

    fn can_write(&self, uri: &Uri) -> RepositoryResult<bool> {
        Ok(!self.fail_open_writer && self.inner.can_write(uri)?)
    }

    fn delete(&self, uri: &Uri) -> RepositoryResult<()> {
        if self.fail_delete {
            return Err(RepositoryError::permission_denied(uri));
        }
        self.inner.delete(uri)
    }
}

impl ListableRepository for Tracked {
    fn can_list(&self, uri: &Uri) -> RepositoryResult<bool> {
        self.inner.can_list(uri)
    }

    fn list(&self, uri: &Uri) -> RepositoryResult<Vec<Uri>> {
        self.inner.list(uri)
    }
}

impl CopyableRepository for Tracked {
    fn copy(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
        self.counters.native_copies.fetch_add(1, Ordering::SeqCst);
        let data = self
            .inner
            .get(source)
            .ok_or_else(|| RepositoryError::not_found(source))?;
        self.inner.insert(destination, &data);
        Ok(())
    }
}

impl MovableRepository for Tracked {
    fn move_to(&self, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
        self.counters.native_moves.fetch_add(1, Ordering::SeqCst);
        let data = self
            .inner
            .get(source)
            .ok_or_else(|| RepositoryError::not_found(source))?;
        self.inner.insert(destination, &data);
        self.inner.delete(source)
    }
}

struct TrackedReader {
    inner: Box<dyn UriReadCloser>,
    counters: Arc<Counters>,
    remaining: Option<usize>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.remaining {
            None => self.inner.read(buf),
            Some(0) => Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
            Some(remaining) => {
                let limit = remaining.min(buf.len());
                let n = self.inner.read(&mut buf[..limit])?;
                self.remaining = Some(remaining - n);
                Ok(n)
            }
        }
    }
}

impl UriReadCloser for TrackedReader {
    fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    fn close(self: Box<Self>) -> RepositoryResult<()> {
        self.counters.readers_closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
    }
}

struct TrackedWriter {
    inner: Box<dyn UriWriteCloser>,
    counters: Arc<Counters>,
    remaining: Option<usize>,
}

impl Write for TrackedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining < data.len() {
                return Err(io::Error::other("disk full"));
            }
            *remaining -= data.len();
        }
        self.inner.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl UriWriteCloser for TrackedWriter {
    fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    fn close(self: Box<Self>) -> RepositoryResult<()> {
        self.counters.writers_closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
    }

    fn abort(self: Box<Self>) -> RepositoryResult<()> {
        self.counters.writers_aborted.fetch_add(1, Ordering::SeqCst);
        self.inner.abort()
    }
}
