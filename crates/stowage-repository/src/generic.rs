//! Scheme-agnostic fallbacks for the optional capabilities.
//!
//! Everything here is built from the minimal [`Repository`] contract plus
//! [`WritableRepository`] where bytes must land somewhere, so it works across
//! any pair of repositories, including mixed-scheme copies and moves.

use std::io::{self, Read, Write};

use stowage_uri::{SEPARATOR, Uri};

use crate::config::DEFAULT_COPY_BUFFER_SIZE;
use crate::error::{RepositoryError, RepositoryResult};
use crate::registry::Registry;
use crate::repository::{Repository, WritableRepository};

/// Characters a child name may not contain.
const NAME_SEPARATORS: [char; 2] = [SEPARATOR, '\\'];

/// Options for [`generic_copy_with`] and [`generic_move_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Size of the transfer buffer in bytes.
    pub buffer_size: usize,
    /// Replace an existing destination instead of failing.
    pub overwrite: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            overwrite: false,
        }
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Parent of `uri` per RFC3986 path rules.
///
/// Strips one trailing separator, then the last segment and the separator
/// before it. The parent of `/a` is `/`. Roots have no parent.
pub fn generic_parent(uri: &Uri) -> RepositoryResult<Uri> {
    let path = uri.path();
    let path = if path.len() > 1 {
        path.strip_suffix(SEPARATOR).unwrap_or(path)
    } else {
        path
    };

    if path.is_empty() || path == "/" {
        return Err(RepositoryError::invalid_uri(format!("{uri} is a root")));
    }

    let parent_path = match path.rfind(SEPARATOR) {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => return Err(RepositoryError::invalid_uri(format!("{uri} is a root"))),
    };

    Ok(Uri::parse(format!("{}{}", uri.prefix(), parent_path))?)
}

/// `uri` extended by the single segment `name`.
pub fn generic_child(uri: &Uri, name: &str) -> RepositoryResult<Uri> {
    if name.is_empty() {
        return Err(RepositoryError::invalid_uri(format!(
            "empty child name under {uri}"
        )));
    }
    if name.contains(NAME_SEPARATORS) {
        return Err(RepositoryError::invalid_uri(format!(
            "child name '{name}' contains a path separator"
        )));
    }

    let base = uri.as_str();
    let child = if uri.path().is_empty() {
        // `mem://` + `a` must not turn `a` into an authority.
        format!("{base}{SEPARATOR}{name}")
    } else if base.ends_with(SEPARATOR) {
        format!("{base}{name}")
    } else {
        format!("{base}{SEPARATOR}{name}")
    };

    Ok(Uri::parse(child)?)
}

// ============================================================================
// Copy / move
// ============================================================================

/// Copy `source` to `destination`, failing if the destination exists.
pub fn generic_copy(registry: &Registry, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
    generic_copy_with(registry, source, destination, CopyOptions::default())
}

/// Copy `source` to `destination`.
///
/// Delegates to the source repository when it is copyable and both URIs
/// share its scheme. Otherwise streams the bytes from a reader on `source`
/// into a writer on `destination`. Both streams are released on every path;
/// after a failed transfer the writer is aborted, so the destination is left
/// as it was.
pub fn generic_copy_with(
    registry: &Registry,
    source: &Uri,
    destination: &Uri,
    options: CopyOptions,
) -> RepositoryResult<()> {
    let source_repo = registry.lookup(source)?;
    if source.scheme() == destination.scheme()
        && let Some(copyable) = source_repo.as_copyable()
    {
        tracing::debug!(%source, %destination, "native copy");
        return copyable.copy(source, destination);
    }

    let destination_repo = registry.lookup(destination)?;
    if !options.overwrite && destination_repo.exists(destination)? {
        return Err(RepositoryError::already_exists(destination));
    }
    let writable = destination_repo
        .as_writable()
        .ok_or_else(|| RepositoryError::not_supported("write", destination))?;

    stream_copy(source_repo.as_ref(), source, writable, destination, options.buffer_size)
}

fn stream_copy(
    source_repo: &dyn Repository,
    source: &Uri,
    destination_repo: &dyn WritableRepository,
    destination: &Uri,
    buffer_size: usize,
) -> RepositoryResult<()> {
    let mut reader = source_repo
        .reader(source)
        .map_err(|e| RepositoryError::OpenReader {
            uri: source.to_string(),
            source: Box::new(e),
        })?;

    let mut writer = match destination_repo.writer(destination) {
        Ok(writer) => writer,
        Err(e) => {
            if let Err(close_err) = reader.close() {
                tracing::warn!(%source, "closing reader after failed open: {close_err}");
            }
            return Err(RepositoryError::OpenWriter {
                uri: destination.to_string(),
                source: Box::new(e),
            });
        }
    };

    let transferred = pump(&mut reader, &mut writer, buffer_size);
    let read_closed = reader.close();

    match transferred {
        Ok(bytes) => {
            writer.close().and(read_closed)?;
            tracing::debug!(%source, %destination, bytes, "streamed copy");
            Ok(())
        }
        Err(e) => {
            // Nothing partial may land at the destination.
            let write_aborted = writer.abort();
            for released in [read_closed, write_aborted] {
                if let Err(release_err) = released {
                    tracing::warn!(
                        %source,
                        %destination,
                        "releasing stream after failed transfer: {release_err}"
                    );
                }
            }
            Err(RepositoryError::Transfer {
                source_uri: source.to_string(),
                destination: destination.to_string(),
                source: e,
            })
        }
    }
}

/// Move every byte from `reader` to `writer`.
fn pump(reader: &mut dyn Read, writer: &mut dyn Write, buffer_size: usize) -> io::Result<u64> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

/// Move `source` to `destination`, failing if the destination exists.
pub fn generic_move(registry: &Registry, source: &Uri, destination: &Uri) -> RepositoryResult<()> {
    generic_move_with(registry, source, destination, CopyOptions::default())
}

/// Move `source` to `destination`.
///
/// Delegates to the source repository when it is movable and both URIs share
/// its scheme. Otherwise copies, then deletes the source. The outcomes are
/// distinguishable:
///
/// - `Ok(())`: moved
/// - any error other than `PartialFailure`: nothing changed
/// - `PartialFailure`: the copy landed but the source is still there
pub fn generic_move_with(
    registry: &Registry,
    source: &Uri,
    destination: &Uri,
    options: CopyOptions,
) -> RepositoryResult<()> {
    let source_repo = registry.lookup(source)?;
    if source.scheme() == destination.scheme()
        && let Some(movable) = source_repo.as_movable()
    {
        tracing::debug!(%source, %destination, "native move");
        return movable.move_to(source, destination);
    }

    // Checked before copying so an undeletable source never leaves a duplicate.
    let deletable = source_repo
        .as_writable()
        .ok_or_else(|| RepositoryError::not_supported("delete", source))?;

    generic_copy_with(registry, source, destination, options)?;

    deletable.delete(source).map_err(|e| {
        tracing::warn!(%source, %destination, "move copied but source delete failed: {e}");
        RepositoryError::PartialFailure {
            source_uri: source.to_string(),
            destination: destination.to_string(),
            source: Box::new(e),
        }
    })
}
