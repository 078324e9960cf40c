//! Byte streams returned by repositories.
//!
//! `close` and `abort` take `Box<Self>`, so a stream is finished at most once
//! and is unusable afterwards. Implementations must also release what they hold in
//! `Drop`; a stream dropped without `close` (an early return, a panic) must
//! not leak descriptors, though it may discard uncommitted data.

use std::io::{Read, Write};

use stowage_uri::Uri;

use crate::error::RepositoryResult;

/// A readable byte source bound to a URI.
pub trait UriReadCloser: Read + Send {
    /// The URI this stream reads from.
    fn uri(&self) -> &Uri;

    /// Close the stream, reporting any error from releasing it.
    fn close(self: Box<Self>) -> RepositoryResult<()>;
}

/// A writable byte sink bound to a URI.
///
/// Written data is only guaranteed to be visible at the URI once `close`
/// returns `Ok`.
pub trait UriWriteCloser: Write + Send {
    /// The URI this stream writes to.
    fn uri(&self) -> &Uri;

    /// Flush and close the stream, committing the written data.
    fn close(self: Box<Self>) -> RepositoryResult<()>;

    /// Release the stream without committing anything written so far.
    ///
    /// The default drops the stream. Backends that write through to the
    /// destination should override this to remove the partial resource.
    fn abort(self: Box<Self>) -> RepositoryResult<()> {
        drop(self);
        Ok(())
    }
}
