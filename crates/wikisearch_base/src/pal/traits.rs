use std::io::{Read, Seek};
use std::sync::Arc;

use crate::WikiSearchResult;

use super::file_path::FilePath;

/// Trait combining Read + Seek for file operations.
///
/// `Send` is required because opened files are handed to the response body and
/// streamed from the connection's own thread.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/* 📖 # Why is Pal a trait instead of a struct?

Using a trait enables two key benefits:
1. **Testability**: MockPal implements Pal for fast, deterministic tests without filesystem side effects
2. **Flexibility**: Code depends on the abstraction, not the concrete implementation

The connection handler only ever reads: it checks whether a path is a directory,
opens files and streams them. Nothing in the server writes to the document root.
*/

/// Platform Abstraction Layer (PAL) trait providing read-only filesystem operations.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs`
/// - `MockPal`: In-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file or directory exists at the given path.
    fn file_exists(&self, path: &FilePath) -> WikiSearchResult<bool>;

    /// Check if the given path names a directory.
    fn is_directory(&self, path: &FilePath) -> WikiSearchResult<bool>;

    /// Open a file for reading.
    ///
    /// A missing file is reported as an `ErrorKind::FileError` whose source has
    /// `std::io::ErrorKind::NotFound`.
    fn read_file(&self, path: &FilePath) -> WikiSearchResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> WikiSearchResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Box::new(crate::WikiSearchError::file(path.as_path(), e)))?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

Every connection thread needs the filesystem. Arc makes the handle cheap to clone
into each thread, and the `Send + Sync` bounds on Pal make that sharing safe.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use wikisearch_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new("/srv/www".into()));
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::mock::MockPal;

    #[test]
    fn test_pal_handle_clone_shares_state() {
        let mock = MockPal::new();
        let pal = PalHandle::new(mock.clone());
        let pal_clone = pal.clone();

        mock.add_file(FilePath::from("late.html"), b"x".to_vec());
        assert!(pal_clone.file_exists(&FilePath::from("late.html")).unwrap());
    }
}
