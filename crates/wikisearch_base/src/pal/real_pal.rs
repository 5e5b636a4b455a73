use std::fs;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::{WikiSearchError, WikiSearchResult};

use super::FilePath;
use super::traits::{Pal, ReadSeek};

/* 📖 # Why blocking std::fs and not an async file API?

Every connection already has its own thread, and the accept loop runs on another
one. When `File::open` or a `read` stalls on a slow disk, the only thing waiting
is the client whose file it is; nobody else is queued behind that thread.

`read_file` hands back the `std::fs::File` itself. It is `Read + Seek + Send`, so
the response body copies it straight to the socket with `io::copy` and large
files never sit in memory. An async runtime would only move the same blocking
call onto a pool thread, which is what thread-per-connection gives us already.
*/

/// Concrete PAL implementation using the real filesystem via std::fs.
///
/// All file paths are resolved relative to a configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve a FilePath to a filesystem path under the base directory.
    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        path.as_relative().to_path(&self.base_dir)
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> WikiSearchResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn is_directory(&self, path: &FilePath) -> WikiSearchResult<bool> {
        let resolved = self.resolve_path(path);
        let is_dir = resolved.is_dir();
        debug!(is_dir, resolved = %resolved.display(), "checked for directory");
        Ok(is_dir)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> WikiSearchResult<Box<dyn ReadSeek + 'static>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "opening file for reading");
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(WikiSearchError::file(resolved, e))
        })?;
        debug!("file opened successfully");
        Ok(Box::new(file))
    }
}
