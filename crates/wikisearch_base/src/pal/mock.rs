use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::Mutex;

use crate::WikiSearchError;
use crate::WikiSearchResult;

use super::FilePath;
use super::traits::{Pal, ReadSeek};

/* 📖 # Why use HashMap for MockPal storage?

MockPal uses in-memory storage with Arc<Mutex<T>> for several reasons:
1. **Speed**: No filesystem I/O, deterministic and fast for unit tests
2. **Isolation**: No side effects on the real filesystem
3. **Thread-safe**: The handler tests drive many connections concurrently

Directories are either registered explicitly or implied by the files below them.
*/

/// In-memory PAL implementation for testing.
///
/// # Examples
///
/// ```
/// use wikisearch_base::{pal::MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("reports/index.html"), b"<h1>Reports</h1>".to_vec());
/// assert!(mock.is_directory(&FilePath::from("reports")).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    directories: Arc<Mutex<HashSet<FilePath>>>,
    accessed: Arc<Mutex<Vec<FilePath>>>,
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.files.lock().unwrap().insert(path, content);
    }

    /// Add an (empty) directory to the mock storage.
    pub fn add_directory(&self, path: FilePath) {
        self.directories.lock().unwrap().insert(path);
    }

    /// Every path a Pal operation was asked about, in call order.
    pub fn accessed_paths(&self) -> Vec<FilePath> {
        self.accessed.lock().unwrap().clone()
    }

    fn record_access(&self, path: &FilePath) {
        self.accessed.lock().unwrap().push(path.clone());
    }

    fn has_files_below(&self, path: &FilePath) -> bool {
        let prefix = format!("{}/", path.as_str().trim_end_matches('/'));
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|file| file.as_str().starts_with(&prefix))
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> WikiSearchResult<bool> {
        self.record_access(path);
        let is_file = self.files.lock().unwrap().contains_key(path);
        Ok(is_file || self.is_directory(path)?)
    }

    fn is_directory(&self, path: &FilePath) -> WikiSearchResult<bool> {
        self.record_access(path);
        let registered = self.directories.lock().unwrap().contains(path);
        if path.is_root() || registered {
            return Ok(true);
        }
        Ok(self.has_files_below(path))
    }

    fn read_file(&self, path: &FilePath) -> WikiSearchResult<Box<dyn ReadSeek + 'static>> {
        self.record_access(path);
        let files = self.files.lock().unwrap();
        let content = files
            .get(path)
            .ok_or_else(|| {
                Box::new(WikiSearchError::file(
                    path.as_path(),
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("File not found: {}", path),
                    ),
                ))
            })?
            .clone();
        Ok(Box::new(Cursor::new(content)))
    }
}
