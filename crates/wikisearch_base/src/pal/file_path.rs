use relative_path::{RelativePath, RelativePathBuf};
use std::path::Path;

/* 📖 # Why use RelativePathBuf for FilePath?

FilePath wraps RelativePathBuf so every path handed to the PAL is relative to the
PAL's base directory (the document root), never an absolute system path. Request
paths are sanitized before they become a FilePath, and RelativePathBuf keeps the
"relative to the root" intent visible in the type.
*/

/// Type-safe wrapper for file paths relative to the PAL base directory.
///
/// # Examples
///
/// ```
/// use wikisearch_base::FilePath;
///
/// use std::path::Path;
///
/// let page = FilePath::from("reports/index.html");
/// assert_eq!(page.as_path(), Path::new("reports/index.html"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// Returns the underlying RelativePathBuf as a reference.
    pub fn as_relative(&self) -> &RelativePath {
        &self.0
    }

    /// Returns the path as a string slice using `/` separators.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Converts to a regular Path for use with std::fs operations.
    /// This returns the relative path portion without a base directory.
    pub fn as_path(&self) -> &Path {
        Path::new(self.as_relative().as_str())
    }

    /// True if this path names the document root itself.
    pub fn is_root(&self) -> bool {
        self.0.as_str().is_empty() || self.0.as_str() == "."
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<RelativePathBuf> for FilePath {
    fn from(p: RelativePathBuf) -> Self {
        Self(p)
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(RelativePathBuf::from(p.to_string_lossy().into_owned()))
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<RelativePath> for FilePath {
    fn as_ref(&self) -> &RelativePath {
        &self.0
    }
}
