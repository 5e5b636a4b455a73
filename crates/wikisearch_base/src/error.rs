use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- More transparency into error handling logic
- Span traces show which connection and which request produced an error
 */

/// Error variants that can occur in wikisearch operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/* 📖 # Why separate ErrorKind and WikiSearchError?
ErrorKind holds the structural variant (file path, io error, message) so callers
can pattern match on it (the handler looks for a NotFound FileError to decide
between a quiet 404 and a logged one). WikiSearchError adds the context stack
and the span trace captured at creation.
*/

/// Error type wrapping an [`ErrorKind`] with context and span trace.
pub struct WikiSearchError {
    kind: ErrorKind,
    context: Vec<String>,
    span_trace: SpanTrace,
}

impl WikiSearchError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a file error for the given path.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i + 1 == self.context.len() { "└─" } else { "├─" };
            writeln!(f, "{branch} {ctx}")?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for WikiSearchError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for WikiSearchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for WikiSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for WikiSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f)?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<WikiSearchError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.

*/

/// Standard result type for wikisearch operations.
pub type WikiSearchResult<T> = std::result::Result<T, Box<WikiSearchError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context using lazy evaluation.
    /// Prefer this to avoid string formatting in the success path.
    fn with_context<F>(self, f: F) -> WikiSearchResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for WikiSearchResult<T> {
    fn with_context<F>(self, f: F) -> WikiSearchResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Creates a boxed message error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::WikiSearchError::message(format!($($arg)*)))
    };
}
