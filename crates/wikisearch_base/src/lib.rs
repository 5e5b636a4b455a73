/* 📖 # Why have wikisearch_base as a core library?
wikisearch_base provides the error type, tracing setup and the platform abstraction
layer (filesystem access and HTTP value types) used by the engine and the CLI.
Keeping them here prevents circular dependencies between crates.
*/

pub mod error;
pub mod pal;
mod pal_tests;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ResultExt, WikiSearchError, WikiSearchResult};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
