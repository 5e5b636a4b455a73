/* 📖 # Index module

The index answers "which documents contain this term". The trait and handle are
in `traits`, the bundled in-memory backend in `memory`. `search` is the one
place the handler goes through, so a lookup is always followed by the same
sorting rule.
*/

pub mod memory;
pub mod traits;

pub use memory::InMemoryIndex;
pub use traits::{IndexClient, IndexHandle};

use wikisearch_base::WikiSearchResult;

use crate::relevance::ScoredEntry;

/// Look up `term` and return its documents in ascending relevance.
pub fn search(term: &str, index: &IndexHandle) -> WikiSearchResult<Vec<ScoredEntry>> {
    Ok(index.lookup(term)?.sort())
}
