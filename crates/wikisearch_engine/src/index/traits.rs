/* 📖 # Why is IndexClient a trait?

The inverted index lives outside this server: it may be a file loaded at startup,
a database or another service. The connection handler only needs one question
answered (which documents mention this term, and how relevant are they), so that
question is the whole trait. Tests substitute in-memory or deliberately failing
indexes without touching the handler.

Lookups happen concurrently from every connection thread, hence `Send + Sync`
and `&self`. Implementations that need to mutate must bring their own locking.
*/

use std::sync::Arc;

use wikisearch_base::WikiSearchResult;

use crate::relevance::RelevanceMap;

/// Read-only access to a term → (document, relevance) index.
pub trait IndexClient: std::fmt::Debug + Send + Sync + 'static {
    /// Look up a single (already lower-cased) term.
    ///
    /// An unknown term is an empty map, not an error. Errors are reserved for
    /// failures to consult the index at all.
    fn lookup(&self, term: &str) -> WikiSearchResult<RelevanceMap>;
}

/// A cheaply cloneable handle to an index implementation.
///
/// This follows the same pattern as `PalHandle` in wikisearch_base.
#[derive(Debug, Clone)]
pub struct IndexHandle(Arc<dyn IndexClient>);

impl IndexHandle {
    /// Create a new IndexHandle wrapping the given index implementation.
    pub fn new(index: impl IndexClient) -> Self {
        Self(Arc::new(index))
    }

    /// Look up a term.
    ///
    /// See [`IndexClient::lookup`] for details.
    pub fn lookup(&self, term: &str) -> WikiSearchResult<RelevanceMap> {
        self.0.lookup(term)
    }
}
