/* 📖 # Why provide an in-memory index implementation?

The server needs some index to be useful on its own, and the tests need one they
can fill in a few lines. InMemoryIndex keeps term → document → count in nested
HashMaps behind a parking_lot RwLock: lookups from connection threads take the
read lock, `add` takes the write lock.

The on-disk form is a single JSON object keyed by term:

```json
{ "ibm": { "docA": 3, "docB": 1 }, "java": { "docC": 7 } }
```

Terms are lower-cased on insertion since queries are lower-cased by the parser.
*/

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use wikisearch_base::{FilePath, Pal, ResultExt, WikiSearchResult, err};

use crate::index::traits::IndexClient;
use crate::relevance::{Relevance, RelevanceMap, total_relevance};

/// An index held entirely in memory.
///
/// # Example
///
/// ```
/// use wikisearch_engine::{IndexClient, InMemoryIndex};
///
/// let index = InMemoryIndex::new();
/// index.add("IBM", "docA", 3);
/// index.add("ibm", "docB", 1);
///
/// let result = index.lookup("ibm").unwrap();
/// assert_eq!(result.get("docA"), 3);
/// assert_eq!(result.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    terms: RwLock<HashMap<String, HashMap<String, Relevance>>>,
}

impl InMemoryIndex {
    /// Create a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` occurrences of `term` in `document`.
    ///
    /// Adding the same (term, document) pair twice sums the counts.
    pub fn add(&self, term: &str, document: &str, count: Relevance) {
        let mut terms = self.terms.write();
        let postings = terms.entry(term.to_lowercase()).or_default();
        let entry = postings.entry(document.to_string()).or_insert(0);
        *entry = total_relevance(*entry, count);
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.read().len()
    }

    /// Parse an index from its JSON form.
    pub fn from_json(json: &str) -> WikiSearchResult<Self> {
        let parsed: HashMap<String, HashMap<String, Relevance>> = serde_json::from_str(json)
            .map_err(|e| err!("Failed to parse index JSON: {}", e))?;
        let index = Self::new();
        for (term, postings) in parsed {
            for (document, count) in postings {
                index.add(&term, &document, count);
            }
        }
        Ok(index)
    }

    /// Load an index file through the PAL.
    #[instrument(skip(pal), fields(path = %path))]
    pub fn load_json(pal: &dyn Pal, path: &FilePath) -> WikiSearchResult<Self> {
        let json = pal
            .read_file_to_string(path)
            .with_context(|| format!("Failed to read index file {}", path))?;
        let index = Self::from_json(&json).with_context(|| format!("Invalid index file {}", path))?;
        info!(terms = index.term_count(), "loaded index");
        Ok(index)
    }
}

impl IndexClient for InMemoryIndex {
    fn lookup(&self, term: &str) -> WikiSearchResult<RelevanceMap> {
        let terms = self.terms.read();
        let result = match terms.get(term) {
            Some(postings) => RelevanceMap::from(postings.clone()),
            None => RelevanceMap::new(),
        };
        debug!(term, hits = result.len(), "index lookup");
        Ok(result)
    }
}
