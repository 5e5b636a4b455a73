/* 📖 # Why is RelevanceMap immutable?

A RelevanceMap is the answer to one query: document identifier → relevance. Boolean
queries are answered by combining maps (`or`, `and`, `minus`), and each combination
allocates a fresh map instead of editing an operand. A map returned from the index
can therefore be shared between threads and reused in several combinations without
anyone observing a half-combined state.

Scores combine with `total_relevance`, a plain sum of term relevances. Any
replacement must stay commutative, associative and monotonic in both inputs so the
algebra below keeps its laws.
*/

use std::collections::HashMap;

/// Relevance of a document for a query. Absent documents have relevance 0.
pub type Relevance = u64;

/// Combine the relevance of one document under two queries.
///
/// Saturates instead of overflowing, which keeps the sum commutative and associative.
pub fn total_relevance(first: Relevance, second: Relevance) -> Relevance {
    first.saturating_add(second)
}

/// One row of a sorted result list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoredEntry {
    pub document: String,
    pub relevance: Relevance,
}

impl ScoredEntry {
    pub fn new(document: impl Into<String>, relevance: Relevance) -> Self {
        Self {
            document: document.into(),
            relevance,
        }
    }
}

/// Mapping from document identifier to relevance for one query result set.
///
/// # Examples
///
/// ```
/// use wikisearch_engine::RelevanceMap;
///
/// let java = RelevanceMap::from_iter([("Java", 5u64), ("JVM", 2)]);
/// let coffee = RelevanceMap::from_iter([("Java", 1u64), ("Espresso", 4)]);
///
/// let both = java.and(&coffee);
/// assert_eq!(both.get("Java"), 6);
/// assert!(!both.contains("JVM"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceMap {
    scores: HashMap<String, Relevance>,
}

impl RelevanceMap {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Relevance of the given document, 0 if the document is not in the map.
    pub fn get(&self, document: &str) -> Relevance {
        self.scores.get(document).copied().unwrap_or(0)
    }

    /// True if the document is a member of the result set (even with relevance 0).
    pub fn contains(&self, document: &str) -> bool {
        self.scores.contains_key(document)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate over (document, relevance) pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Relevance)> {
        self.scores.iter().map(|(doc, rel)| (doc.as_str(), *rel))
    }

    /// Union: every document of either map, relevances summed (absent side counts as 0).
    pub fn or(&self, other: &RelevanceMap) -> RelevanceMap {
        let mut union = self.scores.clone();
        for (document, relevance) in &other.scores {
            let total = total_relevance(self.get(document), *relevance);
            union.insert(document.clone(), total);
        }
        RelevanceMap { scores: union }
    }

    /// Intersection: only documents present in both maps, relevances summed.
    pub fn and(&self, other: &RelevanceMap) -> RelevanceMap {
        let scores = self
            .scores
            .iter()
            .filter_map(|(document, relevance)| {
                other
                    .scores
                    .get(document)
                    .map(|theirs| (document.clone(), total_relevance(*relevance, *theirs)))
            })
            .collect();
        RelevanceMap { scores }
    }

    /// Difference: documents of `self` that are not in `other`, relevances unchanged.
    pub fn minus(&self, other: &RelevanceMap) -> RelevanceMap {
        let scores = self
            .scores
            .iter()
            .filter(|(document, _)| !other.contains(document))
            .map(|(document, relevance)| (document.clone(), *relevance))
            .collect();
        RelevanceMap { scores }
    }

    /// Entries in ascending relevance; ties are ordered by document identifier.
    pub fn sort(&self) -> Vec<ScoredEntry> {
        let mut entries: Vec<ScoredEntry> = self
            .scores
            .iter()
            .map(|(document, relevance)| ScoredEntry::new(document.clone(), *relevance))
            .collect();
        entries.sort_by(|a, b| {
            a.relevance
                .cmp(&b.relevance)
                .then_with(|| a.document.cmp(&b.document))
        });
        entries
    }
}

impl<D: Into<String>> FromIterator<(D, Relevance)> for RelevanceMap {
    /// Later pairs win over earlier pairs for the same document.
    fn from_iter<I: IntoIterator<Item = (D, Relevance)>>(iter: I) -> Self {
        RelevanceMap {
            scores: iter
                .into_iter()
                .map(|(document, relevance)| (document.into(), relevance))
                .collect(),
        }
    }
}

impl FromIterator<ScoredEntry> for RelevanceMap {
    fn from_iter<I: IntoIterator<Item = ScoredEntry>>(iter: I) -> Self {
        iter.into_iter()
            .map(|entry| (entry.document, entry.relevance))
            .collect()
    }
}

impl From<HashMap<String, Relevance>> for RelevanceMap {
    fn from(scores: HashMap<String, Relevance>) -> Self {
        Self { scores }
    }
}
