use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::vectorizer::analyzer::{Analyzer, Document};

/// TermFrequency struct
/// Occurrence count of every term within a single document.
/// This is the local unit of work: it depends on nothing but the document
/// and the analyzer, never on the partition the document lives in.
///
/// # Examples
/// ```
/// use partitioned_vectorizer::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_term("term1");
/// term_freq.add_term("term2");
/// term_freq.add_term("term1");
///
/// assert_eq!(term_freq.term_count("term1"), 2);
/// assert_eq!(term_freq.term_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TermFrequency {
    term_count: HashMap<String, u64, RandomState>,
    total_term_count: u64,
}

/// Implementation for adding terms
impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        TermFrequency {
            term_count: HashMap::with_hasher(RandomState::new()),
            total_term_count: 0,
        }
    }

    /// Analyze a document and count its terms
    ///
    /// # Arguments
    /// * `doc` - document to count
    /// * `analyzer` - document -> term sequence
    pub fn from_document(doc: &Document, analyzer: &dyn Analyzer) -> Self {
        let mut tf = TermFrequency::new();
        tf.add_terms(&analyzer.analyze(doc));
        tf
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        if let Some(count) = self.term_count.get_mut(term) {
            *count += 1;
        } else {
            self.term_count.insert(term.to_string(), 1);
        }
        self.total_term_count += 1;
        self
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }
}

impl<T> From<&[T]> for TermFrequency
where
    T: AsRef<str>,
{
    fn from(terms: &[T]) -> Self {
        let mut tf = TermFrequency::new();
        tf.add_terms(terms);
        tf
    }
}

/// Implementation for retrieving information from TermFrequency
impl TermFrequency {
    /// Iterator over (term, count), in no particular order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_count.iter().map(|(term, &count)| (term.as_str(), count))
    }

    /// Occurrence count of a term, 0 when absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_count.contains_key(term)
    }

    /// Distinct terms
    #[inline]
    pub fn term_set(&self) -> Vec<&str> {
        self.term_count.keys().map(String::as_str).collect()
    }

    /// Number of distinct terms
    #[inline]
    pub fn len(&self) -> usize {
        self.term_count.len()
    }

    /// Total number of term occurrences
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::analyzer::WordAnalyzer;

    #[test]
    fn counts_occurrences_per_document() {
        let tf = TermFrequency::from_document(&"dog dog fish".into(), &WordAnalyzer::new());
        assert_eq!(tf.term_count("dog"), 2);
        assert_eq!(tf.term_count("fish"), 1);
        assert_eq!(tf.term_count("cat"), 0);
        assert_eq!(tf.len(), 2);
        assert_eq!(tf.term_sum(), 3);
    }

    #[test]
    fn empty_document() {
        let tf = TermFrequency::from_document(&"".into(), &WordAnalyzer::new());
        assert!(tf.is_empty());
        assert_eq!(tf.term_sum(), 0);
    }

    #[test]
    fn from_slice() {
        let tf = TermFrequency::from(&["a", "b", "a"][..]);
        let mut set = tf.term_set();
        set.sort_unstable();
        assert_eq!(set, vec!["a", "b"]);
        assert!(tf.contains_term("b"));
    }
}
