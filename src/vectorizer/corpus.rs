use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::vectorizer::{
    analyzer::{Analyzer, Document},
    term::TermFrequency,
};

/// Corpus-wide statistics of one term
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStats {
    /// documents containing the term at least once
    pub doc_freq: u64,
    /// occurrences over all documents
    pub occurrences: u64,
}

impl TermStats {
    #[inline]
    fn absorb(&mut self, other: TermStats) {
        self.doc_freq += other.doc_freq;
        self.occurrences += other.occurrences;
    }
}

/// Corpus statistics
/// Keeps the document count and, per term, its document frequency and
/// occurrence count. No document text or ids are stored.
///
/// One `Corpus` is built per partition, then all of them are folded with
/// `merge`. `merge` is a key-wise sum, so it is associative and commutative
/// with `Corpus::new()` as identity: any grouping or ordering of partitions
/// yields the same table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    doc_num: u64,
    term_stats: HashMap<Box<str>, TermStats, RandomState>,
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_stats: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Statistics of one partition's documents
    pub fn from_documents(docs: &[Document], analyzer: &dyn Analyzer) -> Self {
        let mut corpus = Corpus::new();
        for doc in docs {
            corpus.add_doc(&TermFrequency::from_document(doc, analyzer));
        }
        corpus
    }

    /// Add one document's term counts.
    /// Each distinct term raises its document frequency by exactly one.
    pub fn add_doc(&mut self, doc: &TermFrequency) {
        self.doc_num += 1;
        for (term, count) in doc.iter() {
            let stats = TermStats { doc_freq: 1, occurrences: count };
            match self.term_stats.get_mut(term) {
                Some(existing) => existing.absorb(stats),
                None => {
                    self.term_stats.insert(term.into(), stats);
                }
            }
        }
    }

    /// Merge another corpus into self
    pub fn merge_corpus(&mut self, other: &Corpus) {
        self.doc_num += other.doc_num;
        for (term, &stats) in other.term_stats.iter() {
            self.term_stats.entry(term.clone()).or_default().absorb(stats);
        }
    }

    /// Owned merge for reductions.
    /// Folds the smaller table into the larger one.
    pub fn merge(self, other: Corpus) -> Corpus {
        let (mut big, small) = if self.term_stats.len() >= other.term_stats.len() {
            (self, other)
        } else {
            (other, self)
        };
        big.doc_num += small.doc_num;
        for (term, stats) in small.term_stats {
            big.term_stats.entry(term).or_default().absorb(stats);
        }
        big
    }
}

/// Read access
impl Corpus {
    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Get the statistics of a term, if it was ever seen
    #[inline]
    pub fn term_stats(&self, term: &str) -> Option<TermStats> {
        self.term_stats.get(term).copied()
    }

    /// Document frequency of a term, 0 when unseen
    #[inline]
    pub fn get_doc_freq(&self, term: &str) -> u64 {
        self.term_stats.get(term).map_or(0, |s| s.doc_freq)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_stats.len()
    }

    /// (term, stats) in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermStats)> {
        self.term_stats.iter().map(|(term, &stats)| (term.as_ref(), stats))
    }
}

impl PartialEq for Corpus {
    fn eq(&self, other: &Self) -> bool {
        self.doc_num == other.doc_num && self.term_stats == other.term_stats
    }
}
