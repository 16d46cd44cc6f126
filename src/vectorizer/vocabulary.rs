use std::collections::HashMap;

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, VectorizerError},
    vectorizer::{
        config::PruneConfig,
        corpus::{Corpus, TermStats},
    },
};

/// Vocabulary
/// Canonical term -> feature index mapping learned from the whole corpus.
///
/// Indices are contiguous `0..len` and follow ascending term order, so the
/// mapping depends only on the set of surviving terms. Together with the
/// order-free `Corpus::merge` this makes the vocabulary identical for any
/// partitioning of the corpus.
///
/// Alongside the mapping it keeps the global document frequency of every
/// kept term. Pruned terms are not part of it, so the broadcast snapshot
/// stays proportional to the kept vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<Box<str>>,
    doc_freq: Vec<u64>,
}

impl Vocabulary {
    /// Prune the merged corpus statistics and assign indices.
    ///
    /// 1. drop terms whose document frequency lies outside the resolved
    ///    `[min_df, max_df]` range
    /// 2. over `max_features`: keep the most frequent terms by occurrence
    ///    count, ties going to the smaller term
    /// 3. index survivors in ascending term order
    ///
    /// # Arguments
    /// * `corpus` - statistics reduced over every partition
    /// * `prune` - pruning parameters
    ///
    /// # Errors
    /// `Configuration` when the parameters are invalid, the corpus has no
    /// terms, or pruning removes every term.
    pub fn from_corpus(corpus: &Corpus, prune: &PruneConfig) -> Result<Self> {
        Self::from_corpus_with_pruned(corpus, prune).map(|(vocabulary, _)| vocabulary)
    }

    /// Same as `from_corpus`, also returning the removed terms in ascending order
    pub fn from_corpus_with_pruned(
        corpus: &Corpus,
        prune: &PruneConfig,
    ) -> Result<(Self, Vec<Box<str>>)> {
        prune.validate()?;
        if corpus.vocab_size() == 0 {
            return Err(VectorizerError::config(
                "empty vocabulary; documents produced no terms",
            ));
        }
        let (min_df, max_df) = prune.resolve(corpus.get_doc_num())?;
        debug!("doc frequency range resolved to [{min_df}, {max_df}]");

        let mut kept: Vec<(&str, TermStats)> = Vec::new();
        let mut pruned: Vec<Box<str>> = Vec::new();
        for (term, stats) in corpus.iter() {
            if (min_df..=max_df).contains(&stats.doc_freq) {
                kept.push((term, stats));
            } else {
                pruned.push(term.into());
            }
        }

        if let Some(max_features) = prune.max_features {
            if kept.len() > max_features {
                kept.sort_unstable_by(|a, b| {
                    b.1.occurrences.cmp(&a.1.occurrences).then_with(|| a.0.cmp(b.0))
                });
                pruned.extend(kept.drain(max_features..).map(|(term, _)| Box::from(term)));
            }
        }

        if kept.is_empty() {
            return Err(VectorizerError::config(
                "after pruning, no terms remain; try a lower min_df or a higher max_df",
            ));
        }

        kept.sort_unstable_by(|a, b| a.0.cmp(b.0));
        pruned.sort_unstable();

        let doc_freq = kept.iter().map(|(_, stats)| stats.doc_freq).collect();
        let terms = kept.into_iter().map(|(term, _)| Box::from(term)).collect();
        Ok((Self { terms, doc_freq }, pruned))
    }

    /// Feature index of a term
    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    /// Term at a feature index
    #[inline]
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(AsRef::as_ref)
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// (index, term) in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.terms.iter().enumerate().map(|(i, t)| (i, t.as_ref()))
    }

    /// Terms in index order
    pub fn feature_names(&self) -> Vec<&str> {
        self.terms.iter().map(AsRef::as_ref).collect()
    }

    /// Global document frequency per feature index
    #[inline]
    pub fn doc_freqs(&self) -> &[u64] {
        &self.doc_freq
    }

    #[inline]
    pub fn doc_freq(&self, index: usize) -> Option<u64> {
        self.doc_freq.get(index).copied()
    }

    /// Plain term -> index map
    pub fn to_hash_map(&self) -> HashMap<String, usize> {
        self.iter().map(|(i, t)| (t.to_string(), i)).collect()
    }
}

/// Equal when the same terms sit at the same indices
impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.terms.iter().eq(other.terms.iter()) && self.doc_freq == other.doc_freq
    }
}
