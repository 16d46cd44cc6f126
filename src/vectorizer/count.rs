use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    error::{Result, VectorizerError},
    partition::{Broadcast, Partitioned},
    utils::matrix::{csr_from_rows, SparseRow},
    vectorizer::{
        analyzer::{Analyzer, Document, WordAnalyzer},
        config::{CountConfig, DocFrequency},
        corpus::Corpus,
        term::TermFrequency,
        vocabulary::Vocabulary,
        FeatureBlocks, Vectorizer,
    },
};

/// Count Vectorizer
/// Two passes over the partitioned corpus:
/// 1. every partition builds its own `Corpus`, the tables are reduced into
///    one and pruned into the global `Vocabulary`
/// 2. the vocabulary is broadcast and every partition encodes its documents
///    into a block of occurrence counts
///
/// Terms outside the vocabulary are ignored at transform time, the
/// vocabulary is never extended after fit.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    config: CountConfig,
    analyzer: Arc<dyn Analyzer>,
    vocabulary: Option<Broadcast<Vocabulary>>,
    pruned: Vec<Box<str>>,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountVectorizer {
    /// Default configuration with the built-in word analyzer
    pub fn new() -> Self {
        Self {
            config: CountConfig::default(),
            analyzer: Arc::new(WordAnalyzer::new()),
            vocabulary: None,
            pruned: Vec::new(),
        }
    }

    /// # Errors
    /// `Configuration` when the analyzer options are invalid
    pub fn from_config(config: CountConfig) -> Result<Self> {
        let analyzer = WordAnalyzer::from_config(&config.analyzer)?;
        Ok(Self {
            config,
            analyzer: Arc::new(analyzer),
            vocabulary: None,
            pruned: Vec::new(),
        })
    }

    /// Replace the analyzer. Drops any fitted vocabulary.
    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzer = Arc::new(analyzer);
        self.vocabulary = None;
        self.pruned.clear();
        self
    }

    pub fn with_min_df(mut self, min_df: impl Into<DocFrequency>) -> Self {
        self.config.prune.min_df = min_df.into();
        self
    }

    pub fn with_max_df(mut self, max_df: impl Into<DocFrequency>) -> Self {
        self.config.prune.max_df = max_df.into();
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.config.prune.max_features = Some(max_features);
        self
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.config.binary = binary;
        self
    }

    /// Install a vocabulary fitted elsewhere, e.g. decoded from
    /// `Broadcast::encode` output in another process.
    /// The pruned-term list is not carried over and reads as empty.
    pub fn with_vocabulary(mut self, vocabulary: Broadcast<Vocabulary>) -> Self {
        self.vocabulary = Some(vocabulary);
        self.pruned.clear();
        self
    }
}

/// Read access
impl CountVectorizer {
    #[inline]
    pub fn config(&self) -> &CountConfig {
        &self.config
    }

    #[inline]
    pub fn analyzer(&self) -> &dyn Analyzer {
        self.analyzer.as_ref()
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_deref()
    }

    /// Shared snapshot handed to partitions
    pub fn vocabulary_broadcast(&self) -> Option<&Broadcast<Vocabulary>> {
        self.vocabulary.as_ref()
    }

    pub fn feature_names(&self) -> Option<Vec<&str>> {
        self.vocabulary().map(Vocabulary::feature_names)
    }

    /// Terms seen during fit but removed by pruning, ascending
    pub fn pruned_terms(&self) -> Option<Vec<&str>> {
        self.vocabulary
            .as_ref()
            .map(|_| self.pruned.iter().map(AsRef::as_ref).collect())
    }

    /// Output dimension, `None` before fit
    pub fn n_features(&self) -> Option<usize> {
        self.vocabulary().map(Vocabulary::len)
    }
}

/// Count row of one document, columns ascending
fn encode_document(
    doc: &Document,
    analyzer: &dyn Analyzer,
    vocabulary: &Vocabulary,
    binary: bool,
) -> SparseRow {
    let tf = TermFrequency::from_document(doc, analyzer);
    let mut row: SparseRow = tf
        .iter()
        .filter_map(|(term, count)| {
            let value = if binary { 1.0 } else { count as f64 };
            vocabulary.index_of(term).map(|index| (index, value))
        })
        .collect();
    row.sort_unstable_by_key(|&(index, _)| index);
    row
}

impl Vectorizer<Document> for CountVectorizer {
    fn fit(&mut self, docs: &Partitioned<Document>) -> Result<&mut Self> {
        self.config.prune.validate()?;
        let empty = docs.partitions().iter().filter(|p| p.is_empty()).count();
        if empty > 0 {
            warn!("{empty} of {} partitions hold no documents", docs.num_partitions());
        }

        let analyzer = self.analyzer.as_ref();
        let corpus = docs.aggregate(
            Corpus::new,
            |part| Corpus::from_documents(part, analyzer),
            Corpus::merge,
        );
        debug!(
            "reduced corpus: {} documents, {} distinct terms",
            corpus.get_doc_num(),
            corpus.vocab_size()
        );

        let (vocabulary, pruned) =
            Vocabulary::from_corpus_with_pruned(&corpus, &self.config.prune)?;
        info!(
            "fitted vocabulary of {} terms ({} pruned) over {} documents in {} partitions",
            vocabulary.len(),
            pruned.len(),
            corpus.get_doc_num(),
            docs.num_partitions()
        );
        self.vocabulary = Some(Broadcast::new(vocabulary));
        self.pruned = pruned;
        Ok(self)
    }

    fn transform(&self, docs: &Partitioned<Document>) -> Result<FeatureBlocks> {
        let vocabulary = self
            .vocabulary
            .clone()
            .ok_or(VectorizerError::NotFitted("CountVectorizer"))?;
        let analyzer = self.analyzer.as_ref();
        let binary = self.config.binary;
        let n_features = vocabulary.len();

        Ok(docs.map_partitions(|part| {
            let rows: Vec<SparseRow> = part
                .iter()
                .map(|doc| encode_document(doc, analyzer, &vocabulary, binary))
                .collect();
            vec![csr_from_rows(&rows, n_features)]
        }))
    }
}
