/// This crate extracts text features from a corpus split into partitions,
/// giving the same vocabulary, counts and TF-IDF weights as a single-node
/// run over the whole corpus, whatever the partitioning.
pub mod error;
pub mod partition;
pub mod utils;
pub mod vectorizer;

/// Partitioned collection
/// An ordered list of partitions processed independently on the rayon pool.
/// Offers the primitives every vectorizer is written against:
/// - `map_partitions`: run a function on each partition
/// - `aggregate`: fold each partition, then combine partials with an
///   associative and commutative operation
/// - `collect`: concatenate partitions in order
///
/// `Partitioned::split` cuts a corpus into contiguous, balanced partitions.
pub use partition::Partitioned;

/// Broadcast snapshot
/// Frozen state (vocabulary, IDF vector) shared read-only with every
/// partition through an `Arc`.
/// `encode` / `decode` give a CBOR wire form for crossing a process boundary.
pub use partition::Broadcast;

/// Document and Analyzer
/// A `Document` is raw text or a token sequence.
/// An `Analyzer` turns one document into its term sequence and must give the
/// same terms for the same document on any worker.
/// - `WordAnalyzer`: regex tokenizer with lowercase, accent stripping, stop
///   words and word n-grams
/// - `PreTokenized`: tokens as they are
/// - `FnAnalyzer`: any closure
pub use vectorizer::analyzer::{Analyzer, Document, FnAnalyzer, PreTokenized, WordAnalyzer};

/// Term Frequency structure
/// Occurrence count of every term within one document, plus the total.
pub use vectorizer::term::TermFrequency;

/// Corpus statistics
/// Per-partition table of document count and, per term, document frequency
/// and occurrence count. `merge` is a key-wise sum, so partition tables can
/// be reduced in any order.
pub use vectorizer::corpus::{Corpus, TermStats};

/// Vocabulary
/// Pruned term -> index mapping, indices in ascending term order.
pub use vectorizer::vocabulary::Vocabulary;

/// Count Vectorizer
/// Learns a global vocabulary from all partitions (fit), then encodes every
/// partition into a block of term occurrence counts (transform).
pub use vectorizer::count::CountVectorizer;

/// Hashing Vectorizer
/// Stateless signed feature hashing with 32-bit MurmurHash3.
pub use vectorizer::hashing::{murmur3_x86_32, HashingVectorizer};

/// TF-IDF
/// - `TfidfTransformer`: sums local document frequencies into a global
///   `IdfVector` and reweights count blocks against it
/// - `TfidfVectorizer`: `CountVectorizer` followed by `TfidfTransformer`
pub use vectorizer::tfidf::{IdfVector, TfidfTransformer, TfidfVectorizer};

/// Configuration
/// Plain serde structs with defaults matching the usual single-node
/// vectorizers. Validated at fit / transform time.
pub use vectorizer::config::{
    AnalyzerConfig, CountConfig, DocFrequency, HashingConfig, Norm, PruneConfig, TfidfConfig,
    TfidfVectorizerConfig,
};

/// Vectorizer Trait
/// `fit`, `transform` and `fit_transform` over partitioned input, with one
/// CSR block per partition as output. `collect_matrix` stacks the blocks in
/// document order.
pub use vectorizer::{collect_matrix, FeatureBlocks, Vectorizer};

/// Errors
pub use error::{Result, VectorizerError};
