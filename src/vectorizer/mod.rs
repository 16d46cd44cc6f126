pub mod analyzer;
pub mod config;
pub mod corpus;
pub mod count;
pub mod hashing;
pub mod term;
pub mod tfidf;
pub mod vocabulary;

use sprs::CsMat;

use crate::{error::Result, partition::Partitioned, utils::matrix};

/// One CSR block per partition, rows in document order
pub type FeatureBlocks = Partitioned<CsMat<f64>>;

/// Vectorizer Trait
/// Common surface of every pipeline stage: `fit` learns frozen state from a
/// partitioned input, `transform` encodes every partition against it.
///
/// `fit` takes `&mut self` and `transform` takes `&self`, so a transform can
/// never observe a half-built state.
pub trait Vectorizer<In>
where
    In: Sync,
{
    /// Learn global state from every partition
    fn fit(&mut self, input: &Partitioned<In>) -> Result<&mut Self>;

    /// Encode each partition into one block
    fn transform(&self, input: &Partitioned<In>) -> Result<FeatureBlocks>;

    /// `fit` then `transform` on the same input
    fn fit_transform(&mut self, input: &Partitioned<In>) -> Result<FeatureBlocks> {
        self.fit(input)?;
        self.transform(input)
    }
}

/// Stack per-partition blocks into one matrix, in partition order.
/// Row `i` of the result is the `i`-th document of the original corpus.
pub fn collect_matrix(blocks: &FeatureBlocks) -> Result<CsMat<f64>> {
    matrix::vstack(blocks.iter())
}
