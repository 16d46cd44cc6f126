use std::{collections::HashMap, sync::Arc};

use ahash::RandomState;
use log::debug;

use crate::{
    error::Result,
    partition::Partitioned,
    utils::{
        math::normalize,
        matrix::{csr_from_rows, SparseRow},
    },
    vectorizer::{
        analyzer::{Analyzer, Document, WordAnalyzer},
        config::{HashingConfig, Norm},
        FeatureBlocks, Vectorizer,
    },
};

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline]
fn mix_k(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// MurmurHash3, x86 32-bit variant
pub fn murmur3_x86_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= mix_k(k);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k = tail
            .iter()
            .enumerate()
            .fold(0u32, |k, (i, &b)| k | (u32::from(b) << (8 * i)));
        h ^= mix_k(k);
    }

    h ^= data.len() as u32;
    fmix32(h)
}

/// Hashing Vectorizer
/// Maps every term straight to a column with a signed 32-bit MurmurHash3
/// (seed 0). Nothing is learned, so each partition is encoded on its own and
/// `fit` is a no-op.
///
/// Column is `|h| mod n_features`. With `alternate_sign` the value is `-1`
/// for negative `h`, which keeps colliding terms from piling up in one
/// direction.
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    config: HashingConfig,
    analyzer: Arc<dyn Analyzer>,
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HashingVectorizer {
    pub fn new() -> Self {
        Self {
            config: HashingConfig::default(),
            analyzer: Arc::new(WordAnalyzer::new()),
        }
    }

    pub fn from_config(config: HashingConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = WordAnalyzer::from_config(&config.analyzer)?;
        Ok(Self {
            config,
            analyzer: Arc::new(analyzer),
        })
    }

    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    pub fn with_n_features(mut self, n_features: usize) -> Self {
        self.config.n_features = n_features;
        self
    }

    pub fn with_alternate_sign(mut self, alternate_sign: bool) -> Self {
        self.config.alternate_sign = alternate_sign;
        self
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.config.norm = norm;
        self
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.config.binary = binary;
        self
    }

    #[inline]
    pub fn config(&self) -> &HashingConfig {
        &self.config
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.config.n_features
    }

    /// Column and signed unit value of one term
    #[inline]
    pub fn hash_term(&self, term: &str) -> (usize, f64) {
        let h = murmur3_x86_32(term.as_bytes(), 0) as i32;
        let index = h.unsigned_abs() as usize % self.config.n_features;
        let value = if self.config.alternate_sign && h < 0 { -1.0 } else { 1.0 };
        (index, value)
    }

    fn encode_document(&self, doc: &Document) -> SparseRow {
        let mut acc: HashMap<usize, f64, RandomState> = HashMap::with_hasher(RandomState::new());
        for term in self.analyzer.analyze(doc) {
            let (index, value) = self.hash_term(&term);
            *acc.entry(index).or_insert(0.0) += value;
        }

        // colliding terms of opposite sign may cancel out
        let mut row: SparseRow = acc.into_iter().filter(|&(_, v)| v != 0.0).collect();
        row.sort_unstable_by_key(|&(index, _)| index);

        if self.config.binary {
            row.iter_mut().for_each(|(_, v)| *v = 1.0);
        }
        if let Some(norm) = self.config.norm {
            normalize(&mut row, norm);
        }
        row
    }
}

impl Vectorizer<Document> for HashingVectorizer {
    /// Validates the configuration only
    fn fit(&mut self, _docs: &Partitioned<Document>) -> Result<&mut Self> {
        self.config.validate()?;
        Ok(self)
    }

    fn transform(&self, docs: &Partitioned<Document>) -> Result<FeatureBlocks> {
        self.config.validate()?;
        debug!(
            "hashing {} documents in {} partitions into {} features",
            docs.count(),
            docs.num_partitions(),
            self.config.n_features
        );
        Ok(docs.map_partitions(|part| {
            let rows: Vec<SparseRow> = part.iter().map(|doc| self.encode_document(doc)).collect();
            vec![csr_from_rows(&rows, self.config.n_features)]
        }))
    }

    fn fit_transform(&mut self, docs: &Partitioned<Document>) -> Result<FeatureBlocks> {
        self.transform(docs)
    }
}
