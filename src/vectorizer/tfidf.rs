use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sprs::CsMat;

use crate::{
    error::{Result, VectorizerError},
    partition::{Broadcast, Partitioned},
    utils::{
        math::normalize,
        matrix::{as_csr, check_cols, csr_from_rows, to_rows, SparseRow},
    },
    vectorizer::{
        analyzer::{Analyzer, Document},
        config::{DocFrequency, Norm, TfidfConfig, TfidfVectorizerConfig},
        count::CountVectorizer,
        vocabulary::Vocabulary,
        FeatureBlocks, Vectorizer,
    },
};

/// Global IDF vector
/// Built once from the document frequencies summed over every partition and
/// then shared read-only with all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdfVector {
    idf: Vec<f64>,
    doc_freq: Vec<u64>,
    doc_num: u64,
}

impl IdfVector {
    /// # Arguments
    /// * `doc_freq` - rows with a non-zero entry, per column
    /// * `doc_num` - total row count
    /// * `smooth` - add one to both counts, as if one extra document held every term
    pub fn from_doc_freq(doc_freq: Vec<u64>, doc_num: u64, smooth: bool) -> Self {
        let n = doc_num as f64;
        let idf = doc_freq
            .iter()
            .map(|&df| {
                let df = df as f64;
                if smooth {
                    ((1.0 + n) / (1.0 + df)).ln() + 1.0
                } else if df == 0.0 {
                    1.0
                } else {
                    (n / df).ln() + 1.0
                }
            })
            .collect();
        Self { idf, doc_freq, doc_num }
    }

    #[inline]
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    #[inline]
    pub fn doc_freq(&self) -> &[u64] {
        &self.doc_freq
    }

    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.idf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }
}

/// Local document-frequency vector of one partition
fn local_doc_freq(blocks: &[CsMat<f64>], n_features: usize) -> Result<(Vec<u64>, u64)> {
    let mut doc_freq = vec![0u64; n_features];
    let mut rows = 0u64;
    for block in blocks {
        check_cols(block, n_features)?;
        rows += block.rows() as u64;
        for row in as_csr(block).outer_iterator() {
            for (col, &val) in row.iter() {
                if val != 0.0 {
                    doc_freq[col] += 1;
                }
            }
        }
    }
    Ok((doc_freq, rows))
}

/// TF-IDF Transformer
/// Reweights partitioned count blocks.
///
/// fit: each partition counts, per column, the rows holding a non-zero value;
/// the vectors are summed element-wise and turned into one `IdfVector`.
/// transform: per row, optional sublinear tf, idf scaling, then row norm.
#[derive(Debug, Clone, Default)]
pub struct TfidfTransformer {
    config: TfidfConfig,
    idf: Option<Broadcast<IdfVector>>,
}

impl TfidfTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: TfidfConfig) -> Self {
        Self { config, idf: None }
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.config.norm = norm;
        self
    }

    pub fn with_use_idf(mut self, use_idf: bool) -> Self {
        self.config.use_idf = use_idf;
        self
    }

    pub fn with_smooth_idf(mut self, smooth_idf: bool) -> Self {
        self.config.smooth_idf = smooth_idf;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.config.sublinear_tf = sublinear_tf;
        self
    }

    #[inline]
    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    pub fn idf(&self) -> Option<&IdfVector> {
        self.idf.as_deref()
    }

    pub fn idf_broadcast(&self) -> Option<&Broadcast<IdfVector>> {
        self.idf.as_ref()
    }

    /// Install an IDF vector fitted elsewhere
    pub fn with_idf(mut self, idf: Broadcast<IdfVector>) -> Self {
        self.idf = Some(idf);
        self
    }

    /// Stored zeros are dropped, matching what `fit` counts as an entry.
    /// Sublinear tf keeps the sign of signed (hashed) counts: `sign(v) * (1 + ln|v|)`.
    fn weight_row(&self, row: &mut SparseRow, idf: &IdfVector) {
        row.retain(|&(_, v)| v != 0.0);
        if self.config.sublinear_tf {
            row.iter_mut()
                .for_each(|(_, v)| *v = v.signum() * (v.abs().ln() + 1.0));
        }
        if self.config.use_idf {
            row.iter_mut().for_each(|(col, v)| *v *= idf.idf[*col]);
        }
        if let Some(norm) = self.config.norm {
            normalize(row, norm);
        }
    }

    fn weight_block(&self, block: &CsMat<f64>, idf: &IdfVector) -> Result<CsMat<f64>> {
        check_cols(block, idf.len())?;
        let mut rows = to_rows(block);
        rows.iter_mut().for_each(|row| self.weight_row(row, idf));
        Ok(csr_from_rows(&rows, idf.len()))
    }
}

impl Vectorizer<CsMat<f64>> for TfidfTransformer {
    /// # Errors
    /// * `Configuration` when there is no block at all
    /// * `InconsistentState` when blocks disagree on the column count
    fn fit(&mut self, blocks: &FeatureBlocks) -> Result<&mut Self> {
        let n_features = blocks
            .iter()
            .next()
            .map(|block| block.cols())
            .ok_or_else(|| VectorizerError::config("no count blocks to fit on"))?;

        let (doc_freq, doc_num) = blocks.try_aggregate(
            || (vec![0u64; n_features], 0u64),
            |part| local_doc_freq(part, n_features),
            |(mut acc, acc_rows), (other, other_rows)| {
                acc.iter_mut().zip(other).for_each(|(a, b)| *a += b);
                Ok((acc, acc_rows + other_rows))
            },
        )?;
        if doc_num == 0 {
            warn!("fitting idf on zero documents");
        }
        debug!("reduced doc frequencies: {n_features} features over {doc_num} documents");

        let idf = IdfVector::from_doc_freq(doc_freq, doc_num, self.config.smooth_idf);
        info!("fitted idf vector of {} features", idf.len());
        self.idf = Some(Broadcast::new(idf));
        Ok(self)
    }

    fn transform(&self, blocks: &FeatureBlocks) -> Result<FeatureBlocks> {
        let idf = self
            .idf
            .clone()
            .ok_or(VectorizerError::NotFitted("TfidfTransformer"))?;
        blocks.try_map_partitions(|part| {
            part.iter().map(|block| self.weight_block(block, &idf)).collect()
        })
    }
}

/// TF-IDF Vectorizer
/// `CountVectorizer` followed by `TfidfTransformer`.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    count: CountVectorizer,
    tfidf: TfidfTransformer,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: TfidfVectorizerConfig) -> Result<Self> {
        Ok(Self {
            count: CountVectorizer::from_config(config.count)?,
            tfidf: TfidfTransformer::from_config(config.tfidf),
        })
    }

    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.count = self.count.with_analyzer(analyzer);
        self.tfidf.idf = None;
        self
    }

    pub fn with_min_df(mut self, min_df: impl Into<DocFrequency>) -> Self {
        self.count = self.count.with_min_df(min_df);
        self
    }

    pub fn with_max_df(mut self, max_df: impl Into<DocFrequency>) -> Self {
        self.count = self.count.with_max_df(max_df);
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.count = self.count.with_max_features(max_features);
        self
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.count = self.count.with_binary(binary);
        self
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.tfidf = self.tfidf.with_norm(norm);
        self
    }

    pub fn with_use_idf(mut self, use_idf: bool) -> Self {
        self.tfidf = self.tfidf.with_use_idf(use_idf);
        self
    }

    pub fn with_smooth_idf(mut self, smooth_idf: bool) -> Self {
        self.tfidf = self.tfidf.with_smooth_idf(smooth_idf);
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.tfidf = self.tfidf.with_sublinear_tf(sublinear_tf);
        self
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.count.vocabulary()
    }

    pub fn idf(&self) -> Option<&IdfVector> {
        self.tfidf.idf()
    }

    pub fn feature_names(&self) -> Option<Vec<&str>> {
        self.count.feature_names()
    }

    pub fn count_vectorizer(&self) -> &CountVectorizer {
        &self.count
    }

    pub fn tfidf_transformer(&self) -> &TfidfTransformer {
        &self.tfidf
    }
}

impl Vectorizer<Document> for TfidfVectorizer {
    fn fit(&mut self, docs: &Partitioned<Document>) -> Result<&mut Self> {
        let counts = self.count.fit_transform(docs)?;
        self.tfidf.fit(&counts)?;
        Ok(self)
    }

    fn transform(&self, docs: &Partitioned<Document>) -> Result<FeatureBlocks> {
        if self.tfidf.idf.is_none() {
            return Err(VectorizerError::NotFitted("TfidfVectorizer"));
        }
        let counts = self.count.transform(docs)?;
        self.tfidf.transform(&counts)
    }

    fn fit_transform(&mut self, docs: &Partitioned<Document>) -> Result<FeatureBlocks> {
        let counts = self.count.fit_transform(docs)?;
        self.tfidf.fit(&counts)?;
        self.tfidf.transform(&counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{utils::matrix::to_rows, vectorizer::collect_matrix};

    fn counts(rows: &[SparseRow], n_cols: usize, parts: usize) -> FeatureBlocks {
        let blocks = Partitioned::split(rows.to_vec(), parts);
        blocks.map_partitions(|part| vec![csr_from_rows(part, n_cols)])
    }

    #[test]
    fn smooth_idf_values() {
        let idf = IdfVector::from_doc_freq(vec![3, 1, 0], 3, true);
        assert!((idf.idf()[0] - 1.0).abs() < 1e-12);
        assert!((idf.idf()[1] - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!((idf.idf()[2] - (4.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn raw_idf_zero_df_falls_back() {
        let idf = IdfVector::from_doc_freq(vec![2, 0], 4, false);
        assert!((idf.idf()[0] - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert_eq!(idf.idf()[1], 1.0);
    }

    #[test]
    fn fit_sums_partition_doc_freq() {
        let rows = vec![
            vec![(0, 1.0), (1, 2.0)],
            vec![(1, 1.0)],
            vec![],
            vec![(0, 3.0), (2, 1.0)],
        ];
        let mut tt = TfidfTransformer::new();
        tt.fit(&counts(&rows, 3, 3)).unwrap();
        let idf = tt.idf().unwrap();
        assert_eq!(idf.doc_freq(), &[2, 2, 1]);
        assert_eq!(idf.doc_num(), 4);
    }

    #[test]
    fn rows_are_unit_length() {
        let rows = vec![vec![(0, 1.0), (1, 2.0)], vec![], vec![(2, 5.0)]];
        let mut tt = TfidfTransformer::new();
        let out = collect_matrix(&tt.fit_transform(&counts(&rows, 3, 2)).unwrap()).unwrap();
        let out = to_rows(&out);
        let norm: f64 = out[0].iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(out[1].is_empty());
        assert_eq!(out[2].len(), 1);
        assert!((out[2][0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sublinear_without_idf_or_norm() {
        let rows = vec![vec![(0, 1.0), (1, std::f64::consts::E)]];
        let mut tt = TfidfTransformer::new()
            .with_use_idf(false)
            .with_norm(None)
            .with_sublinear_tf(true);
        let out = to_rows(&collect_matrix(&tt.fit_transform(&counts(&rows, 2, 1)).unwrap()).unwrap());
        assert!((out[0][0].1 - 1.0).abs() < 1e-12);
        assert!((out[0][1].1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sublinear_skips_stored_zeros() {
        let block = CsMat::new((2, 2), vec![0, 1, 2], vec![0, 1], vec![0.0, 2.0]);
        let mut tt = TfidfTransformer::new().with_sublinear_tf(true);
        let out = to_rows(
            &collect_matrix(&tt.fit_transform(&Partitioned::single(vec![block])).unwrap()).unwrap(),
        );
        assert!(out[0].is_empty());
        assert_eq!(out[1].len(), 1);
        assert!((out[1][0].1 - 1.0).abs() < 1e-12);
        assert_eq!(tt.idf().unwrap().doc_freq(), &[0, 1]);
    }

    #[test]
    fn sublinear_keeps_sign() {
        let rows = vec![vec![(0, -2.0), (1, std::f64::consts::E)]];
        let mut tt = TfidfTransformer::new()
            .with_use_idf(false)
            .with_norm(None)
            .with_sublinear_tf(true);
        let out = to_rows(&collect_matrix(&tt.fit_transform(&counts(&rows, 2, 1)).unwrap()).unwrap());
        assert!((out[0][0].1 + (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!((out[0][1].1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn dimension_mismatch() {
        let mut tt = TfidfTransformer::new();
        tt.fit(&counts(&[vec![(0, 1.0)]], 2, 1)).unwrap();
        assert!(matches!(
            tt.transform(&counts(&[vec![(0, 1.0)]], 3, 1)),
            Err(VectorizerError::InconsistentState { expected: 2, actual: 3 })
        ));

        let mixed = Partitioned::from_partitions(vec![
            vec![csr_from_rows(&[vec![(0, 1.0)]], 2)],
            vec![csr_from_rows(&[vec![(0, 1.0)]], 4)],
        ]);
        assert!(matches!(
            TfidfTransformer::new().fit(&mixed),
            Err(VectorizerError::InconsistentState { .. })
        ));
    }

    #[test]
    fn not_fitted() {
        let tt = TfidfTransformer::new();
        assert!(matches!(
            tt.transform(&counts(&[vec![(0, 1.0)]], 2, 1)),
            Err(VectorizerError::NotFitted(_))
        ));
        let tv = TfidfVectorizer::new();
        assert!(matches!(
            tv.transform(&Partitioned::single(vec![Document::from("cat")])),
            Err(VectorizerError::NotFitted("TfidfVectorizer"))
        ));
    }

    #[test]
    fn vectorizer_composes_count_and_idf() {
        let docs: Partitioned<Document> = Partitioned::split(
            vec!["cat dog".into(), "dog dog fish".into(), "cat fish".into()],
            2,
        );
        let mut tv = TfidfVectorizer::new();
        let fitted = collect_matrix(&tv.fit_transform(&docs).unwrap()).unwrap();
        assert_eq!(tv.feature_names().unwrap(), vec!["cat", "dog", "fish"]);
        assert_eq!(tv.idf().unwrap().doc_freq(), &[2, 2, 2]);

        let again = collect_matrix(&tv.transform(&docs).unwrap()).unwrap();
        assert_eq!(to_rows(&fitted), to_rows(&again));
    }
}
