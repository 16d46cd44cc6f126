use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};

/// Regex matching tokens of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Hash space of the hashing vectorizer, 2^20
pub const DEFAULT_N_FEATURES: usize = 1 << 20;

/// Document frequency threshold
/// Either a document count or a share of the corpus in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocFrequency {
    Absolute(u64),
    Fraction(f64),
}

impl DocFrequency {
    fn validate(&self, name: &str) -> Result<()> {
        match *self {
            DocFrequency::Fraction(f) if !(0.0..=1.0).contains(&f) => Err(VectorizerError::config(
                format!("{name} fraction must lie in [0.0, 1.0], got {f}"),
            )),
            _ => Ok(()),
        }
    }

    /// Smallest admissible document count.
    /// A fraction `f` admits `df >= f * doc_num`, so it rounds up.
    #[inline]
    pub fn lower_bound(&self, doc_num: u64) -> u64 {
        match *self {
            DocFrequency::Absolute(n) => n,
            DocFrequency::Fraction(f) => (f * doc_num as f64).ceil() as u64,
        }
    }

    /// Largest admissible document count.
    /// A fraction `f` admits `df <= f * doc_num`, so it rounds down.
    #[inline]
    pub fn upper_bound(&self, doc_num: u64) -> u64 {
        match *self {
            DocFrequency::Absolute(n) => n,
            DocFrequency::Fraction(f) => (f * doc_num as f64).floor() as u64,
        }
    }
}

impl From<u64> for DocFrequency {
    fn from(n: u64) -> Self {
        DocFrequency::Absolute(n)
    }
}

impl From<f64> for DocFrequency {
    fn from(f: f64) -> Self {
        DocFrequency::Fraction(f)
    }
}

/// Vocabulary pruning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    pub min_df: DocFrequency,
    pub max_df: DocFrequency,
    /// keep only this many terms, ranked by corpus occurrence count
    pub max_features: Option<usize>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            min_df: DocFrequency::Absolute(1),
            max_df: DocFrequency::Fraction(1.0),
            max_features: None,
        }
    }
}

impl PruneConfig {
    pub fn validate(&self) -> Result<()> {
        self.min_df.validate("min_df")?;
        self.max_df.validate("max_df")?;
        if self.max_features == Some(0) {
            return Err(VectorizerError::config("max_features must be positive"));
        }
        Ok(())
    }

    /// Resolve both thresholds against the corpus size.
    ///
    /// # Returns
    /// * `(u64, u64)` - inclusive `[min, max]` document count range
    pub fn resolve(&self, doc_num: u64) -> Result<(u64, u64)> {
        let min = self.min_df.lower_bound(doc_num);
        let max = self.max_df.upper_bound(doc_num);
        if max < min {
            return Err(VectorizerError::config(format!(
                "max_df resolves to {max} documents, fewer than min_df ({min})"
            )));
        }
        Ok((min, max))
    }
}

/// Options of the built-in word analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub lowercase: bool,
    /// NFKD-decompose and drop combining marks
    pub strip_accents: bool,
    pub token_pattern: String,
    pub stop_words: Option<Vec<String>>,
    /// inclusive (min_n, max_n)
    pub ngram_range: (usize, usize),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_accents: false,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            stop_words: None,
            ngram_range: (1, 1),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VectorizerError::config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountConfig {
    pub analyzer: AnalyzerConfig,
    #[serde(flatten)]
    pub prune: PruneConfig,
    /// clamp every non-zero count to 1
    pub binary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub analyzer: AnalyzerConfig,
    pub n_features: usize,
    pub alternate_sign: bool,
    /// Defaults to `None`, unlike single-node hashing vectorizers that
    /// L2-normalize by default
    pub norm: Option<Norm>,
    pub binary: bool,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            n_features: DEFAULT_N_FEATURES,
            alternate_sign: true,
            norm: None,
            binary: false,
        }
    }
}

impl HashingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(VectorizerError::config("n_features must be positive"));
        }
        Ok(())
    }
}

/// Row normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfConfig {
    pub norm: Option<Norm>,
    pub use_idf: bool,
    /// add one to every document frequency, as if an extra document held every term
    pub smooth_idf: bool,
    /// replace tf with 1 + ln(tf); signed values keep their sign
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            norm: Some(Norm::L2),
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }
}

/// Counting followed by TF-IDF weighting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfVectorizerConfig {
    pub count: CountConfig,
    pub tfidf: TfidfConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_bounds_round_outward_from_admissible_range() {
        // 0.5 * 5 = 2.5 -> at least 3 docs, at most 2 docs
        assert_eq!(DocFrequency::Fraction(0.5).lower_bound(5), 3);
        assert_eq!(DocFrequency::Fraction(0.5).upper_bound(5), 2);
        assert_eq!(DocFrequency::Fraction(0.9).upper_bound(10), 9);
        assert_eq!(DocFrequency::Absolute(2).lower_bound(1000), 2);
    }

    #[test]
    fn resolve_rejects_inverted_range() {
        let cfg = PruneConfig {
            min_df: DocFrequency::Absolute(3),
            max_df: DocFrequency::Fraction(0.5),
            max_features: None,
        };
        assert!(cfg.resolve(4).is_err());
        assert_eq!(cfg.resolve(6).unwrap(), (3, 3));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = PruneConfig::default();
        cfg.max_df = DocFrequency::Fraction(1.5);
        assert!(cfg.validate().is_err());

        let cfg = PruneConfig { max_features: Some(0), ..PruneConfig::default() };
        assert!(cfg.validate().is_err());

        let hashing = HashingConfig { n_features: 0, ..HashingConfig::default() };
        assert!(hashing.validate().is_err());

        let analyzer = AnalyzerConfig { ngram_range: (2, 1), ..AnalyzerConfig::default() };
        assert!(analyzer.validate().is_err());
    }

    #[test]
    fn count_config_from_json_uses_defaults() {
        let cfg: CountConfig =
            serde_json::from_str(r#"{"min_df": 2, "max_df": 0.9, "binary": true}"#).unwrap();
        assert_eq!(cfg.prune.min_df, DocFrequency::Absolute(2));
        assert_eq!(cfg.prune.max_df, DocFrequency::Fraction(0.9));
        assert_eq!(cfg.prune.max_features, None);
        assert!(cfg.binary);
        assert_eq!(cfg.analyzer, AnalyzerConfig::default());
    }

    #[test]
    fn tfidf_config_norm_names() {
        let cfg: TfidfConfig = serde_json::from_str(r#"{"norm": "l1"}"#).unwrap();
        assert_eq!(cfg.norm, Some(Norm::L1));
        assert!(cfg.smooth_idf);
    }

    #[test]
    fn hashing_defaults_to_raw_counts() {
        let cfg: HashingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.norm, None);
        assert!(cfg.alternate_sign);
        assert_eq!(cfg.n_features, DEFAULT_N_FEATURES);
    }
}
