#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use partitioned_vectorizer::{
    utils::matrix::{as_csr, csr_from_rows},
    Analyzer, Document, FeatureBlocks, Norm, Partitioned, WordAnalyzer,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sprs::CsMat;

pub const WORDS: [&str; 16] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa",
];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Seeded corpus with a skewed word distribution.
/// "common" is in every document and "often" in most, so df based pruning
/// always has something to cut at both ends.
pub fn generate_corpus(seed: u64, n_docs: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_docs)
        .map(|_| {
            let mut words = vec!["common"];
            if rng.random_bool(0.7) {
                words.push("often");
            }
            let len = rng.random_range(0..10);
            for _ in 0..len {
                let a = rng.random_range(0..WORDS.len());
                let b = rng.random_range(0..WORDS.len());
                words.push(WORDS[a.min(b)]);
            }
            words.join(" ")
        })
        .collect()
}

/// Dense count rows, about a third of the cells non-zero
pub fn generate_counts(seed: u64, n_rows: usize, n_cols: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_rows)
        .map(|_| {
            (0..n_cols)
                .map(|_| {
                    if rng.random_bool(0.33) {
                        rng.random_range(1..6) as f64
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

pub fn documents(texts: &[String], parts: usize) -> Partitioned<Document> {
    Partitioned::split(texts.iter().map(|t| Document::from(t.as_str())).collect(), parts)
}

pub fn dense(mat: &CsMat<f64>) -> Vec<Vec<f64>> {
    as_csr(mat)
        .outer_iterator()
        .map(|row| {
            let mut out = vec![0.0; mat.cols()];
            for (col, &val) in row.iter() {
                out[col] = val;
            }
            out
        })
        .collect()
}

pub fn to_blocks(rows: &[Vec<f64>], parts: usize) -> FeatureBlocks {
    let n_cols = rows.first().map_or(0, Vec::len);
    let sparse: Vec<Vec<(usize, f64)>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, &v)| v != 0.0)
                .map(|(i, &v)| (i, v))
                .collect()
        })
        .collect();
    Partitioned::split(sparse, parts).map_partitions(|part| vec![csr_from_rows(part, n_cols)])
}

pub fn assert_close(actual: &[Vec<f64>], expected: &[Vec<f64>], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "row count");
    for (r, (a_row, e_row)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a_row.len(), e_row.len(), "column count of row {r}");
        for (c, (a, e)) in a_row.iter().zip(e_row).enumerate() {
            assert!((a - e).abs() <= tol, "cell ({r}, {c}): {a} vs {e}");
        }
    }
}

/// Plain single-pass count vectorizer.
/// Fractions are compared as floats, as a single-node implementation does.
pub struct ReferenceCounts {
    pub vocabulary: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

pub fn reference_counts(
    texts: &[String],
    min_df: Threshold,
    max_df: Threshold,
    max_features: Option<usize>,
) -> ReferenceCounts {
    let analyzer = WordAnalyzer::new();
    let docs: Vec<Vec<String>> = texts
        .iter()
        .map(|t| analyzer.analyze(&Document::from(t.as_str())))
        .collect();
    let n = docs.len() as f64;

    let mut df: BTreeMap<&str, u64> = BTreeMap::new();
    let mut occurrences: BTreeMap<&str, u64> = BTreeMap::new();
    for doc in &docs {
        let seen: BTreeSet<&str> = doc.iter().map(String::as_str).collect();
        for term in seen {
            *df.entry(term).or_default() += 1;
        }
        for term in doc {
            *occurrences.entry(term.as_str()).or_default() += 1;
        }
    }

    let admits_min = |d: u64| match min_df {
        Threshold::Count(c) => d >= c,
        Threshold::Share(f) => d as f64 >= f * n,
    };
    let admits_max = |d: u64| match max_df {
        Threshold::Count(c) => d <= c,
        Threshold::Share(f) => d as f64 <= f * n,
    };
    let mut kept: Vec<&str> = df
        .iter()
        .filter(|(_, &d)| admits_min(d) && admits_max(d))
        .map(|(&t, _)| t)
        .collect();
    if let Some(limit) = max_features {
        kept.sort_by(|a, b| occurrences[b].cmp(&occurrences[a]).then(a.cmp(b)));
        kept.truncate(limit);
        kept.sort();
    }

    let index: BTreeMap<&str, usize> = kept.iter().enumerate().map(|(i, &t)| (t, i)).collect();
    let rows = docs
        .iter()
        .map(|doc| {
            let mut row = vec![0.0; kept.len()];
            for term in doc {
                if let Some(&i) = index.get(term.as_str()) {
                    row[i] += 1.0;
                }
            }
            row
        })
        .collect();
    ReferenceCounts {
        vocabulary: kept.iter().map(|t| t.to_string()).collect(),
        rows,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Threshold {
    Count(u64),
    Share(f64),
}

/// Dense TF-IDF over whole-corpus count rows
pub fn reference_tfidf(
    counts: &[Vec<f64>],
    use_idf: bool,
    smooth_idf: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
) -> Vec<Vec<f64>> {
    let n_cols = counts.first().map_or(0, Vec::len);
    let n = counts.len() as f64;
    let idf: Vec<f64> = (0..n_cols)
        .map(|c| {
            let df = counts.iter().filter(|row| row[c] != 0.0).count() as f64;
            if !use_idf {
                1.0
            } else if smooth_idf {
                ((n + 1.0) / (df + 1.0)).ln() + 1.0
            } else if df == 0.0 {
                1.0
            } else {
                (n / df).ln() + 1.0
            }
        })
        .collect();

    counts
        .iter()
        .map(|row| {
            let mut out: Vec<f64> = row
                .iter()
                .zip(&idf)
                .map(|(&tf, &w)| {
                    if tf == 0.0 {
                        0.0
                    } else if sublinear_tf {
                        (tf.ln() + 1.0) * w
                    } else {
                        tf * w
                    }
                })
                .collect();
            let length = match norm {
                Some(Norm::L2) => out.iter().map(|v| v * v).sum::<f64>().sqrt(),
                Some(Norm::L1) => out.iter().map(|v| v.abs()).sum::<f64>(),
                None => 1.0,
            };
            if length > 0.0 {
                out.iter_mut().for_each(|v| *v /= length);
            }
            out
        })
        .collect()
}
