use std::{collections::HashSet, fmt::Debug, sync::LazyLock};

use ahash::RandomState;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    error::{Result, VectorizerError},
    vectorizer::config::{AnalyzerConfig, DEFAULT_TOKEN_PATTERN},
};

static DEFAULT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).expect("default token pattern compiles"));

/// Document
/// Raw text, or a token sequence produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Document {
    Text(String),
    Tokens(Vec<String>),
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::Text(text.to_string())
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Document::Text(text)
    }
}

impl From<Vec<String>> for Document {
    fn from(tokens: Vec<String>) -> Self {
        Document::Tokens(tokens)
    }
}

impl From<Vec<&str>> for Document {
    fn from(tokens: Vec<&str>) -> Self {
        Document::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

/// Analyzer Trait
/// Maps one document to its ordered term sequence.
///
/// Implementations must be pure: the same document always yields the same
/// terms, whatever partition or worker it is analyzed on.
pub trait Analyzer: Debug + Send + Sync {
    fn analyze(&self, doc: &Document) -> Vec<String>;
}

/// Default word analyzer
/// preprocess (lowercase, accent stripping) -> regex tokenize -> stop words -> n-grams
#[derive(Debug, Clone)]
pub struct WordAnalyzer {
    lowercase: bool,
    strip_accents: bool,
    token_pattern: Regex,
    stop_words: Option<HashSet<String, RandomState>>,
    ngram_range: (usize, usize),
}

impl Default for WordAnalyzer {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_accents: false,
            token_pattern: DEFAULT_TOKEN_REGEX.clone(),
            stop_words: None,
            ngram_range: (1, 1),
        }
    }
}

impl WordAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from config, compiling the token pattern
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let token_pattern = if config.token_pattern == DEFAULT_TOKEN_PATTERN {
            DEFAULT_TOKEN_REGEX.clone()
        } else {
            Regex::new(&config.token_pattern).map_err(|e| {
                VectorizerError::config(format!("invalid token_pattern: {e}"))
            })?
        };
        let stop_words = config
            .stop_words
            .as_ref()
            .map(|words| words.iter().cloned().collect());
        Ok(Self {
            lowercase: config.lowercase,
            strip_accents: config.strip_accents,
            token_pattern,
            stop_words,
            ngram_range: config.ngram_range,
        })
    }

    fn preprocess(&self, text: &str) -> String {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };
        if self.strip_accents {
            strip_accents_unicode(&text)
        } else {
            text
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        self.token_pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Unigrams first, then every longer n in order.
    /// n-gram terms are tokens joined by a single space.
    fn word_ngrams(&self, tokens: Vec<String>) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        if max_n == 1 {
            return tokens;
        }
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            if n == 1 {
                terms.extend(tokens.iter().cloned());
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }
}

impl Analyzer for WordAnalyzer {
    fn analyze(&self, doc: &Document) -> Vec<String> {
        let mut tokens = match doc {
            Document::Text(text) => self.tokenize(&self.preprocess(text)),
            Document::Tokens(tokens) => tokens.clone(),
        };
        if let Some(stop_words) = &self.stop_words {
            tokens.retain(|t| !stop_words.contains(t));
        }
        self.word_ngrams(tokens)
    }
}

/// Identity analyzer for pre-tokenized input.
/// Text documents fall back to a whitespace split.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreTokenized;

impl Analyzer for PreTokenized {
    fn analyze(&self, doc: &Document) -> Vec<String> {
        match doc {
            Document::Tokens(tokens) => tokens.clone(),
            Document::Text(text) => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Caller-supplied analyzer function
pub struct FnAnalyzer<F> {
    f: F,
}

impl<F> FnAnalyzer<F>
where
    F: Fn(&Document) -> Vec<String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Debug for FnAnalyzer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnAnalyzer")
    }
}

impl<F> Analyzer for FnAnalyzer<F>
where
    F: Fn(&Document) -> Vec<String> + Send + Sync,
{
    fn analyze(&self, doc: &Document) -> Vec<String> {
        (self.f)(doc)
    }
}

/// "café" -> "cafe"
pub fn strip_accents_unicode(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}
