//! Text normalization collaborator.
//!
//! The engine only depends on [`Preprocessor`]; [`StandardPreprocessor`] is the
//! English pipeline used by the indexer and the server.

use crate::error::{Result, VsmError};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor: Send + Sync {
    /// Raw text to an ordered sequence of normalized terms.
    fn normalize(&self, raw_text: &str) -> Vec<String>;
}

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\w+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","couldn",
            "did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","ll","me","more","most","mustn","my","myself",
            "no","nor","not","now","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "re","s","same","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","would","wouldn",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Punctuation stripping, lowercasing, stop-word removal and English stemming, in that order.
#[derive(Debug, Clone, Default)]
pub struct StandardPreprocessor {
    extra_stopwords: HashSet<String>,
}

impl StandardPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add stop words from a file with one word per line.
    pub fn with_stopwords_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| VsmError::io(path, e))?;
        self.extra_stopwords.extend(
            text.lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty()),
        );
        Ok(self)
    }

    fn is_stopword(&self, token: &str) -> bool {
        STOPWORDS.contains(token) || self.extra_stopwords.contains(token)
    }
}

impl Preprocessor for StandardPreprocessor {
    fn normalize(&self, raw_text: &str) -> Vec<String> {
        let text = raw_text.nfkc().collect::<String>();
        WORD.find_iter(&text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| !self.is_stopword(w))
            .map(|w| STEMMER.stem(&w).into_owned())
            .collect()
    }
}
