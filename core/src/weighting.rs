//! TF-IDF weighting with `idf = ln(N / df)`.

use crate::error::{Result, VsmError};
use crate::frequency::{DocFrequencies, FrequencyTables};

#[derive(Debug, Clone, Copy)]
pub struct Weighting<'a> {
    doc_freqs: &'a DocFrequencies,
}

impl<'a> Weighting<'a> {
    /// Fails with `EmptyCorpus` when there is nothing to divide by.
    pub fn new(doc_freqs: &'a DocFrequencies) -> Result<Self> {
        if doc_freqs.doc_count == 0 || doc_freqs.counts.is_empty() {
            return Err(VsmError::EmptyCorpus);
        }
        Ok(Self { doc_freqs })
    }

    pub(crate) fn from_checked(doc_freqs: &'a DocFrequencies) -> Self {
        Self { doc_freqs }
    }

    /// `None` for terms that never occur in the corpus.
    pub fn idf(&self, term: &str) -> Option<f32> {
        let df = self.doc_freqs.df(term)?;
        Some(idf(self.doc_freqs.doc_count, df))
    }

    pub fn weight(&self, tables: &FrequencyTables, term: &str, doc: &str) -> f32 {
        match tables.tf(doc, term) {
            0 => 0.0,
            tf => tf as f32 * self.idf(term).unwrap_or(0.0),
        }
    }

    /// Query-local tf times corpus idf. `None` when the term is out of vocabulary.
    pub fn weight_query<S: AsRef<str>>(&self, term: &str, query_terms: &[S]) -> Option<f32> {
        let idf = self.idf(term)?;
        let tf = query_terms.iter().filter(|t| t.as_ref() == term).count();
        Some(tf as f32 * idf)
    }
}

/// Computed in f64: in f32 `N / (N - 1)` rounds to 1.0 once N passes 2^24.
#[inline]
pub fn idf(doc_count: u32, df: u32) -> f32 {
    (doc_count as f64 / df as f64).ln() as f32
}
