//! Term and document frequency tables.
//!
//! Tables are keyed by raw term strings and do not depend on vocabulary
//! coordinates. Counting is done per document in parallel.

use crate::corpus::{Corpus, DocId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// term -> occurrences, only counts > 0 are present.
pub type TermCounts = HashMap<String, u32>;

/// Corpus-wide statistics needed to weight queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocFrequencies {
    pub doc_count: u32,
    pub counts: HashMap<String, u32>,
}

impl DocFrequencies {
    pub fn df(&self, term: &str) -> Option<u32> {
        self.counts.get(term).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyTables {
    term_freqs: HashMap<DocId, TermCounts>,
    doc_freqs: DocFrequencies,
}

impl FrequencyTables {
    pub fn analyze(corpus: &Corpus) -> Self {
        let per_doc: Vec<(DocId, TermCounts)> = corpus
            .documents()
            .par_iter()
            .map(|doc| (doc.id.clone(), count_terms(&doc.terms)))
            .collect();

        let mut counts: HashMap<String, u32> = HashMap::new();
        for (_, tf) in &per_doc {
            // each distinct term counts once per document
            for term in tf.keys() {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let doc_freqs = DocFrequencies { doc_count: corpus.len() as u32, counts };
        tracing::debug!(num_docs = doc_freqs.doc_count, num_terms = doc_freqs.counts.len(), "analyzed frequencies");
        Self { term_freqs: per_doc.into_iter().collect(), doc_freqs }
    }

    /// Raw count of `term` in document `doc`, 0 when absent.
    pub fn tf(&self, doc: &str, term: &str) -> u32 {
        self.term_freqs
            .get(doc)
            .and_then(|tf| tf.get(term))
            .copied()
            .unwrap_or(0)
    }

    pub fn df(&self, term: &str) -> Option<u32> {
        self.doc_freqs.df(term)
    }

    pub fn term_counts(&self, doc: &str) -> Option<&TermCounts> {
        self.term_freqs.get(doc)
    }

    pub fn doc_freqs(&self) -> &DocFrequencies {
        &self.doc_freqs
    }
}

/// Occurrence count of each distinct term in `terms`.
pub fn count_terms<S: AsRef<str>>(terms: &[S]) -> TermCounts {
    let mut tf = TermCounts::new();
    for t in terms {
        *tf.entry(t.as_ref().to_string()).or_insert(0) += 1;
    }
    tf
}
