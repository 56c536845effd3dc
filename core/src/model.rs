//! The build-phase artifact shared by indexing and querying: vocabulary plus
//! corpus statistics. Immutable once built.

use crate::corpus::Corpus;
use crate::error::{Result, VsmError};
use crate::frequency::{count_terms, DocFrequencies, FrequencyTables};
use crate::vocabulary::{TermId, Vocabulary};
use crate::weighting::Weighting;

#[derive(Debug, Clone)]
pub struct VectorModel {
    vocabulary: Vocabulary,
    doc_freqs: DocFrequencies,
}

impl VectorModel {
    /// Scan the corpus once for vocabulary and frequency tables.
    /// The tables are returned alongside since only document vectorization needs them.
    pub fn build(corpus: &Corpus) -> Result<(Self, FrequencyTables)> {
        let vocabulary = Vocabulary::build(corpus);
        let tables = FrequencyTables::analyze(corpus);
        let model = Self::from_parts(vocabulary, tables.doc_freqs().clone())?;
        tracing::info!(num_docs = corpus.len(), num_terms = model.dimension(), "built vector model");
        Ok((model, tables))
    }

    pub fn from_parts(vocabulary: Vocabulary, doc_freqs: DocFrequencies) -> Result<Self> {
        if vocabulary.is_empty() || doc_freqs.doc_count == 0 {
            return Err(VsmError::EmptyCorpus);
        }
        Ok(Self { vocabulary, doc_freqs })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn doc_freqs(&self) -> &DocFrequencies {
        &self.doc_freqs
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_freqs.doc_count
    }

    /// Vector dimensionality, i.e. vocabulary size.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn weighting(&self) -> Weighting<'_> {
        // from_parts already rejected an empty corpus
        Weighting::from_checked(&self.doc_freqs)
    }

    /// Sparse query vector. Out-of-vocabulary terms are dropped.
    pub fn vectorize_query<S: AsRef<str>>(&self, query_terms: &[S]) -> QueryVector {
        let weighting = self.weighting();
        let mut entries: Vec<(TermId, f32)> = count_terms(query_terms)
            .into_keys()
            .filter_map(|term| {
                let coord = self.vocabulary.coordinate(&term)?;
                let w = weighting.weight_query(&term, query_terms)?;
                Some((coord, w))
            })
            .collect();
        entries.sort_by_key(|(coord, _)| *coord);
        QueryVector { dimension: self.dimension(), entries }
    }
}

/// Sparse (coordinate, weight) entries sorted by coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    dimension: usize,
    entries: Vec<(TermId, f32)>,
}

impl QueryVector {
    pub fn entries(&self) -> &[(TermId, f32)] {
        &self.entries
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// True when no coordinate carries a nonzero weight.
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }

    pub fn to_dense(&self) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for &(coord, w) in &self.entries {
            v[coord as usize] = w;
        }
        v
    }
}
