//! Read-only query serving over a loaded store.

use crate::error::Result;
use crate::index::InvertedIndex;
use crate::model::VectorModel;
use crate::persist::{load_inverted, load_model, load_store, StorePaths};
use crate::preprocess::Preprocessor;
use crate::ranker::{find_similar, ScoredDoc};
use crate::store::VectorStore;

/// How the indexed path picks the terms used for candidate selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexTerms {
    /// Lowercased whitespace tokens of the raw query. Cheaper, but skips
    /// stemming and stop-word removal, so stemmed index terms may be missed.
    #[default]
    Raw,
    /// The same normalizer output that builds the query vector.
    Normalized,
}

pub struct SearchSession<P> {
    model: VectorModel,
    store: VectorStore,
    index: InvertedIndex,
    preprocessor: P,
    index_terms: IndexTerms,
}

impl<P: Preprocessor> SearchSession<P> {
    pub fn new(model: VectorModel, store: VectorStore, preprocessor: P) -> Self {
        let index = InvertedIndex::build(&store, model.vocabulary());
        Self::with_index(model, store, index, preprocessor)
    }

    pub fn with_index(model: VectorModel, store: VectorStore, index: InvertedIndex, preprocessor: P) -> Self {
        Self { model, store, index, preprocessor, index_terms: IndexTerms::default() }
    }

    /// Load model and vectors from a store directory. A persisted inverted
    /// index is reused when it matches, otherwise it is rebuilt from the vectors.
    pub fn open(paths: &StorePaths, preprocessor: P) -> Result<Self> {
        let model = load_model(paths)?;
        let store = load_store(paths, &model)?;
        Ok(match load_inverted(paths, &model)? {
            Some(index) => Self::with_index(model, store, index, preprocessor),
            None => Self::new(model, store, preprocessor),
        })
    }

    pub fn index_terms(mut self, mode: IndexTerms) -> Self {
        self.index_terms = mode;
        self
    }

    /// Exhaustive top-k search.
    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<ScoredDoc>> {
        let terms = self.preprocessor.normalize(query_text);
        let q = self.model.vectorize_query(&terms).to_dense();
        find_similar(&self.store, &q, k)
    }

    /// Candidate-restricted search, every candidate returned.
    pub fn search_indexed(&self, query_text: &str) -> Result<Vec<ScoredDoc>> {
        let terms = self.preprocessor.normalize(query_text);
        let q = self.model.vectorize_query(&terms).to_dense();
        match self.index_terms {
            IndexTerms::Raw => self.index.find_similar_with_index(&self.store, query_text, &q),
            IndexTerms::Normalized => self.index.find_similar_with_terms(&self.store, &terms, &q),
        }
    }

    pub fn model(&self) -> &VectorModel {
        &self.model
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}
