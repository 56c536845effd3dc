//! Inverted index over materialized document vectors.
//!
//! Postings are derived from stored weights, not from raw occurrence: a term
//! whose idf is zero has no postings even though it occurs everywhere.

use crate::corpus::DocId;
use crate::error::Result;
use crate::ranker::{check_dimension, cosine, is_zero_norm, sort_descending, ScoredDoc};
use crate::store::VectorStore;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    /// term -> documents with a strictly positive weight, in store scan order
    pub postings: HashMap<String, Vec<DocId>>,
    /// dimension of the vectors the index was built from
    pub dimension: usize,
    /// [`fingerprint`] of the vocabulary and document count at build time
    pub fingerprint: u32,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(store: &VectorStore, vocab: &Vocabulary) -> Self {
        let mut postings: HashMap<String, Vec<DocId>> = HashMap::new();
        for (doc, vector) in store.iter() {
            for (coord, term) in vocab.iter() {
                if vector.get(coord as usize).is_some_and(|w| *w > 0.0) {
                    postings.entry(term.to_string()).or_default().push(doc.to_string());
                }
            }
        }
        tracing::info!(num_terms = postings.len(), num_docs = store.len(), "built inverted index");
        Self { postings, dimension: store.dimension(), fingerprint: fingerprint(vocab, store.len()) }
    }

    /// Posting list for `term`; empty when the term is not indexed.
    pub fn postings(&self, term: &str) -> &[DocId] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union of the posting lists of `terms`, in store scan order.
    pub fn candidates<'s, S: AsRef<str>>(&self, store: &'s VectorStore, terms: &[S]) -> Vec<&'s str> {
        let positions: BTreeSet<usize> = terms
            .iter()
            .flat_map(|t| self.postings(t.as_ref()))
            .filter_map(|doc| store.position(doc))
            .collect();
        positions.into_iter().filter_map(|pos| store.id_at(pos)).collect()
    }

    /// Score every candidate sharing a term with `query_text` (lowercased and
    /// whitespace-split, no further normalization). No truncation.
    pub fn find_similar_with_index(
        &self,
        store: &VectorStore,
        query_text: &str,
        query: &[f32],
    ) -> Result<Vec<ScoredDoc>> {
        self.find_similar_with_terms(store, &raw_index_terms(query_text), query)
    }

    /// Same as [`find_similar_with_index`](Self::find_similar_with_index) with
    /// candidate-selection terms chosen by the caller.
    pub fn find_similar_with_terms<S: AsRef<str>>(
        &self,
        store: &VectorStore,
        terms: &[S],
        query: &[f32],
    ) -> Result<Vec<ScoredDoc>> {
        check_dimension(store, query)?;
        if is_zero_norm(query) {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredDoc> = self
            .candidates(store, terms)
            .into_iter()
            .filter_map(|doc| {
                let v = store.get(doc)?;
                Some(ScoredDoc { doc: doc.to_string(), score: cosine(v, query) })
            })
            .collect();
        sort_descending(&mut hits);
        Ok(hits)
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// True when the index was built for this vocabulary and document count.
    pub fn matches(&self, vocab: &Vocabulary, num_docs: usize) -> bool {
        self.dimension == vocab.len() && self.fingerprint == fingerprint(vocab, num_docs)
    }
}

/// CRC32 over the vocabulary terms in coordinate order followed by the document count.
pub fn fingerprint(vocab: &Vocabulary, num_docs: usize) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for (_, term) in vocab.iter() {
        hasher.update(term.as_bytes());
        hasher.update(&[0]);
    }
    hasher.update(&(num_docs as u64).to_le_bytes());
    hasher.finalize()
}

/// Lowercased, deduplicated whitespace tokens of raw query text.
pub fn raw_index_terms(query_text: &str) -> Vec<String> {
    let terms: BTreeSet<String> = query_text.split_whitespace().map(str::to_lowercase).collect();
    terms.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::model::VectorModel;

    fn fixture() -> (VectorModel, VectorStore) {
        let corpus = Corpus::from_documents(vec![
            ("doc1", vec!["cat".into(), "cat".into(), "dog".into(), "the".into()]),
            ("doc2", vec!["dog".into(), "bird".into(), "the".into()]),
            ("doc3", vec!["cat".into(), "bird".into(), "bird".into(), "the".into()]),
        ]);
        let (model, tables) = VectorModel::build(&corpus).unwrap();
        let store = VectorStore::build(&model, &tables, &corpus);
        (model, store)
    }

    #[test]
    fn postings_match_positive_weights() {
        let (model, store) = fixture();
        let index = InvertedIndex::build(&store, model.vocabulary());
        for (doc, v) in store.iter() {
            for (coord, term) in model.vocabulary().iter() {
                let listed = index.postings(term).iter().any(|d| d == doc);
                assert_eq!(listed, v[coord as usize] > 0.0, "doc={doc} term={term}");
            }
        }
    }

    #[test]
    fn zero_idf_term_has_no_postings() {
        let (model, store) = fixture();
        let index = InvertedIndex::build(&store, model.vocabulary());
        assert!(index.postings("the").is_empty());
        assert_eq!(index.postings("cat"), ["doc1".to_string(), "doc3".to_string()]);
    }

    #[test]
    fn indexed_search_scores_only_candidates() {
        let (model, store) = fixture();
        let index = InvertedIndex::build(&store, model.vocabulary());
        let q = model.vectorize_query(&["cat"]).to_dense();
        let hits = index.find_similar_with_index(&store, "CAT", &q).unwrap();
        let docs: Vec<&str> = hits.iter().map(|h| h.doc.as_str()).collect();
        assert_eq!(docs, vec!["doc1", "doc3"]);
    }

    #[test]
    fn candidates_are_deduplicated() {
        let (model, store) = fixture();
        let index = InvertedIndex::build(&store, model.vocabulary());
        let c = index.candidates(&store, &["cat", "bird", "cat"]);
        assert_eq!(c, vec!["doc1", "doc2", "doc3"]);
    }

    #[test]
    fn unknown_terms_give_no_candidates() {
        let (model, store) = fixture();
        let index = InvertedIndex::build(&store, model.vocabulary());
        let q = model.vectorize_query(&["fish"]).to_dense();
        assert!(index.find_similar_with_index(&store, "fish", &q).unwrap().is_empty());
        assert!(index.candidates(&store, &["fish"]).is_empty());
    }

    #[test]
    fn index_matches_only_its_own_vocabulary() {
        let (model, store) = fixture();
        let index = InvertedIndex::build(&store, model.vocabulary());
        assert!(index.matches(model.vocabulary(), store.len()));
        assert!(!index.matches(model.vocabulary(), store.len() - 1));

        // same size, different terms
        let renamed = Vocabulary::from(vec!["ant".to_string(), "bee".to_string(), "cow".to_string(), "the".to_string()]);
        assert_eq!(renamed.len(), model.dimension());
        assert!(!index.matches(&renamed, store.len()));
    }

    #[test]
    fn raw_terms_are_lowercased_and_unique() {
        assert_eq!(raw_index_terms("Cat  cat DOG"), vec!["cat", "dog"]);
    }
}
