//! Dense per-document TF-IDF vectors.

use crate::corpus::{Corpus, DocId};
use crate::error::{Result, VsmError};
use crate::frequency::FrequencyTables;
use crate::model::VectorModel;
use crate::vocabulary::Vocabulary;
use rayon::prelude::*;
use std::collections::HashMap;

/// Document vectors in document-id order. Every vector has exactly `dimension` coordinates.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    dimension: usize,
    ids: Vec<DocId>,
    vectors: Vec<Vec<f32>>,
    positions: HashMap<DocId, usize>,
}

impl VectorStore {
    /// Materialize one vector per corpus document, in parallel.
    pub fn build(model: &VectorModel, tables: &FrequencyTables, corpus: &Corpus) -> Self {
        let dimension = model.dimension();
        let vocab = model.vocabulary();
        let weighting = model.weighting();

        let vectors: Vec<(DocId, Vec<f32>)> = corpus
            .documents()
            .par_iter()
            .map(|doc| {
                let mut v = vec![0.0f32; dimension];
                if let Some(counts) = tables.term_counts(&doc.id) {
                    for term in counts.keys() {
                        if let Some(coord) = vocab.coordinate(term) {
                            v[coord as usize] = weighting.weight(tables, term, &doc.id);
                        }
                    }
                }
                tracing::debug!(doc = %doc.id, "vectorized document");
                (doc.id.clone(), v)
            })
            .collect();

        let mut store = Self { dimension, ..Default::default() };
        for (id, v) in vectors {
            store.insert(id, v);
        }
        tracing::info!(num_docs = store.len(), dimension, "built vector store");
        store
    }

    /// Assemble a store from existing vectors, rejecting any whose length is not `dimension`.
    pub fn from_vectors<I>(dimension: usize, vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DocId, Vec<f32>)>,
    {
        let mut sorted: Vec<(DocId, Vec<f32>)> = vectors.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut store = Self { dimension, ..Default::default() };
        for (id, v) in sorted {
            if v.len() != dimension {
                return Err(VsmError::DimensionMismatch { id, expected: dimension, found: v.len() });
            }
            store.insert(id, v);
        }
        Ok(store)
    }

    fn insert(&mut self, id: DocId, v: Vec<f32>) {
        match self.positions.get(&id) {
            Some(&pos) => self.vectors[pos] = v,
            None => {
                self.positions.insert(id.clone(), self.ids.len());
                self.ids.push(id);
                self.vectors.push(v);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.positions.get(id).map(|&pos| self.vectors[pos].as_slice())
    }

    /// Position of a document in scan order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id_at(&self, pos: usize) -> Option<&str> {
        self.ids.get(pos).map(String::as_str)
    }

    /// (id, vector) pairs in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.ids.iter().map(String::as_str).zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Nonzero (term, weight) pairs for one document, in coordinate order.
    pub fn nonzero_terms<'a>(&'a self, vocab: &'a Vocabulary, id: &str) -> Result<Vec<(&'a str, f32)>> {
        let v = self.get(id).ok_or_else(|| VsmError::UnknownDocument(id.to_string()))?;
        Ok(vocab
            .iter()
            .filter_map(|(coord, term)| {
                let w = v[coord as usize];
                (w != 0.0).then_some((term, w))
            })
            .collect())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn builds_expected_vectors() {
        let corpus = Corpus::from_documents(vec![
            ("doc1", vec!["cat".into(), "cat".into(), "dog".into()]),
            ("doc2", vec!["dog".into(), "bird".into()]),
            ("doc3", vec!["cat".into(), "bird".into(), "bird".into()]),
        ]);
        let (model, tables) = VectorModel::build(&corpus).unwrap();
        let store = VectorStore::build(&model, &tables, &corpus);

        assert_eq!(store.len(), 3);
        assert!(approx(store.get("doc1").unwrap(), &[0.0, 0.811, 0.405]));
        assert!(approx(store.get("doc2").unwrap(), &[0.405, 0.0, 0.405]));
        assert!(approx(store.get("doc3").unwrap(), &[0.811, 0.405, 0.0]));
        let ids: Vec<&str> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["doc1", "doc2", "doc3"]);
    }

    #[test]
    fn term_in_every_document_has_zero_weight() {
        let corpus = Corpus::from_documents(vec![
            ("a", vec!["the".into(), "cat".into()]),
            ("b", vec!["the".into(), "dog".into()]),
        ]);
        let (model, tables) = VectorModel::build(&corpus).unwrap();
        let store = VectorStore::build(&model, &tables, &corpus);
        let coord = model.vocabulary().coordinate("the").unwrap() as usize;
        assert_eq!(store.get("a").unwrap()[coord], 0.0);
        let terms = store.nonzero_terms(model.vocabulary(), "a").unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].0, "cat");
    }

    #[test]
    fn from_vectors_rejects_wrong_dimension() {
        let err = VectorStore::from_vectors(3, vec![("x".to_string(), vec![1.0, 2.0])]).unwrap_err();
        match err {
            VsmError::DimensionMismatch { id, expected, found } => {
                assert_eq!(id, "x");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_document_lookup() {
        let store = VectorStore::from_vectors(1, vec![("x".to_string(), vec![1.0])]).unwrap();
        assert!(store.get("y").is_none());
        assert!(matches!(
            store.nonzero_terms(&Vocabulary::from(vec!["t".to_string()]), "y"),
            Err(VsmError::UnknownDocument(_))
        ));
    }
}
