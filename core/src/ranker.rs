//! Cosine similarity and exhaustive top-k ranking.

use crate::error::{Result, VsmError};
use crate::store::VectorStore;
use serde::Serialize;

/// A ranked document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc: String,
    pub score: f32,
}

#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

pub fn is_zero_norm(v: &[f32]) -> bool {
    norm(v) == 0.0
}

/// Cosine of the angle between `a` and `b`; 0 when either has zero norm.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        return 0.0;
    }
    dot(a, b) / denom
}

/// Top `k` documents by cosine similarity over the whole store.
///
/// Documents with similarity not strictly positive are not matches. Ties keep
/// scan order. An all-zero query yields an empty list.
pub fn find_similar(store: &VectorStore, query: &[f32], k: usize) -> Result<Vec<ScoredDoc>> {
    check_dimension(store, query)?;
    if is_zero_norm(query) {
        return Ok(Vec::new());
    }

    let mut hits: Vec<ScoredDoc> = store
        .iter()
        .filter_map(|(doc, v)| {
            let score = cosine(v, query);
            (score > 0.0).then(|| ScoredDoc { doc: doc.to_string(), score })
        })
        .collect();
    sort_descending(&mut hits);
    hits.truncate(k);
    Ok(hits)
}

pub(crate) fn check_dimension(store: &VectorStore, query: &[f32]) -> Result<()> {
    if query.len() != store.dimension() {
        return Err(VsmError::DimensionMismatch {
            id: "<query>".to_string(),
            expected: store.dimension(),
            found: query.len(),
        });
    }
    Ok(())
}

/// Stable descending sort by score.
pub(crate) fn sort_descending(hits: &mut [ScoredDoc]) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
}
