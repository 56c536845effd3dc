use crate::corpus::Corpus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub type TermId = u32;

/// Term to coordinate mapping. Coordinates are dense in `[0, len)` and follow
/// lexicographic term order, so rebuilding from the same corpus yields the same layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    coords: HashMap<String, TermId>,
}

impl Vocabulary {
    pub fn build(corpus: &Corpus) -> Self {
        let distinct: BTreeSet<&str> = corpus
            .documents()
            .iter()
            .flat_map(|d| d.terms.iter().map(String::as_str))
            .collect();
        Self::from_sorted(distinct.into_iter().map(str::to_string).collect())
    }

    fn from_sorted(terms: Vec<String>) -> Self {
        let coords = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        Self { terms, coords }
    }

    pub fn coordinate(&self, term: &str) -> Option<TermId> {
        self.coords.get(term).copied()
    }

    pub fn term(&self, coord: TermId) -> Option<&str> {
        self.terms.get(coord as usize).map(String::as_str)
    }

    /// Terms in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, &str)> {
        self.terms.iter().enumerate().map(|(i, t)| (i as TermId, t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(mut terms: Vec<String>) -> Self {
        terms.sort();
        terms.dedup();
        Self::from_sorted(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(v: Vocabulary) -> Self {
        v.terms
    }
}
