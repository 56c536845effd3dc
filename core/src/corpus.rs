//! Normalized corpus input.
//!
//! Each document is a file whose first line holds the whitespace-separated
//! terms produced by the normalizer. The file name is the document id.

use crate::error::{Result, VsmError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use walkdir::WalkDir;

/// Stable document identifier: the source file name.
pub type DocId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub terms: Vec<String>,
}

/// An immutable snapshot of normalized documents, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from in-memory documents. Later duplicates of an id replace earlier ones.
    pub fn from_documents<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<DocId>,
    {
        let mut docs: Vec<Document> = docs
            .into_iter()
            .map(|(id, terms)| Document { id: id.into(), terms })
            .collect();
        docs.reverse();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        docs.dedup_by(|a, b| a.id == b.id);
        Self { docs }
    }

    /// Read every regular file directly under `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut docs = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                VsmError::io(path, source)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            let terms = read_first_line(entry.path())?
                .split_whitespace()
                .map(str::to_string)
                .collect();
            docs.push(Document { id, terms });
        }
        tracing::info!(dir = %dir.display(), num_docs = docs.len(), "loaded corpus");
        Ok(Self { docs })
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

fn read_first_line(path: &Path) -> Result<String> {
    let f = File::open(path).map_err(|e| VsmError::io(path, e))?;
    let mut line = String::new();
    BufReader::new(f)
        .read_line(&mut line)
        .map_err(|e| VsmError::io(path, e))?;
    Ok(line)
}
