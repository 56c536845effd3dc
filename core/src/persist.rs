use crate::corpus::DocId;
use crate::error::{Result, VsmError};
use crate::frequency::DocFrequencies;
use crate::index::InvertedIndex;
use crate::model::VectorModel;
use crate::store::VectorStore;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const FORMAT_VERSION: u32 = 1;
pub const VECTOR_EXT: &str = "vec";

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub dimension: usize,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct DictionaryFile {
    terms: Vocabulary,
    doc_freqs: DocFrequencies,
}

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn inverted(&self) -> PathBuf { self.root.join("inverted.bin") }
    pub fn vectors_dir(&self) -> PathBuf { self.root.join("vectors") }
    fn vectors_staging_dir(&self) -> PathBuf { self.root.join("vectors.tmp") }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path).map_err(|e| VsmError::io(path, e))?;
    f.write_all(bytes).map_err(|e| VsmError::io(path, e))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).map_err(|e| VsmError::io(path, e))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| VsmError::io(path, e))?;
    Ok(buf)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    create_dir_all(dir).map_err(|e| VsmError::io(dir, e))
}

pub fn save_model(paths: &StorePaths, model: &VectorModel) -> Result<()> {
    ensure_dir(&paths.root)?;
    let dict = DictionaryFile { terms: model.vocabulary().clone(), doc_freqs: model.doc_freqs().clone() };
    write_bytes(&paths.dictionary(), &bincode::serialize(&dict)?)
}

pub fn load_model(paths: &StorePaths) -> Result<VectorModel> {
    let dict: DictionaryFile = bincode::deserialize(&read_bytes(&paths.dictionary())?)?;
    VectorModel::from_parts(dict.terms, dict.doc_freqs)
}

pub fn save_meta(paths: &StorePaths, meta: &MetaFile) -> Result<()> {
    ensure_dir(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    write_bytes(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &StorePaths) -> Result<MetaFile> {
    let path = paths.meta();
    let mut f = File::open(&path).map_err(|e| VsmError::io(&path, e))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf).map_err(|e| VsmError::io(&path, e))?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

fn vector_file(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.{VECTOR_EXT}"))
}

pub fn save_vector(paths: &StorePaths, id: &str, vector: &[f32]) -> Result<()> {
    let dir = paths.vectors_dir();
    ensure_dir(&dir)?;
    write_bytes(&vector_file(&dir, id), &bincode::serialize(vector)?)
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(VsmError::io(dir, e)),
        _ => Ok(()),
    }
}

pub fn load_vector(path: &Path) -> Result<Vec<f32>> {
    let v = bincode::deserialize(&read_bytes(path)?)?;
    Ok(v)
}

/// Write every vector plus the meta file describing them. Vectors go to a
/// staging directory that replaces `vectors/` whole, so files of documents no
/// longer in the store do not survive a rebuild.
pub fn save_store(paths: &StorePaths, store: &VectorStore) -> Result<()> {
    let staging = paths.vectors_staging_dir();
    remove_dir_if_exists(&staging)?;
    ensure_dir(&staging)?;
    for (id, v) in store.iter() {
        write_bytes(&vector_file(&staging, id), &bincode::serialize(v)?)?;
    }
    let dir = paths.vectors_dir();
    remove_dir_if_exists(&dir)?;
    fs::rename(&staging, &dir).map_err(|e| VsmError::io(&dir, e))?;

    let meta = MetaFile {
        num_docs: store.len() as u32,
        dimension: store.dimension(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "saved vector store");
    Ok(())
}

/// Read every `*.vec` file back, keyed by file stem. Vectors whose length is
/// not `dimension` are rejected.
pub fn load_vectors(paths: &StorePaths, dimension: usize) -> Result<VectorStore> {
    let dir = paths.vectors_dir();
    let mut vectors: Vec<(DocId, Vec<f32>)> = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir.as_path()).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            VsmError::io(path, source)
        })?;
        let path = entry.path();
        let id = match (path.extension().and_then(|s| s.to_str()), path.file_stem()) {
            (Some(VECTOR_EXT), Some(stem)) if entry.file_type().is_file() => stem.to_string_lossy().into_owned(),
            _ => {
                tracing::warn!(path = %path.display(), "skipping non-vector entry");
                continue;
            }
        };
        vectors.push((id, load_vector(path)?));
    }
    VectorStore::from_vectors(dimension, vectors)
}

/// Load the vectors for `model`, refusing a store built for another vocabulary
/// or holding a different set of documents than recorded.
pub fn load_store(paths: &StorePaths, model: &VectorModel) -> Result<VectorStore> {
    let meta = load_meta(paths)?;
    if meta.dimension != model.dimension() {
        return Err(VsmError::StaleStore { what: "dimension", expected: model.dimension(), found: meta.dimension });
    }
    let store = load_vectors(paths, model.dimension())?;
    if store.len() != meta.num_docs as usize {
        return Err(VsmError::StaleStore { what: "vector count", expected: meta.num_docs as usize, found: store.len() });
    }
    if store.len() != model.doc_count() as usize {
        return Err(VsmError::StaleStore {
            what: "document count",
            expected: model.doc_count() as usize,
            found: store.len(),
        });
    }
    tracing::info!(num_docs = store.len(), dimension = store.dimension(), "loaded vector store");
    Ok(store)
}

pub fn save_inverted(paths: &StorePaths, index: &InvertedIndex) -> Result<()> {
    ensure_dir(&paths.root)?;
    write_bytes(&paths.inverted(), &bincode::serialize(index)?)
}

pub fn remove_inverted(paths: &StorePaths) -> Result<()> {
    let path = paths.inverted();
    match fs::remove_file(&path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(VsmError::io(&path, e)),
        _ => Ok(()),
    }
}

/// A persisted index is used only if present and built for this model's
/// vocabulary and document count.
pub fn load_inverted(paths: &StorePaths, model: &VectorModel) -> Result<Option<InvertedIndex>> {
    let path = paths.inverted();
    if !path.is_file() {
        return Ok(None);
    }
    let index: InvertedIndex = bincode::deserialize(&read_bytes(&path)?)?;
    if !index.matches(model.vocabulary(), model.doc_count() as usize) {
        tracing::warn!(dimension = index.dimension, fingerprint = index.fingerprint, "ignoring stale inverted index");
        return Ok(None);
    }
    Ok(Some(index))
}

/// Persist a complete build. Without an index, any previously saved one is removed.
pub fn save_build(
    paths: &StorePaths,
    model: &VectorModel,
    store: &VectorStore,
    index: Option<&InvertedIndex>,
) -> Result<()> {
    save_model(paths, model)?;
    save_store(paths, store)?;
    match index {
        Some(index) => save_inverted(paths, index),
        None => remove_inverted(paths),
    }
}
