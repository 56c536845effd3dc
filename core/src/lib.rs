//! TF-IDF vector-space retrieval: vocabulary, frequency tables, weighting,
//! dense document vectors, cosine ranking and an inverted index for
//! candidate-restricted search.

pub mod corpus;
pub mod error;
pub mod frequency;
pub mod index;
pub mod model;
pub mod persist;
pub mod preprocess;
pub mod ranker;
pub mod session;
pub mod store;
pub mod vocabulary;
pub mod weighting;

pub use corpus::{Corpus, DocId, Document};
pub use error::{Result, VsmError};
pub use frequency::{DocFrequencies, FrequencyTables};
pub use index::InvertedIndex;
pub use model::{QueryVector, VectorModel};
pub use preprocess::{Preprocessor, StandardPreprocessor};
pub use ranker::{cosine, find_similar, ScoredDoc};
pub use session::{IndexTerms, SearchSession};
pub use store::VectorStore;
pub use vocabulary::{TermId, Vocabulary};
pub use weighting::Weighting;
