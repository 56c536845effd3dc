use std::fs;
use vsm_core::persist::{save_build, save_inverted, save_model, save_store, StorePaths};
use vsm_core::{
    find_similar, Corpus, IndexTerms, InvertedIndex, Preprocessor, SearchSession, VectorModel, VectorStore,
    VsmError,
};

/// Splits on whitespace, nothing else.
struct Whitespace;

impl Preprocessor for Whitespace {
    fn normalize(&self, raw_text: &str) -> Vec<String> {
        raw_text.split_whitespace().map(str::to_lowercase).collect()
    }
}

fn write_corpus(dir: &std::path::Path) {
    fs::write(dir.join("doc1"), "cat cat dog\n").unwrap();
    fs::write(dir.join("doc2"), "dog bird\n").unwrap();
    fs::write(dir.join("doc3"), "cat bird bird\nsecond line is ignored\n").unwrap();
}

fn build(corpus_dir: &std::path::Path) -> (VectorModel, VectorStore) {
    let corpus = Corpus::load(corpus_dir).unwrap();
    let (model, tables) = VectorModel::build(&corpus).unwrap();
    let store = VectorStore::build(&model, &tables, &corpus);
    (model, store)
}

#[test]
fn worked_example_end_to_end() {
    let corpus_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus_dir.path());
    let (model, store) = build(corpus_dir.path());

    assert_eq!(model.dimension(), 3);
    assert_eq!(model.vocabulary().coordinate("bird"), Some(0));
    assert_eq!(model.vocabulary().coordinate("cat"), Some(1));
    assert_eq!(model.vocabulary().coordinate("dog"), Some(2));

    let q = model.vectorize_query(&["cat"]).to_dense();
    let hits = find_similar(&store, &q, 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].doc, "doc1");
    assert_eq!(hits[1].doc, "doc3");
    assert!((hits[0].score - 0.894).abs() < 1e-3);
    assert!((hits[1].score - 0.447).abs() < 1e-3);
}

#[test]
fn session_round_trips_through_store() {
    let corpus_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus_dir.path());
    let (model, store) = build(corpus_dir.path());

    let paths = StorePaths::new(store_dir.path());
    save_model(&paths, &model).unwrap();
    save_store(&paths, &store).unwrap();

    let session = SearchSession::open(&paths, Whitespace).unwrap();
    let exhaustive = session.search("cat", 10).unwrap();
    let indexed = session.search_indexed("CAT").unwrap();
    let a: Vec<&str> = exhaustive.iter().map(|h| h.doc.as_str()).collect();
    let b: Vec<&str> = indexed.iter().map(|h| h.doc.as_str()).collect();
    assert_eq!(a, vec!["doc1", "doc3"]);
    assert_eq!(a, b);
}

#[test]
fn persisted_index_is_reused() {
    let corpus_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus_dir.path());
    let (model, store) = build(corpus_dir.path());

    let paths = StorePaths::new(store_dir.path());
    save_model(&paths, &model).unwrap();
    save_store(&paths, &store).unwrap();
    let index = InvertedIndex::build(&store, model.vocabulary());
    save_inverted(&paths, &index).unwrap();

    let session = SearchSession::open(&paths, Whitespace).unwrap();
    assert_eq!(session.index(), &index);
}

#[test]
fn out_of_vocabulary_query_is_empty_on_both_paths() {
    let corpus_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus_dir.path());
    let (model, store) = build(corpus_dir.path());
    let session = SearchSession::new(model, store, Whitespace);

    assert!(session.search("fish whale", 5).unwrap().is_empty());
    assert!(session.search_indexed("fish whale").unwrap().is_empty());
}

#[test]
fn raw_index_terms_miss_stemmed_forms() {
    // vocabulary holds the stem, the raw query holds the inflected form
    let corpus = Corpus::from_documents(vec![
        ("a", vec!["run".to_string(), "fast".to_string()]),
        ("b", vec!["walk".to_string()]),
    ]);
    let (model, tables) = VectorModel::build(&corpus).unwrap();
    let store = VectorStore::build(&model, &tables, &corpus);

    struct Stem;
    impl Preprocessor for Stem {
        fn normalize(&self, raw_text: &str) -> Vec<String> {
            raw_text
                .split_whitespace()
                .map(|w| w.to_lowercase().trim_end_matches("ning").to_string())
                .collect()
        }
    }

    let raw = SearchSession::new(model.clone(), store.clone(), Stem);
    assert_eq!(raw.search("Running", 5).unwrap().len(), 1);
    assert!(raw.search_indexed("Running").unwrap().is_empty());

    let unified = SearchSession::new(model, store, Stem).index_terms(IndexTerms::Normalized);
    let hits = unified.search_indexed("Running").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc, "a");
}

#[test]
fn empty_corpus_directory_fails_fast() {
    let corpus_dir = tempfile::tempdir().unwrap();
    let corpus = Corpus::load(corpus_dir.path()).unwrap();
    assert!(matches!(VectorModel::build(&corpus), Err(VsmError::EmptyCorpus)));
}

#[test]
fn rebuilt_vocabulary_rejects_old_store() {
    let corpus_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    write_corpus(corpus_dir.path());
    let (model, store) = build(corpus_dir.path());
    let paths = StorePaths::new(store_dir.path());
    save_store(&paths, &store).unwrap();

    // corpus grows a new term, vocabulary no longer matches the saved vectors
    fs::write(corpus_dir.path().join("doc4"), "fish\n").unwrap();
    let (grown, _) = build(corpus_dir.path());
    assert_eq!(grown.dimension(), model.dimension() + 1);
    save_model(&paths, &grown).unwrap();

    assert!(matches!(
        SearchSession::open(&paths, Whitespace),
        Err(VsmError::StaleStore { what: "dimension", expected: 4, found: 3 })
    ));
}

#[test]
fn rebuild_in_place_forgets_deleted_documents() {
    let corpus_dir = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let paths = StorePaths::new(store_dir.path());

    fs::write(corpus_dir.path().join("a"), "cat dog\n").unwrap();
    fs::write(corpus_dir.path().join("b"), "bird dog\n").unwrap();
    fs::write(corpus_dir.path().join("gone"), "bird cat\n").unwrap();
    let (model, store) = build(corpus_dir.path());
    let index = InvertedIndex::build(&store, model.vocabulary());
    save_build(&paths, &model, &store, Some(&index)).unwrap();

    fs::remove_file(corpus_dir.path().join("gone")).unwrap();
    fs::write(corpus_dir.path().join("b"), "bird dog cat\n").unwrap();
    let (model, store) = build(corpus_dir.path());
    save_build(&paths, &model, &store, None).unwrap();

    let session = SearchSession::open(&paths, Whitespace).unwrap();
    let ids: Vec<&str> = session.store().iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["a", "b"]);
    let hits = session.search("bird", 10).unwrap();
    assert!(hits.iter().all(|h| h.doc != "gone"));
    let indexed = session.search_indexed("bird").unwrap();
    assert!(indexed.iter().all(|h| h.doc != "gone"));
}
