use engine::persist::{
    load_artifacts, load_name_index, save_catalog, save_meta, save_name_index, save_vectors,
    save_vocabulary, ArtifactPaths, MetaFile,
};
use engine::{Catalog, Engine, EngineError, Item};
use tempfile::tempdir;

fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        Item { id: 0, name: "Sholay".into(), genre: "Action".into(), language: "Hindi".into(), rating: Some(8.5), year: Some(1975) },
        Item { id: 1, name: "Mughal-E-Azam".into(), genre: "Drama".into(), language: "Hindi".into(), rating: Some(8.2), year: Some(1960) },
        Item { id: 2, name: "Andaz Apna Apna".into(), genre: "Action".into(), language: "Hindi".into(), rating: Some(8.1), year: Some(1994) },
    ])
}

fn save_all(paths: &ArtifactPaths, engine: &Engine) {
    save_catalog(paths, engine.catalog()).unwrap();
    save_vocabulary(paths, engine.vocabulary().unwrap()).unwrap();
    save_vectors(paths, engine.vectors().unwrap()).unwrap();
    save_name_index(paths, &engine.catalog().name_index()).unwrap();
    let meta = MetaFile {
        num_items: engine.catalog().len() as u32,
        fingerprint: engine.catalog().fingerprint(),
        created_at: "2024-01-01T00:00:00Z".into(),
        version: 1,
    };
    save_meta(paths, &meta).unwrap();
}

#[test]
fn artifacts_round_trip_bit_identical() {
    let dir = tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path());
    let engine = Engine::build(sample_catalog()).unwrap();
    save_all(&paths, &engine);

    let (catalog, vocabulary, vectors, meta) = load_artifacts(&paths).unwrap();
    assert_eq!(catalog.items(), engine.catalog().items());
    assert_eq!(&vocabulary, engine.vocabulary().unwrap());
    assert_eq!(vectors.as_slice(), engine.vectors().unwrap());
    assert_eq!(meta.num_items, 3);

    let restored = Engine::from_artifacts(catalog, &meta.fingerprint, vocabulary, vectors).unwrap();
    assert_eq!(restored.vectors().unwrap(), engine.vectors().unwrap());

    let names = load_name_index(&paths).unwrap();
    assert_eq!(names.get("Sholay"), Some(&0));
}

#[test]
fn mismatched_catalog_is_rejected_as_stale() {
    let dir = tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path());
    let engine = Engine::build(sample_catalog()).unwrap();
    save_all(&paths, &engine);

    // Overwrite the stored catalog with a different snapshot: the saved
    // vectors no longer belong to it.
    let other = Catalog::new(vec![Item {
        id: 0,
        name: "Anand".into(),
        genre: "Drama".into(),
        language: "Hindi".into(),
        rating: Some(8.7),
        year: Some(1971),
    }]);
    save_catalog(&paths, &other).unwrap();

    let err = load_artifacts(&paths).unwrap_err();
    assert!(matches!(err, EngineError::StaleArtifacts { .. }));
}

#[test]
fn from_artifacts_checks_the_fingerprint() {
    let engine = Engine::build(sample_catalog()).unwrap();
    let vocabulary = engine.vocabulary().unwrap().clone();
    let vectors = engine.vectors().unwrap().to_vec();
    let err = Engine::from_artifacts(sample_catalog(), "deadbeef", vocabulary, vectors).unwrap_err();
    assert!(matches!(err, EngineError::StaleArtifacts { .. }));
}
