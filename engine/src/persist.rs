use crate::catalog::{Catalog, Item, ItemId};
use crate::error::EngineError;
use crate::features::{FeatureVector, Vocabulary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_items: u32,
    /// Catalog snapshot digest the artifacts were fitted on.
    pub fingerprint: String,
    pub created_at: String,
    pub version: u32,
}

pub struct ArtifactPaths {
    pub root: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn catalog(&self) -> PathBuf { self.root.join("catalog.bin") }
    fn vocabulary(&self) -> PathBuf { self.root.join("vocabulary.bin") }
    fn vectors(&self) -> PathBuf { self.root.join("vectors.bin") }
    fn name_index(&self) -> PathBuf { self.root.join("name_index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn write_bin<T: Serialize>(path: PathBuf, value: &T) -> Result<(), EngineError> {
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: for<'de> Deserialize<'de>>(path: PathBuf) -> Result<T, EngineError> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_catalog(paths: &ArtifactPaths, catalog: &Catalog) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    write_bin(paths.catalog(), &catalog.items().to_vec())
}

pub fn load_catalog(paths: &ArtifactPaths) -> Result<Catalog, EngineError> {
    let items: Vec<Item> = read_bin(paths.catalog())?;
    Ok(Catalog::new(items))
}

pub fn save_vocabulary(paths: &ArtifactPaths, vocabulary: &Vocabulary) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    write_bin(paths.vocabulary(), vocabulary)
}

pub fn load_vocabulary(paths: &ArtifactPaths) -> Result<Vocabulary, EngineError> {
    read_bin(paths.vocabulary())
}

pub fn save_vectors(paths: &ArtifactPaths, vectors: &[FeatureVector]) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    write_bin(paths.vectors(), &vectors.to_vec())
}

pub fn load_vectors(paths: &ArtifactPaths) -> Result<Vec<FeatureVector>, EngineError> {
    read_bin(paths.vectors())
}

pub fn save_name_index(paths: &ArtifactPaths, index: &HashMap<String, ItemId>) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    write_bin(paths.name_index(), index)
}

pub fn load_name_index(paths: &ArtifactPaths) -> Result<HashMap<String, ItemId>, EngineError> {
    read_bin(paths.name_index())
}

pub fn save_meta(paths: &ArtifactPaths, meta: &MetaFile) -> Result<(), EngineError> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &ArtifactPaths) -> Result<MetaFile, EngineError> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    Ok(serde_json::from_str(&buf)?)
}

/// Load everything a query session needs: catalog, vocabulary, vectors and
/// meta. Fails with `StaleArtifacts` when the stored catalog no longer
/// matches the fingerprint the artifacts were fitted on (mixed or partially
/// replaced artifact directories).
pub fn load_artifacts(
    paths: &ArtifactPaths,
) -> Result<(Catalog, Vocabulary, Vec<FeatureVector>, MetaFile), EngineError> {
    let catalog = load_catalog(paths)?;
    let vocabulary = load_vocabulary(paths)?;
    let vectors = load_vectors(paths)?;
    let meta = load_meta(paths)?;
    let current = catalog.fingerprint();
    if current != meta.fingerprint {
        return Err(EngineError::StaleArtifacts {
            expected: current,
            found: meta.fingerprint,
        });
    }
    tracing::debug!(num_items = meta.num_items, version = meta.version, "artifacts loaded");
    Ok((catalog, vocabulary, vectors, meta))
}
