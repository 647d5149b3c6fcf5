use crate::catalog::{Catalog, ItemId};
use crate::error::EngineError;
use crate::features::{FeatureBuilder, FeatureVector, Vocabulary};
use crate::query::{self, FilterCriteria, Recommendation};
use crate::similarity::SimilarityIndex;

/// Owned engine state: the catalog snapshot plus the artifacts fitted from
/// it. Constructed explicitly (no module-level globals) and passed by
/// reference to query operations; everything inside is read-only after
/// construction.
#[derive(Debug)]
pub struct Engine {
    catalog: Catalog,
    vocabulary: Option<Vocabulary>,
    index: Option<SimilarityIndex>,
}

impl Engine {
    /// Fit vocabulary and vectors from the catalog.
    pub fn build(catalog: Catalog) -> Result<Self, EngineError> {
        let (vocabulary, vectors) = FeatureBuilder::new().fit(&catalog)?;
        let index = SimilarityIndex::new(&catalog, vectors);
        Ok(Self { catalog, vocabulary: Some(vocabulary), index: Some(index) })
    }

    /// Degraded mode: filtering works, recommendations fall back to catalog
    /// order. Used when fitted artifacts are not available.
    pub fn without_vectors(catalog: Catalog) -> Self {
        Self { catalog, vocabulary: None, index: None }
    }

    /// Assemble an engine from previously saved artifacts. The artifacts must
    /// have been fitted on exactly this catalog snapshot.
    pub fn from_artifacts(
        catalog: Catalog,
        fingerprint: &str,
        vocabulary: Vocabulary,
        vectors: Vec<FeatureVector>,
    ) -> Result<Self, EngineError> {
        let current = catalog.fingerprint();
        if current != fingerprint {
            return Err(EngineError::StaleArtifacts {
                expected: current,
                found: fingerprint.to_string(),
            });
        }
        let index = SimilarityIndex::new(&catalog, vectors);
        Ok(Self { catalog, vocabulary: Some(vocabulary), index: Some(index) })
    }

    /// Replace the snapshot: the complete new artifact set is built before
    /// anything is swapped, so a failed rebuild leaves the engine untouched.
    pub fn rebuild(&mut self, catalog: Catalog) -> Result<(), EngineError> {
        let next = Engine::build(catalog)?;
        *self = next;
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    pub fn vectors(&self) -> Option<&[FeatureVector]> {
        self.index.as_ref().map(|index| index.vectors())
    }

    pub fn index(&self) -> Option<&SimilarityIndex> {
        self.index.as_ref()
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Result<Vec<ItemId>, EngineError> {
        query::filter(&self.catalog, criteria)
    }

    pub fn recommend(
        &self,
        filtered: &[ItemId],
        chosen: ItemId,
        top_n: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        query::recommend(&self.catalog, self.index.as_ref(), filtered, chosen, top_n)
    }
}
