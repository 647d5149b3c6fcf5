use crate::catalog::{Catalog, ItemId};
use crate::error::EngineError;
use crate::features::FeatureVector;
use std::collections::{HashMap, HashSet};

/// Cosine similarity between two sparse vectors sorted by term id. Vectors
/// are pre-normalized at fit time, so this is a merge-join dot product.
/// Zero-magnitude vectors score 0 against everything.
pub fn cosine(a: &FeatureVector, b: &FeatureVector) -> f32 {
    let mut dot = 0.0f32;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0)
}

/// Answers "items similar to X" over the fitted vector set. Read-only after
/// construction; rebuilt together with the vectors when the catalog changes.
#[derive(Debug)]
pub struct SimilarityIndex {
    vectors: Vec<FeatureVector>,
    rows: HashMap<ItemId, usize>,
}

impl SimilarityIndex {
    /// Vectors must be aligned 1:1 with catalog order.
    pub fn new(catalog: &Catalog, vectors: Vec<FeatureVector>) -> Self {
        let rows = catalog
            .items()
            .iter()
            .enumerate()
            .map(|(row, item)| (item.id, row))
            .collect();
        Self { vectors, rows }
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    /// Score one pair of fitted items.
    pub fn score(&self, a: ItemId, b: ItemId) -> Result<f32, EngineError> {
        let ra = *self.rows.get(&a).ok_or(EngineError::UnknownItem(a))?;
        let rb = *self.rows.get(&b).ok_or(EngineError::UnknownItem(b))?;
        Ok(cosine(&self.vectors[ra], &self.vectors[rb]))
    }

    /// Rank `candidate_ids` by similarity to `item_id`, descending, with ties
    /// broken by catalog order. The query item is excluded even if it appears
    /// among the candidates; duplicate and unfitted candidate ids are skipped.
    /// Returns at most `top_n` results as a consuming iterator.
    pub fn similar(
        &self,
        item_id: ItemId,
        candidate_ids: &[ItemId],
        top_n: usize,
    ) -> Result<impl Iterator<Item = (ItemId, f32)> + std::fmt::Debug, EngineError> {
        let query_row = *self
            .rows
            .get(&item_id)
            .ok_or(EngineError::UnknownItem(item_id))?;
        let query = &self.vectors[query_row];

        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut scored: Vec<(usize, ItemId, f32)> = Vec::new();
        for &candidate in candidate_ids {
            if candidate == item_id || !seen.insert(candidate) {
                continue;
            }
            if let Some(&row) = self.rows.get(&candidate) {
                scored.push((row, candidate, cosine(query, &self.vectors[row])));
            }
        }
        scored.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        let top: Vec<(ItemId, f32)> = scored
            .into_iter()
            .take(top_n)
            .map(|(_, id, score)| (id, score))
            .collect();
        Ok(top.into_iter())
    }
}
