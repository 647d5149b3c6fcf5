use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::tokenizer::{signature, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type TermId = u32;

/// Vocabulary cap; terms beyond this are dropped by ascending corpus frequency.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Fitted term dictionary with per-term document frequencies. Only valid
/// against the catalog snapshot it was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub num_items: u32,
}

/// Sparse L2-normalized tf-idf vector, sorted by term id. One per item,
/// aligned 1:1 with catalog order. Empty when no signature term survived the
/// vocabulary.
pub type FeatureVector = Vec<(TermId, f32)>;

/// Fits a tf-idf representation over the whole catalog. Fitting is
/// deterministic: the same catalog (same items, same order) reproduces the
/// same vocabulary and bit-identical vectors.
pub struct FeatureBuilder {
    max_features: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self { max_features: DEFAULT_MAX_FEATURES }
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Fit the vocabulary and produce one vector per item in catalog order.
    /// Does not mutate the catalog.
    pub fn fit(&self, catalog: &Catalog) -> Result<(Vocabulary, Vec<FeatureVector>), EngineError> {
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let token_lists: Vec<Vec<String>> = catalog
            .items()
            .iter()
            .map(|item| tokenize(&signature(item)))
            .collect();

        // Corpus frequency and document frequency per term.
        let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
        for tokens in &token_lists {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens {
                let entry = counts.entry(token.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(token.as_str()) {
                    entry.1 += 1;
                }
            }
        }

        // Cap the vocabulary at max_features by descending corpus frequency,
        // ties broken lexicographically so the cut is reproducible.
        let mut terms: Vec<(&str, u32, u32)> = counts
            .into_iter()
            .map(|(term, (corpus, df))| (term, corpus, df))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(self.max_features);

        // Term ids are assigned in sorted-term order, independent of hash order.
        terms.sort_by(|a, b| a.0.cmp(b.0));
        let mut dictionary = HashMap::with_capacity(terms.len());
        let mut df = Vec::with_capacity(terms.len());
        for (term_id, (term, _corpus, df_t)) in terms.iter().enumerate() {
            dictionary.insert((*term).to_string(), term_id as TermId);
            df.push(*df_t);
        }

        let n = catalog.len() as f32;
        let mut vectors = Vec::with_capacity(token_lists.len());
        for tokens in &token_lists {
            let mut tf: HashMap<TermId, u32> = HashMap::new();
            for token in tokens {
                if let Some(&term_id) = dictionary.get(token.as_str()) {
                    *tf.entry(term_id).or_insert(0) += 1;
                }
            }
            let mut vector: FeatureVector = tf
                .into_iter()
                .map(|(term_id, tf_raw)| {
                    let tf_w = 1.0 + (tf_raw as f32).ln();
                    let idf = (n / df[term_id as usize].max(1) as f32).ln();
                    (term_id, tf_w * idf)
                })
                .collect();
            vector.sort_by_key(|&(term_id, _)| term_id);
            let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for (_, w) in vector.iter_mut() {
                    *w /= norm;
                }
            }
            vectors.push(vector);
        }

        let vocabulary = Vocabulary { dictionary, df, num_items: catalog.len() as u32 };
        tracing::debug!(
            num_items = vocabulary.num_items,
            terms = vocabulary.dictionary.len(),
            "fitted vocabulary"
        );
        Ok((vocabulary, vectors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Item { id: 0, name: "Sholay".into(), genre: "Action".into(), language: "Hindi".into(), rating: Some(8.5), year: Some(1975) },
            Item { id: 1, name: "Deewaar".into(), genre: "Action".into(), language: "Hindi".into(), rating: Some(8.0), year: Some(1975) },
            Item { id: 2, name: "Anand".into(), genre: "Drama".into(), language: "Hindi".into(), rating: Some(8.7), year: Some(1971) },
        ])
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let err = FeatureBuilder::new().fit(&Catalog::default()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyCatalog));
    }

    #[test]
    fn one_vector_per_item_in_order() {
        let (vocabulary, vectors) = FeatureBuilder::new().fit(&catalog()).unwrap();
        assert_eq!(vectors.len(), 3);
        assert_eq!(vocabulary.num_items, 3);
        assert!(vocabulary.dictionary.contains_key("action"));
        assert!(vocabulary.dictionary.contains_key("drama"));
    }

    #[test]
    fn vectors_are_l2_normalized() {
        let (_, vectors) = FeatureBuilder::new().fit(&catalog()).unwrap();
        for vector in &vectors {
            if vector.iter().any(|&(_, w)| w != 0.0) {
                let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
                assert!((norm - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn max_features_caps_the_vocabulary() {
        let (vocabulary, _) = FeatureBuilder::new()
            .with_max_features(2)
            .fit(&catalog())
            .unwrap();
        assert!(vocabulary.dictionary.len() <= 2);
        assert_eq!(vocabulary.dictionary.len(), vocabulary.df.len());
    }
}
