use crate::catalog::{Catalog, ItemId};
use crate::error::EngineError;
use crate::similarity::SimilarityIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Facet filters over the catalog. Every field is optional (absent = no
/// constraint) and all supplied constraints are conjunctive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub genres: Option<HashSet<String>>,
    pub languages: Option<HashSet<String>>,
    pub min_rating: Option<f32>,
    pub year_range: Option<(i32, i32)>,
}

impl FilterCriteria {
    pub fn validate(&self) -> Result<(), EngineError> {
        if let Some(rating) = self.min_rating {
            if !(0.0..=10.0).contains(&rating) {
                return Err(EngineError::InvalidFilterRange(format!(
                    "min_rating {rating} outside 0..=10"
                )));
            }
        }
        if let Some((min_year, max_year)) = self.year_range {
            if min_year > max_year {
                return Err(EngineError::InvalidFilterRange(format!(
                    "min_year {min_year} > max_year {max_year}"
                )));
            }
        }
        Ok(())
    }

    /// Items with a missing rating or year cannot satisfy a numeric
    /// constraint, so they drop out once one is supplied.
    pub fn matches(&self, item: &crate::catalog::Item) -> bool {
        if let Some(genres) = &self.genres {
            if !genres.contains(&item.genre) {
                return false;
            }
        }
        if let Some(languages) = &self.languages {
            if !languages.contains(&item.language) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            match item.rating {
                Some(rating) if rating >= min_rating => {}
                _ => return false,
            }
        }
        if let Some((min_year, max_year)) = self.year_range {
            match item.year {
                Some(year) if (min_year..=max_year).contains(&year) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Apply the criteria to the catalog. The result is an ordered subsequence of
/// the catalog (original order preserved); an empty result is a normal
/// outcome. The catalog itself is never mutated.
pub fn filter(catalog: &Catalog, criteria: &FilterCriteria) -> Result<Vec<ItemId>, EngineError> {
    criteria.validate()?;
    Ok(catalog
        .items()
        .iter()
        .filter(|item| criteria.matches(item))
        .map(|item| item.id)
        .collect())
}

/// One ranked recommendation, carrying the display fields alongside the score.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: ItemId,
    pub name: String,
    pub genre: String,
    pub language: String,
    pub rating: Option<f32>,
    pub score: f32,
}

/// Rank the chosen item's same-genre peers within the filtered set by vector
/// similarity. When no index is available (degraded mode) candidates keep
/// catalog order with score 0. An empty result means "no recommendations",
/// which is a normal outcome distinct from the `EmptyFilteredSet` precondition.
pub fn recommend(
    catalog: &Catalog,
    index: Option<&SimilarityIndex>,
    filtered: &[ItemId],
    chosen: ItemId,
    top_n: usize,
) -> Result<Vec<Recommendation>, EngineError> {
    if filtered.is_empty() {
        return Err(EngineError::EmptyFilteredSet);
    }
    if !filtered.contains(&chosen) {
        return Err(EngineError::UnknownItem(chosen));
    }
    let chosen_item = catalog.get(chosen).ok_or(EngineError::UnknownItem(chosen))?;

    let candidates: Vec<ItemId> = filtered
        .iter()
        .copied()
        .filter(|&id| id != chosen)
        .filter(|&id| catalog.get(id).map(|it| it.genre == chosen_item.genre).unwrap_or(false))
        .collect();

    let ranked: Vec<(ItemId, f32)> = match index {
        Some(index) => index.similar(chosen, &candidates, top_n)?.collect(),
        None => candidates.into_iter().take(top_n).map(|id| (id, 0.0)).collect(),
    };

    Ok(ranked
        .into_iter()
        .filter_map(|(id, score)| {
            catalog.get(id).map(|item| Recommendation {
                id,
                name: item.name.clone(),
                genre: item.genre.clone(),
                language: item.language.clone(),
                rating: item.rating,
                score,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_rating_out_of_range_is_rejected() {
        let criteria = FilterCriteria { min_rating: Some(11.0), ..Default::default() };
        assert!(matches!(
            criteria.validate(),
            Err(EngineError::InvalidFilterRange(_))
        ));
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let criteria = FilterCriteria { year_range: Some((2000, 1990)), ..Default::default() };
        assert!(matches!(
            criteria.validate(),
            Err(EngineError::InvalidFilterRange(_))
        ));
    }
}
