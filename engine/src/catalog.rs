use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;

pub type ItemId = u32;

/// One cleaned movie record. `rating` and `year` are `None` when the source
/// value could not be coerced to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub genre: String,
    pub language: String,
    pub rating: Option<f32>,
    pub year: Option<i32>,
}

/// Ordered, immutable snapshot of the cleaned movie table. Ids are assigned
/// densely in load order and are the only key the similarity index understands
/// (names are not guaranteed unique).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    by_id: HashMap<ItemId, usize>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        let by_id = items.iter().enumerate().map(|(pos, it)| (it.id, pos)).collect();
        Self { items, by_id }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.by_id.get(&id).map(|&pos| &self.items[pos])
    }

    /// Position of an item in catalog order; used for deterministic tie-breaks.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Name -> id lookup for the presentation layer; first occurrence wins when
    /// names collide.
    pub fn name_index(&self) -> HashMap<String, ItemId> {
        let mut index = HashMap::with_capacity(self.items.len());
        for item in &self.items {
            index.entry(item.name.clone()).or_insert(item.id);
        }
        index
    }

    /// Snapshot identity: sha1 over a canonical byte encoding of every row.
    /// Persisted artifacts are keyed to this digest so loading them against a
    /// different catalog fails instead of silently serving stale results.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha1::new();
        for item in &self.items {
            hasher.update(item.id.to_le_bytes());
            hasher.update(item.name.as_bytes());
            hasher.update([0]);
            hasher.update(item.genre.as_bytes());
            hasher.update([0]);
            hasher.update(item.language.as_bytes());
            hasher.update([0]);
            match item.rating {
                Some(r) => hasher.update(r.to_le_bytes()),
                None => hasher.update([0xff]),
            }
            match item.year {
                Some(y) => hasher.update(y.to_le_bytes()),
                None => hasher.update([0xff]),
            }
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}
