pub mod catalog;
pub mod engine;
pub mod error;
pub mod features;
pub mod persist;
pub mod query;
pub mod similarity;
pub mod tokenizer;

pub use catalog::{Catalog, Item, ItemId};
pub use engine::Engine;
pub use error::EngineError;
pub use features::{FeatureBuilder, FeatureVector, TermId, Vocabulary};
pub use query::{FilterCriteria, Recommendation};
pub use similarity::SimilarityIndex;
