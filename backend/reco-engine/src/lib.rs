//! Hybrid feed-recommendation core: content similarity, implicit-ALS
//! collaborative filtering and recency-decayed popularity, fused into
//! one diversity-filtered ranking with a cold-start fallback.
//!
//! The crate is deliberately free of HTTP and SQL; hosts feed it
//! [`types::CatalogSnapshot`]s and call [`RecoEngine`] operations.

mod artifacts;
pub mod blend;
pub mod cold_start;
pub mod collaborative;
pub mod content;
pub mod diversity;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod popularity;
pub mod types;

pub use collaborative::CfConfig;
pub use engine::{EngineConfig, EngineStatus, RecoEngine, RecoMode};
pub use error::{EngineError, Result};
pub use types::{
    CatalogSnapshot, Explanation, Interaction, InteractionKind, Item, ItemId, Recommendation,
    ScoredItem, User, UserId,
};
