// ============================================
// Recommendation Engine (orchestrator)
// ============================================
//
// Owns the frozen per-snapshot state bundle and exposes the scoring
// operations. Lifecycle is Uninitialized → Fitting → Ready with no way
// back; rebuilds go through `refresh`, which assembles a complete new
// state off to the side and swaps it in one atomic publish, so readers
// never observe a half-built index.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::artifacts;
use crate::blend;
use crate::cold_start;
use crate::collaborative::{CfConfig, CfModel};
use crate::content::ContentScorer;
use crate::diversity::DiversityFilter;
use crate::error::{EngineError, Result};
use crate::popularity::PopularityIndex;
use crate::types::{
    CatalogSnapshot, Explanation, Item, ItemId, Recommendation, ScoredItem, User, UserId,
};

const REASON_HYBRID: &str = "recommended for you";
const REASON_COLD_START: &str = "popular or matches interests";
const EXPLAIN_CONTENT: &str = "Matches your interests (content-based)";
const EXPLAIN_CF: &str = "Liked by similar users (collaborative filtering)";

/// Engine lifecycle, observable by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Uninitialized,
    Fitting,
    Ready,
}

/// Which ranking path to take for a user. The host picks ColdStart for
/// users the factor model has never seen (`knows_user`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoMode {
    Hybrid,
    ColdStart,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineConfig {
    pub embedding_dim: usize,
    pub cf: CfConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 256,
            cf: CfConfig::default(),
        }
    }
}

/// Everything scoring reads, built by one fit and never mutated.
#[derive(Debug)]
pub(crate) struct EngineState {
    pub(crate) content: ContentScorer,
    pub(crate) cf: CfModel,
    pub(crate) popularity: PopularityIndex,
    pub(crate) catalog: HashMap<ItemId, Item>,
    pub(crate) fitted_at: DateTime<Utc>,
    pub(crate) interaction_count: usize,
}

enum Inner {
    Uninitialized,
    Fitting,
    Ready(Arc<EngineState>),
}

pub struct RecoEngine {
    inner: RwLock<Inner>,
    diversity: DiversityFilter,
    config: EngineConfig,
}

impl RecoEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::Uninitialized),
            diversity: DiversityFilter::new(),
            config,
        }
    }

    /// Restore a previously trained engine from an artifact directory.
    pub fn load_from_dir(dir: &Path, config: EngineConfig) -> Result<Self> {
        let state = artifacts::load_from_dir(dir)?;
        Ok(Self {
            inner: RwLock::new(Inner::Ready(Arc::new(state))),
            diversity: DiversityFilter::new(),
            config,
        })
    }

    /// Persist the current state bundle to an artifact directory.
    pub fn save_to_dir(&self, dir: &Path) -> Result<()> {
        let state = self.state()?;
        artifacts::save_to_dir(&state, dir)
    }

    pub fn status(&self) -> EngineStatus {
        match *self.inner.read() {
            Inner::Uninitialized => EngineStatus::Uninitialized,
            Inner::Fitting => EngineStatus::Fitting,
            Inner::Ready(_) => EngineStatus::Ready,
        }
    }

    /// First and only fit. Runs the three model builds sequentially and
    /// publishes one complete state; any stage error leaves the engine
    /// Uninitialized, never partially Ready.
    pub fn fit(&self, snapshot: &CatalogSnapshot, now: DateTime<Utc>) -> Result<()> {
        {
            let mut inner = self.inner.write();
            match *inner {
                Inner::Uninitialized => *inner = Inner::Fitting,
                Inner::Fitting | Inner::Ready(_) => return Err(EngineError::AlreadyFitted),
            }
        }

        match Self::build_state(snapshot, now, &self.config) {
            Ok(state) => {
                *self.inner.write() = Inner::Ready(Arc::new(state));
                Ok(())
            }
            Err(err) => {
                *self.inner.write() = Inner::Uninitialized;
                Err(err)
            }
        }
    }

    /// Rebuild from a fresh snapshot. The new state is assembled while
    /// readers keep scoring against the old one; the swap itself is a
    /// single pointer store. A build failure keeps the old state.
    pub fn refresh(&self, snapshot: &CatalogSnapshot, now: DateTime<Utc>) -> Result<()> {
        self.state()?; // refresh only makes sense once Ready

        let state = Self::build_state(snapshot, now, &self.config)?;
        *self.inner.write() = Inner::Ready(Arc::new(state));
        Ok(())
    }

    fn build_state(
        snapshot: &CatalogSnapshot,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Result<EngineState> {
        let started = std::time::Instant::now();

        let content = ContentScorer::fit(&snapshot.items, config.embedding_dim)?;
        let popularity = PopularityIndex::compute(&snapshot.items, &snapshot.interactions, now);
        let cf = CfModel::fit(&snapshot.interactions, config.cf)?;

        let catalog: HashMap<ItemId, Item> = snapshot
            .items
            .iter()
            .map(|item| (item.id, item.clone()))
            .collect();

        info!(
            items = snapshot.items.len(),
            interactions = snapshot.interactions.len(),
            known_users = cf.user_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Engine state built"
        );

        Ok(EngineState {
            content,
            cf,
            popularity,
            catalog,
            fitted_at: now,
            interaction_count: snapshot.interactions.len(),
        })
    }

    pub(crate) fn state(&self) -> Result<Arc<EngineState>> {
        match &*self.inner.read() {
            Inner::Ready(state) => Ok(Arc::clone(state)),
            _ => Err(EngineError::NotReady),
        }
    }

    /// Whether the factor model saw this user at fit time. Hosts use it
    /// to route between Hybrid and ColdStart.
    pub fn knows_user(&self, user_id: UserId) -> Result<bool> {
        Ok(self.state()?.cf.knows_user(user_id))
    }

    pub fn fitted_at(&self) -> Option<DateTime<Utc>> {
        self.state().ok().map(|s| s.fitted_at)
    }

    /// Size of the interaction snapshot behind the current state; the
    /// refresh policy compares it against the live log.
    pub fn interaction_count(&self) -> Option<usize> {
        self.state().ok().map(|s| s.interaction_count)
    }

    pub fn item_count(&self) -> Option<usize> {
        self.state().ok().map(|s| s.catalog.len())
    }

    /// Ranked, diversity-filtered recommendations for one user.
    pub fn recommend(&self, user: &User, k: usize, mode: RecoMode) -> Result<Vec<Recommendation>> {
        let state = self.state()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let (picked, reason) = match mode {
            RecoMode::Hybrid => {
                let pool = 2 * k;
                let content = state.content.score(&user.tags, pool);
                let cf = state.cf.recommend(user.id, pool);
                let popular = state.popularity.top(pool);
                let fused = blend::fuse(&content, &cf, &popular);
                let picked = self.diversity.select(&fused, user.id, k, &state.catalog);
                (picked, REASON_HYBRID)
            }
            RecoMode::ColdStart => {
                let popular = state.popularity.top(cold_start::CANDIDATE_POOL);
                let content = state.content.score(&user.tags, cold_start::CANDIDATE_POOL);
                let merged = cold_start::merge(&popular, &content);
                let picked = self.diversity.select(&merged, user.id, k, &state.catalog);
                (picked, REASON_COLD_START)
            }
        };

        Ok(picked
            .into_iter()
            .map(|s| Recommendation {
                item_id: s.item_id,
                score: s.score,
                reason: reason.to_string(),
            })
            .collect())
    }

    /// Top-k fused ranking with one reason per signal that carried the
    /// item. Popularity covers the whole catalog here, not a slice.
    pub fn explain(&self, user: &User, k: usize) -> Result<Vec<Explanation>> {
        let state = self.state()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let pool = 2 * k;
        let content = state.content.score(&user.tags, pool);
        let cf = state.cf.recommend(user.id, pool);
        let popular_all: Vec<ScoredItem> = state
            .popularity
            .scores()
            .iter()
            .map(|(&item_id, &score)| ScoredItem::new(item_id, score))
            .collect();

        let fused = blend::fuse(&content, &cf, &popular_all);

        let content_ids: HashSet<ItemId> = content.iter().map(|s| s.item_id).collect();
        let cf_ids: HashSet<ItemId> = cf.iter().map(|s| s.item_id).collect();

        Ok(fused
            .into_iter()
            .take(k)
            .map(|s| {
                let mut reasons = Vec::new();
                if content_ids.contains(&s.item_id) {
                    reasons.push(EXPLAIN_CONTENT.to_string());
                }
                if cf_ids.contains(&s.item_id) {
                    reasons.push(EXPLAIN_CF.to_string());
                }
                if let Some(pop) = state.popularity.scores().get(&s.item_id) {
                    reasons.push(format!(
                        "Popular in community/block (popularity={pop:.2})"
                    ));
                }
                Explanation {
                    item_id: s.item_id,
                    score: s.score,
                    reasons,
                }
            })
            .collect())
    }
}
