// ============================================
// Popularity Scorer
// ============================================
//
// Community-wide popularity over one snapshot: each log row adds its
// kind's canonical weight to the item, then a recency term boosts
// newer content. Always a full recompute, never incremental.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::types::{Interaction, Item, ItemId, ScoredItem};

/// Popularity scores for one catalog snapshot plus the full ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityIndex {
    scores: HashMap<ItemId, f64>,
    ranked: Vec<ScoredItem>,
}

impl PopularityIndex {
    /// Full pass over the catalog and log. Every known item starts at
    /// 0, each interaction adds `InteractionKind::weight()`, then each
    /// item gets `1 / (1 + days_since_created)` with negative ages
    /// clamped to 0. Idempotent for a fixed `now`.
    pub fn compute(items: &[Item], interactions: &[Interaction], now: DateTime<Utc>) -> Self {
        let mut scores: HashMap<ItemId, f64> = items.iter().map(|i| (i.id, 0.0)).collect();

        let mut skipped = 0usize;
        for interaction in interactions {
            match scores.get_mut(&interaction.item_id) {
                Some(score) => *score += interaction.kind.weight(),
                None => skipped += 1, // item no longer in the catalog
            }
        }
        if skipped > 0 {
            debug!(skipped, "Interactions referenced items missing from the catalog");
        }

        for item in items {
            let days = (now - item.created_at).num_days().max(0) as f64;
            if let Some(score) = scores.get_mut(&item.id) {
                *score += 1.0 / (1.0 + days);
            }
        }

        let mut ranked: Vec<ScoredItem> = scores
            .iter()
            .map(|(&item_id, &score)| ScoredItem::new(item_id, score))
            .collect();
        ranked.sort_by(|a, b| a.ranking_cmp(b));

        info!(items = ranked.len(), "Popularity recomputed");

        Self { scores, ranked }
    }

    pub fn score(&self, item_id: ItemId) -> f64 {
        self.scores.get(&item_id).copied().unwrap_or(0.0)
    }

    /// Full map, consumed by the explain path.
    pub fn scores(&self) -> &HashMap<ItemId, f64> {
        &self.scores
    }

    /// Top-k slice of the precomputed full ranking.
    pub fn top(&self, k: usize) -> Vec<ScoredItem> {
        self.ranked.iter().take(k).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InteractionKind;
    use chrono::Duration;

    fn item(id: ItemId, created_days_ago: i64, now: DateTime<Utc>) -> Item {
        Item {
            id,
            title: format!("item {id}"),
            description: String::new(),
            tags: String::new(),
            creator_id: 1,
            created_at: now - Duration::days(created_days_ago),
            likes_count: 0,
            views_count: 0,
            shares_count: 0,
            popularity_score: 0.0,
        }
    }

    fn interaction(item_id: ItemId, kind: InteractionKind, now: DateTime<Utc>) -> Interaction {
        Interaction {
            id: 0,
            user_id: 7,
            item_id,
            kind,
            timestamp: now,
        }
    }

    #[test]
    fn test_weights_follow_the_canonical_table() {
        let now = Utc::now();
        let items = vec![item(1, 10, now), item(2, 10, now)];
        let log = vec![
            interaction(1, InteractionKind::Like, now),
            interaction(1, InteractionKind::View, now),
            interaction(1, InteractionKind::Share, now),
        ];

        let index = PopularityIndex::compute(&items, &log, now);
        // Both items share the same recency term, so the gap is exactly
        // the weighted interaction mass.
        let gap = index.score(1) - index.score(2);
        assert!((gap - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_recency_is_strictly_monotonic_at_zero_interactions() {
        let now = Utc::now();
        let items = vec![item(1, 1, now), item(2, 10, now)];

        let index = PopularityIndex::compute(&items, &[], now);
        assert!(index.score(1) > index.score(2));
    }

    #[test]
    fn test_future_created_at_clamps_to_full_recency() {
        let now = Utc::now();
        let items = vec![item(1, -5, now)];

        let index = PopularityIndex::compute(&items, &[], now);
        assert!((index.score(1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_item_interactions_are_skipped() {
        let now = Utc::now();
        let items = vec![item(1, 10, now)];
        let log = vec![interaction(999, InteractionKind::Like, now)];

        let index = PopularityIndex::compute(&items, &log, now);
        assert_eq!(index.len(), 1);
        assert_eq!(index.score(999), 0.0);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let now = Utc::now();
        let items = vec![item(3, 4, now), item(1, 2, now), item(2, 2, now)];
        let log = vec![
            interaction(1, InteractionKind::Like, now),
            interaction(2, InteractionKind::Like, now),
        ];

        let a = PopularityIndex::compute(&items, &log, now);
        let b = PopularityIndex::compute(&items, &log, now);
        assert_eq!(a.top(3), b.top(3));
    }

    #[test]
    fn test_top_breaks_ties_by_ascending_id() {
        let now = Utc::now();
        // Same age, no interactions: identical scores.
        let items = vec![item(9, 5, now), item(2, 5, now), item(5, 5, now)];

        let index = PopularityIndex::compute(&items, &[], now);
        let ids: Vec<ItemId> = index.top(3).iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
