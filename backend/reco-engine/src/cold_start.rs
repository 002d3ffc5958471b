// ============================================
// Cold-Start Strategy
// ============================================
//
// Fallback ranking for users the factor model has never seen: raw
// popularity and content scores merged without fusion weights. The
// orchestrator runs the merged list through the diversity filter like
// any other ranking.

use std::collections::BTreeMap;

use crate::types::{ItemId, ScoredItem};

/// Candidates fetched from each source before merging.
pub const CANDIDATE_POOL: usize = 50;

/// Merge the two source rankings on raw scores. Popularity enters
/// first; the content score replaces it when both sources carry the
/// same item.
pub fn merge(popular: &[ScoredItem], content: &[ScoredItem]) -> Vec<ScoredItem> {
    let mut combined: BTreeMap<ItemId, f64> = BTreeMap::new();
    for entry in popular {
        combined.insert(entry.item_id, entry.score);
    }
    for entry in content {
        combined.insert(entry.item_id, entry.score);
    }

    let mut ranked: Vec<ScoredItem> = combined
        .into_iter()
        .map(|(item_id, score)| ScoredItem::new(item_id, score))
        .collect();
    ranked.sort_by(|a, b| a.ranking_cmp(b));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_score_wins_on_conflict() {
        let popular = vec![ScoredItem::new(1, 3.0)];
        let content = vec![ScoredItem::new(1, 0.9)];

        let merged = merge(&popular, &content);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score, 0.9);
    }

    #[test]
    fn test_merge_keeps_both_sources() {
        let popular = vec![ScoredItem::new(1, 3.0), ScoredItem::new(2, 2.0)];
        let content = vec![ScoredItem::new(3, 0.9)];

        let merged = merge(&popular, &content);
        let ids: Vec<ItemId> = merged.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![1, 2, 3]); // 3.0, 2.0, 0.9
    }

    #[test]
    fn test_ranking_is_deterministic_on_ties() {
        let popular = vec![ScoredItem::new(9, 1.0), ScoredItem::new(4, 1.0)];

        let merged = merge(&popular, &[]);
        let ids: Vec<ItemId> = merged.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![4, 9]);
    }
}
