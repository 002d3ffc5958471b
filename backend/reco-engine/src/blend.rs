// ============================================
// Hybrid Blender
// ============================================
//
// Weighted fusion of the three signal rankings into one list:
//   combined = 0.5·content + 0.3·cf + 0.2·popularity

use std::collections::BTreeMap;

use crate::types::{ItemId, ScoredItem};

pub const CONTENT_WEIGHT: f64 = 0.5;
pub const CF_WEIGHT: f64 = 0.3;
pub const POPULARITY_WEIGHT: f64 = 0.2;

/// Fuse candidate sets over the ordered union of their item ids; a
/// source that skipped an item contributes 0. Output is fully ranked:
/// combined score descending, ties by ascending item id.
pub fn fuse(
    content: &[ScoredItem],
    cf: &[ScoredItem],
    popularity: &[ScoredItem],
) -> Vec<ScoredItem> {
    let mut combined: BTreeMap<ItemId, f64> = BTreeMap::new();
    for entry in content {
        *combined.entry(entry.item_id).or_insert(0.0) += CONTENT_WEIGHT * entry.score;
    }
    for entry in cf {
        *combined.entry(entry.item_id).or_insert(0.0) += CF_WEIGHT * entry.score;
    }
    for entry in popularity {
        *combined.entry(entry.item_id).or_insert(0.0) += POPULARITY_WEIGHT * entry.score;
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
    fn test_fusion_applies_the_fixed_weights() {
        let content = vec![ScoredItem::new(1, 0.8)];
        let cf = vec![ScoredItem::new(1, 0.5)];
        let popularity = vec![ScoredItem::new(1, 2.0)];

        let fused = fuse(&content, &cf, &popularity);
        assert_eq!(fused.len(), 1);
        let expected = 0.5 * 0.8 + 0.3 * 0.5 + 0.2 * 2.0;
        assert!((fused[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_missing_sources_default_to_zero() {
        let content = vec![ScoredItem::new(1, 1.0)];
        let popularity = vec![ScoredItem::new(2, 1.0)];

        let fused = fuse(&content, &[], &popularity);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].item_id, 1); // 0.5 beats 0.2
        assert!((fused[0].score - 0.5).abs() < 1e-12);
        assert!((fused[1].score - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_ties_rank_the_lower_item_id_first() {
        let content = vec![ScoredItem::new(42, 1.0), ScoredItem::new(7, 1.0)];

        let fused = fuse(&content, &[], &[]);
        assert_eq!(fused[0].item_id, 7);
        assert_eq!(fused[1].item_id, 42);
    }

    #[test]
    fn test_empty_inputs_fuse_to_empty() {
        assert!(fuse(&[], &[], &[]).is_empty());
    }
}
