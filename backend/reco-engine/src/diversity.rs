// ============================================
// Diversity Filter
// ============================================
//
// Ordered walk over a ranked candidate list, applied after fusion and
// before truncation: drops moderation-flagged items, the requesting
// user's own items, and anything past the per-creator cap.

use std::collections::HashMap;

use crate::types::{Item, ItemId, ScoredItem, UserId};

/// How many accepted items one creator may hold in a single response.
pub const MAX_PER_CREATOR: usize = 2;

/// Tag-field values moderation uses to flag an item as unsafe. The
/// whole field must match, case-insensitively; "spam,food" stays
/// eligible.
const BLOCKED_TAGS: [&str; 2] = ["spam", "low-quality"];

#[derive(Debug, Clone)]
pub struct DiversityFilter {
    max_per_creator: usize,
}

impl Default for DiversityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiversityFilter {
    pub fn new() -> Self {
        Self {
            max_per_creator: MAX_PER_CREATOR,
        }
    }

    pub fn with_creator_limit(max_per_creator: usize) -> Self {
        Self { max_per_creator }
    }

    /// Walk `ranked` in order and keep the first `k` eligible entries.
    /// Candidates missing from the catalog are skipped silently.
    pub fn select(
        &self,
        ranked: &[ScoredItem],
        viewer: UserId,
        k: usize,
        catalog: &HashMap<ItemId, Item>,
    ) -> Vec<ScoredItem> {
        let mut creator_counts: HashMap<UserId, usize> = HashMap::new();
        let mut selected = Vec::with_capacity(k.min(ranked.len()));

        for candidate in ranked {
            if selected.len() >= k {
                break;
            }
            let item = match catalog.get(&candidate.item_id) {
                Some(item) => item,
                None => continue,
            };
            if is_blocked(&item.tags) {
                continue;
            }
            if item.creator_id == viewer {
                continue;
            }
            let count = creator_counts.entry(item.creator_id).or_insert(0);
            if *count >= self.max_per_creator {
                continue;
            }
            *count += 1;
            selected.push(*candidate);
        }

        selected
    }
}

fn is_blocked(tags: &str) -> bool {
    let lowered = tags.to_lowercase();
    BLOCKED_TAGS.iter().any(|blocked| lowered == *blocked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: ItemId, creator_id: UserId, tags: &str) -> Item {
        Item {
            id,
            title: format!("item {id}"),
            description: String::new(),
            tags: tags.to_string(),
            creator_id,
            created_at: Utc::now(),
            likes_count: 0,
            views_count: 0,
            shares_count: 0,
            popularity_score: 0.0,
        }
    }

    fn catalog(items: Vec<Item>) -> HashMap<ItemId, Item> {
        items.into_iter().map(|i| (i.id, i)).collect()
    }

    fn ranked(ids: &[ItemId]) -> Vec<ScoredItem> {
        ids.iter()
            .enumerate()
            .map(|(rank, &id)| ScoredItem::new(id, 1.0 - rank as f64 * 0.1))
            .collect()
    }

    #[test]
    fn test_flagged_tags_are_rejected_case_insensitively() {
        let catalog = catalog(vec![
            item(1, 10, "Spam"),
            item(2, 10, "LOW-QUALITY"),
            item(3, 10, "food"),
        ]);
        let picked = DiversityFilter::new().select(&ranked(&[1, 2, 3]), 99, 3, &catalog);

        let ids: Vec<ItemId> = picked.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_multi_tag_fields_are_not_flagged() {
        // Whole-field match only: a tag list containing "spam" among
        // others stays eligible.
        let catalog = catalog(vec![item(1, 10, "spam,food")]);
        let picked = DiversityFilter::new().select(&ranked(&[1]), 99, 1, &catalog);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn test_own_items_never_surface() {
        let catalog = catalog(vec![item(1, 42, "food"), item(2, 10, "food")]);
        let picked = DiversityFilter::new().select(&ranked(&[1, 2]), 42, 2, &catalog);

        let ids: Vec<ItemId> = picked.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_creator_cap_keeps_at_most_two() {
        let catalog = catalog(vec![
            item(1, 10, "food"),
            item(2, 10, "food"),
            item(3, 10, "food"),
            item(4, 10, "food"),
            item(5, 20, "food"),
        ]);
        let picked = DiversityFilter::new().select(&ranked(&[1, 2, 3, 4, 5]), 99, 5, &catalog);

        let from_creator_10 = picked
            .iter()
            .filter(|s| catalog[&s.item_id].creator_id == 10)
            .count();
        assert_eq!(from_creator_10, 2);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_walk_stops_at_k_accepted() {
        let catalog = catalog(vec![
            item(1, 10, "food"),
            item(2, 20, "food"),
            item(3, 30, "food"),
        ]);
        let picked = DiversityFilter::new().select(&ranked(&[1, 2, 3]), 99, 2, &catalog);

        let ids: Vec<ItemId> = picked.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![1, 2]); // best-ranked eligible entries win
    }

    #[test]
    fn test_candidates_missing_from_catalog_are_skipped() {
        let catalog = catalog(vec![item(2, 10, "food")]);
        let picked = DiversityFilter::new().select(&ranked(&[1, 2]), 99, 2, &catalog);

        let ids: Vec<ItemId> = picked.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![2]);
    }
}
