// ============================================
// Content-Based Scorer
// ============================================
//
// Ranks items by cosine similarity between a user's interest tags and
// each item's description embedding, plus a small lexical nudge for
// exact tag overlap.
//
// Data Flow:
//   Items (description) → TextEmbedder → unit row matrix
//   User tags → TextEmbedder → query vector
//   matrix · query (+ 0.05 × tag overlap) → top-k ScoredItem

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::embedding::TextEmbedder;
use crate::error::{EngineError, Result};
use crate::types::{Item, ItemId, ScoredItem};

/// Lexical bonus per exactly-matching comma-separated tag token.
pub const TAG_OVERLAP_BONUS: f64 = 0.05;

/// Frozen content index. Row i of `embeddings` belongs to `item_ids[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentScorer {
    embedder: TextEmbedder,
    item_ids: Vec<ItemId>,
    /// Per-item comma tokens, lowercased, for the overlap bonus.
    item_tag_tokens: Vec<Vec<String>>,
    embeddings: Array2<f32>,
}

impl ContentScorer {
    /// Build the embedding index from every item's description.
    pub fn fit(items: &[Item], dim: usize) -> Result<Self> {
        let documents: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
        let embedder = TextEmbedder::fit(&documents, dim)?;

        let mut embeddings = Array2::<f32>::zeros((items.len(), dim));
        let mut item_ids = Vec::with_capacity(items.len());
        let mut item_tag_tokens = Vec::with_capacity(items.len());

        for (row, item) in items.iter().enumerate() {
            let vector = embedder.embed(&item.description);
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(EngineError::Fit(format!(
                    "non-finite embedding for item {}",
                    item.id
                )));
            }
            embeddings
                .row_mut(row)
                .assign(&Array1::from_vec(vector));
            item_ids.push(item.id);
            item_tag_tokens.push(tag_tokens(&item.tags));
        }

        info!(items = item_ids.len(), dim, "Content embeddings fitted");

        Ok(Self {
            embedder,
            item_ids,
            item_tag_tokens,
            embeddings,
        })
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }

    /// Top-k items by cosine similarity to the query tags. The k winners
    /// are picked on similarity alone, then each gets the tag-overlap
    /// bonus and the list is re-ranked on the final score.
    pub fn score(&self, user_tags: &str, k: usize) -> Vec<ScoredItem> {
        if self.item_ids.is_empty() || k == 0 {
            return Vec::new();
        }

        let query = Array1::from_vec(self.embedder.embed(user_tags));
        let similarities = self.embeddings.dot(&query);

        // Pick the k winners on similarity alone, deterministically.
        let mut rows: Vec<usize> = (0..self.item_ids.len()).collect();
        rows.sort_by(|&a, &b| {
            similarities[b]
                .partial_cmp(&similarities[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| self.item_ids[a].cmp(&self.item_ids[b]))
        });
        rows.truncate(k);

        let user_tokens: HashSet<String> = tag_tokens(user_tags).into_iter().collect();
        let mut scored: Vec<ScoredItem> = rows
            .into_iter()
            .map(|row| {
                let overlap = self.item_tag_tokens[row]
                    .iter()
                    .filter(|token| user_tokens.contains(token.as_str()))
                    .count();
                ScoredItem::new(
                    self.item_ids[row],
                    similarities[row] as f64 + TAG_OVERLAP_BONUS * overlap as f64,
                )
            })
            .collect();
        scored.sort_by(|a, b| a.ranking_cmp(b));
        scored
    }
}

/// Comma-separated tag tokens, trimmed and lowercased.
fn tag_tokens(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: ItemId, description: &str, tags: &str) -> Item {
        Item {
            id,
            title: format!("item {id}"),
            description: description.to_string(),
            tags: tags.to_string(),
            creator_id: 999,
            created_at: Utc::now(),
            likes_count: 0,
            views_count: 0,
            shares_count: 0,
            popularity_score: 0.0,
        }
    }

    #[test]
    fn test_fit_aligns_rows_with_items() {
        let items = vec![
            item(1, "yoga class every morning", "fitness"),
            item(2, "street food festival", "food"),
        ];
        let scorer = ContentScorer::fit(&items, 64).unwrap();
        assert_eq!(scorer.len(), 2);
    }

    #[test]
    fn test_score_prefers_matching_description() {
        let items = vec![
            item(1, "group fitness and yoga in the park", "fitness"),
            item(2, "weekend food market with fresh stalls", "food"),
            item(3, "lost cat spotted near the gate", "pets"),
        ];
        let scorer = ContentScorer::fit(&items, 128).unwrap();

        let ranked = scorer.score("fitness,yoga", 3);
        assert_eq!(ranked[0].item_id, 1);
    }

    #[test]
    fn test_tag_overlap_bonus_breaks_close_calls() {
        // Identical descriptions, only the tag field differs: the item
        // sharing a tag token with the query must come out ahead.
        let items = vec![
            item(1, "community notice board update", "events"),
            item(2, "community notice board update", "food"),
        ];
        let scorer = ContentScorer::fit(&items, 64).unwrap();

        let ranked = scorer.score("food", 2);
        assert_eq!(ranked[0].item_id, 2);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_empty_index_returns_no_results() {
        let scorer = ContentScorer::fit(&[], 64).unwrap();
        assert!(scorer.score("anything", 5).is_empty());
    }

    #[test]
    fn test_equal_scores_order_by_item_id() {
        // Same description and same tags: identical scores, so the
        // lower id must rank first.
        let items = vec![
            item(9, "same text", "same"),
            item(4, "same text", "same"),
        ];
        let scorer = ContentScorer::fit(&items, 64).unwrap();

        let ranked = scorer.score("same", 2);
        assert_eq!(ranked[0].item_id, 4);
        assert_eq!(ranked[1].item_id, 9);
    }
}
