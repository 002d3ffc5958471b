use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable integer identifiers used across the catalog tables.
pub type UserId = i64;
pub type ItemId = i64;

/// Interaction kinds accepted by the feedback endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    View,
    Share,
}

impl InteractionKind {
    /// Canonical popularity weight for this kind. The batch popularity
    /// pass and the live feedback path share this table.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Like => 1.0,
            Self::View => 0.5,
            Self::Share => 0.2,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Like => "like",
            Self::View => "view",
            Self::Share => "share",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(Self::Like),
            "view" => Some(Self::View),
            "share" => Some(Self::Share),
            _ => None,
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resident of one of the community blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub community: String,
    /// Comma-joined interest terms, e.g. "fitness,park".
    pub tags: String,
    pub signup_date: DateTime<Utc>,
}

/// A feed item posted by a community member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Source text for the content embedding.
    pub description: String,
    /// Comma-joined tags; moderation labels ("spam", "low-quality")
    /// arrive through the same field.
    pub tags: String,
    pub creator_id: UserId,
    pub created_at: DateTime<Utc>,
    pub likes_count: i32,
    pub views_count: i32,
    pub shares_count: i32,
    pub popularity_score: f64,
}

/// One row of the append-only interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub kind: InteractionKind,
    pub timestamp: DateTime<Utc>,
}

/// Everything a fit reads, captured in one pass from the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub items: Vec<Item>,
    pub interactions: Vec<Interaction>,
}

/// One catalog item and its raw score, before enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item_id: ItemId, score: f64) -> Self {
        Self { item_id, score }
    }

    /// Total order used everywhere a ranking is produced: score
    /// descending, ties broken by ascending item id. Fits reject
    /// non-finite scores, so NaN never reaches a ranking.
    pub fn ranking_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| self.item_id.cmp(&other.item_id))
    }
}

/// Final ranked entry returned by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub score: f64,
    pub reason: String,
}

/// Ranked entry carrying one human-readable reason per signal that
/// contributed to its score.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub item_id: ItemId,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_kind_weights() {
        assert_eq!(InteractionKind::Like.weight(), 1.0);
        assert_eq!(InteractionKind::View.weight(), 0.5);
        assert_eq!(InteractionKind::Share.weight(), 0.2);
    }

    #[test]
    fn test_interaction_kind_parse_roundtrip() {
        for kind in [
            InteractionKind::Like,
            InteractionKind::View,
            InteractionKind::Share,
        ] {
            assert_eq!(InteractionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(InteractionKind::parse("bookmark"), None);
    }

    #[test]
    fn test_ranking_cmp_orders_by_score_then_id() {
        let mut scored = vec![
            ScoredItem::new(7, 0.5),
            ScoredItem::new(3, 0.9),
            ScoredItem::new(5, 0.5),
        ];
        scored.sort_by(|a, b| a.ranking_cmp(b));

        let ids: Vec<i64> = scored.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![3, 5, 7]); // 0.9 first, then equal scores by id
    }
}
