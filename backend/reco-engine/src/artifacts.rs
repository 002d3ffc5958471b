// ============================================
// Model Artifacts
// ============================================
//
// File-per-part layout under one directory:
//   manifest.json   – format version, fitted_at, snapshot counts
//   content.bin     – content scorer (bincode)
//   cf.bin          – factor model (bincode)
//   popularity.bin  – popularity index (bincode)
//   catalog.bin     – item snapshot (bincode)
//
// No bit-layout contract beyond "load returns what save was given".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::engine::EngineState;
use crate::error::{EngineError, Result};
use crate::types::{Item, ItemId};

const MANIFEST_FILE: &str = "manifest.json";
const CONTENT_FILE: &str = "content.bin";
const CF_FILE: &str = "cf.bin";
const POPULARITY_FILE: &str = "popularity.bin";
const CATALOG_FILE: &str = "catalog.bin";

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    fitted_at: DateTime<Utc>,
    interaction_count: usize,
    item_count: usize,
}

pub(crate) fn save_to_dir(state: &EngineState, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    let manifest = Manifest {
        version: FORMAT_VERSION,
        fitted_at: state.fitted_at,
        interaction_count: state.interaction_count,
        item_count: state.catalog.len(),
    };
    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_vec_pretty(&manifest)?,
    )?;
    fs::write(dir.join(CONTENT_FILE), bincode::serialize(&state.content)?)?;
    fs::write(dir.join(CF_FILE), bincode::serialize(&state.cf)?)?;
    fs::write(
        dir.join(POPULARITY_FILE),
        bincode::serialize(&state.popularity)?,
    )?;
    fs::write(dir.join(CATALOG_FILE), bincode::serialize(&state.catalog)?)?;

    info!(dir = %dir.display(), items = manifest.item_count, "Engine artifacts saved");
    Ok(())
}

pub(crate) fn load_from_dir(dir: &Path) -> Result<EngineState> {
    let manifest: Manifest = serde_json::from_slice(&read(dir, MANIFEST_FILE)?)?;
    if manifest.version != FORMAT_VERSION {
        return Err(EngineError::Artifact(format!(
            "unsupported artifact version {}",
            manifest.version
        )));
    }

    let content = bincode::deserialize(&read(dir, CONTENT_FILE)?)?;
    let cf = bincode::deserialize(&read(dir, CF_FILE)?)?;
    let popularity = bincode::deserialize(&read(dir, POPULARITY_FILE)?)?;
    let catalog: HashMap<ItemId, Item> = bincode::deserialize(&read(dir, CATALOG_FILE)?)?;

    info!(dir = %dir.display(), items = catalog.len(), "Engine artifacts loaded");

    Ok(EngineState {
        content,
        cf,
        popularity,
        catalog,
        fitted_at: manifest.fitted_at,
        interaction_count: manifest.interaction_count,
    })
}

fn read(dir: &Path, file: &str) -> Result<Vec<u8>> {
    let path = dir.join(file);
    fs::read(&path).map_err(|err| EngineError::Artifact(format!("{}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, RecoEngine, RecoMode};
    use crate::types::{CatalogSnapshot, Interaction, InteractionKind, User};
    use chrono::Duration;

    fn snapshot() -> CatalogSnapshot {
        let now = Utc::now();
        CatalogSnapshot {
            items: vec![
                Item {
                    id: 1,
                    title: "yoga".into(),
                    description: "yoga class in the park".into(),
                    tags: "fitness".into(),
                    creator_id: 100,
                    created_at: now - Duration::days(2),
                    likes_count: 0,
                    views_count: 0,
                    shares_count: 0,
                    popularity_score: 0.0,
                },
                Item {
                    id: 2,
                    title: "market".into(),
                    description: "food market this weekend".into(),
                    tags: "food".into(),
                    creator_id: 101,
                    created_at: now - Duration::days(5),
                    likes_count: 0,
                    views_count: 0,
                    shares_count: 0,
                    popularity_score: 0.0,
                },
            ],
            interactions: vec![Interaction {
                id: 1,
                user_id: 50,
                item_id: 1,
                kind: InteractionKind::Like,
                timestamp: now,
            }],
        }
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            embedding_dim: 32,
            cf: crate::collaborative::CfConfig {
                factors: 4,
                iterations: 3,
                ..Default::default()
            },
        }
    }

    fn test_user(id: i64) -> User {
        User {
            id,
            name: "tester".into(),
            community: "Block B".into(),
            tags: "food".into(),
            signup_date: Utc::now(),
        }
    }

    #[test]
    fn test_artifacts_round_trip_the_scoring_state() {
        let engine = RecoEngine::new(test_config());
        engine.fit(&snapshot(), Utc::now()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        engine.save_to_dir(dir.path()).unwrap();

        let restored = RecoEngine::load_from_dir(dir.path(), test_config()).unwrap();
        assert_eq!(restored.fitted_at(), engine.fitted_at());
        assert_eq!(restored.interaction_count(), engine.interaction_count());
        assert_eq!(restored.knows_user(50).unwrap(), true);

        let before = engine
            .recommend(&test_user(999), 2, RecoMode::ColdStart)
            .unwrap();
        let after = restored
            .recommend(&test_user(999), 2, RecoMode::ColdStart)
            .unwrap();
        assert_eq!(before.len(), after.len());
        for (x, y) in before.iter().zip(after.iter()) {
            assert_eq!(x.item_id, y.item_id);
            assert_eq!(x.score, y.score);
        }
    }

    #[test]
    fn test_missing_artifact_files_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::Artifact(_)));
    }
}
