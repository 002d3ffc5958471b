// ============================================
// Collaborative Scorer (implicit ALS)
// ============================================
//
// Learns latent user/item factors from the raw interaction log using
// alternating least squares with the implicit-feedback confidence
// weighting (Hu/Koren): confidence = 1 + alpha * count.
//
// Data Flow:
//   Interaction log → frozen id→index maps → sparse counts
//   counts → ALS (seeded init, alternating Cholesky solves) → factors
//   user factors · item factors → FactorHit → ScoredItem

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::types::{Interaction, ItemId, ScoredItem, UserId};

/// Hyperparameters for the implicit-feedback factorization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CfConfig {
    pub factors: usize,
    pub iterations: usize,
    pub regularization: f32,
    /// Confidence scaling: confidence = 1 + alpha * count.
    pub alpha: f32,
    /// Declared model seed; the only randomness in the whole fit.
    pub seed: u64,
}

impl Default for CfConfig {
    fn default() -> Self {
        Self {
            factors: 50,
            iterations: 10,
            regularization: 0.01,
            alpha: 40.0,
            seed: 42,
        }
    }
}

/// Raw factor-space hit. `item_index` is validated against the frozen
/// item list before it is mapped back to a catalog id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorHit {
    pub item_index: usize,
    pub score: f64,
}

/// Frozen latent-factor model over one interaction-log snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfModel {
    /// index → id, in first-appearance order over the log.
    user_ids: Vec<UserId>,
    item_ids: Vec<ItemId>,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<ItemId, usize>,
    user_factors: Array2<f32>,
    item_factors: Array2<f32>,
    config: CfConfig,
}

impl CfModel {
    /// Train the factorization over the raw interaction log. Ids are
    /// frozen in first-appearance order; each log row contributes one
    /// unit of weight regardless of kind, repeated rows accumulate.
    pub fn fit(interactions: &[Interaction], config: CfConfig) -> Result<Self> {
        let mut user_ids: Vec<UserId> = Vec::new();
        let mut item_ids: Vec<ItemId> = Vec::new();
        let mut user_index: HashMap<UserId, usize> = HashMap::new();
        let mut item_index: HashMap<ItemId, usize> = HashMap::new();
        let mut counts: HashMap<(usize, usize), f32> = HashMap::new();

        for interaction in interactions {
            let u = *user_index.entry(interaction.user_id).or_insert_with(|| {
                user_ids.push(interaction.user_id);
                user_ids.len() - 1
            });
            let i = *item_index.entry(interaction.item_id).or_insert_with(|| {
                item_ids.push(interaction.item_id);
                item_ids.len() - 1
            });
            *counts.entry((u, i)).or_insert(0.0) += 1.0;
        }

        let n_users = user_ids.len();
        let n_items = item_ids.len();
        let f = config.factors;

        if n_users == 0 || n_items == 0 {
            // Empty log: nothing to learn, every user routes to cold start.
            return Ok(Self {
                user_ids,
                item_ids,
                user_index,
                item_index,
                user_factors: Array2::zeros((0, f)),
                item_factors: Array2::zeros((0, f)),
                config,
            });
        }

        // Adjacency in both directions, sorted so the solve order (and
        // therefore float accumulation) is identical across runs.
        let mut entries: Vec<((usize, usize), f32)> = counts.into_iter().collect();
        entries.sort_by_key(|&((u, i), _)| (u, i));

        let mut by_user: Vec<Vec<(usize, f32)>> = vec![Vec::new(); n_users];
        let mut by_item: Vec<Vec<(usize, f32)>> = vec![Vec::new(); n_items];
        for ((u, i), count) in entries {
            by_user[u].push((i, count));
            by_item[i].push((u, count));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut user_factors = Array2::from_shape_fn((n_users, f), |_| rng.gen::<f32>() * 0.01);
        let mut item_factors = Array2::from_shape_fn((n_items, f), |_| rng.gen::<f32>() * 0.01);

        for _ in 0..config.iterations {
            solve_side(&mut user_factors, &item_factors, &by_user, &config)?;
            solve_side(&mut item_factors, &user_factors, &by_item, &config)?;
        }

        if user_factors
            .iter()
            .chain(item_factors.iter())
            .any(|v| !v.is_finite())
        {
            return Err(EngineError::Fit(
                "factorization produced non-finite factors".into(),
            ));
        }

        info!(
            users = n_users,
            items = n_items,
            factors = f,
            iterations = config.iterations,
            "Collaborative model fitted"
        );

        Ok(Self {
            user_ids,
            item_ids,
            user_index,
            item_index,
            user_factors,
            item_factors,
            config,
        })
    }

    /// Top-k items by predicted affinity. Unknown users get an empty
    /// list; that is the cold-start trigger, not an error.
    pub fn recommend(&self, user_id: UserId, k: usize) -> Vec<ScoredItem> {
        let row = match self.user_index.get(&user_id) {
            Some(&row) => row,
            None => return Vec::new(),
        };
        if k == 0 {
            return Vec::new();
        }

        let affinities = self.item_factors.dot(&self.user_factors.row(row));
        let hits: Vec<FactorHit> = affinities
            .iter()
            .enumerate()
            .map(|(item_index, &score)| FactorHit {
                item_index,
                score: score as f64,
            })
            .collect();

        let mut scored = self.resolve(hits);
        scored.sort_by(|a, b| a.ranking_cmp(b));
        scored.truncate(k);
        scored
    }

    /// Map factor-space hits back to catalog ids, dropping any whose
    /// index falls outside the frozen item list.
    fn resolve(&self, hits: Vec<FactorHit>) -> Vec<ScoredItem> {
        hits.into_iter()
            .filter_map(|hit| match self.item_ids.get(hit.item_index) {
                Some(&item_id) => Some(ScoredItem::new(item_id, hit.score)),
                None => {
                    warn!(
                        item_index = hit.item_index,
                        "Factor hit outside the frozen item list"
                    );
                    None
                }
            })
            .collect()
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn user_count(&self) -> usize {
        self.user_ids.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }
}

/// One ALS half-step: re-solve every row of `target` holding `fixed`
/// constant. Normal equations per Hu/Koren implicit feedback:
///   (FᵀF + λI + Σ α·c · f fᵀ) x = Σ (1 + α·c) · f
fn solve_side(
    target: &mut Array2<f32>,
    fixed: &Array2<f32>,
    adjacency: &[Vec<(usize, f32)>],
    config: &CfConfig,
) -> Result<()> {
    let f = config.factors;
    let gram = fixed.t().dot(fixed);

    for (row, entries) in adjacency.iter().enumerate() {
        let mut a = gram.clone();
        for d in 0..f {
            a[[d, d]] += config.regularization;
        }
        let mut b = Array1::<f32>::zeros(f);

        for &(other, count) in entries {
            let confidence = config.alpha * count;
            let factors = fixed.row(other);
            for d1 in 0..f {
                b[d1] += (1.0 + confidence) * factors[d1];
                for d2 in 0..f {
                    a[[d1, d2]] += confidence * factors[d1] * factors[d2];
                }
            }
        }

        let solved = cholesky_solve(&a, &b).ok_or_else(|| {
            EngineError::Fit("factorization system is not positive definite".into())
        })?;
        target.row_mut(row).assign(&solved);
    }

    Ok(())
}

/// Solve A x = b for symmetric positive-definite A via Cholesky.
/// Returns None when the decomposition breaks down.
fn cholesky_solve(a: &Array2<f32>, b: &Array1<f32>) -> Option<Array1<f32>> {
    let n = a.nrows();
    let mut l = Array2::<f32>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[[i, j]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = Array1::<f32>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }

    // Back substitution: Lᵀ x = y
    let mut x = Array1::<f32>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Some(x)
}
