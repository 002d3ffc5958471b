// ============================================
// Text Embedding (hashed TF-IDF)
// ============================================
//
// Deterministic replacement for a hosted sentence-encoder: tokens are
// hashed into a fixed number of buckets with a keyed SipHash, weighted
// by TF x smoothed IDF over the fitted corpus, and L2-normalized.
//
// Data Flow:
//   Item descriptions → token DF counts → IDF table
//   Any text → TF counts → weighted buckets → unit vector

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::error::{EngineError, Result};

// Fixed hash keys so embeddings are stable across processes.
const HASH_KEY_0: u64 = 0x7265636f5f656e67;
const HASH_KEY_1: u64 = 0x626c6f636b666565;

/// IDF applied to query tokens never seen during fit.
const UNSEEN_TOKEN_IDF: f32 = 1.0;

/// Deterministic text embedder shared by the item index and query side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextEmbedder {
    dim: usize,
    /// token → smoothed inverse document frequency over the fit corpus
    idf: HashMap<String, f32>,
}

impl TextEmbedder {
    /// Fit the IDF table over a corpus of documents.
    pub fn fit<S: AsRef<str>>(documents: &[S], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(EngineError::Fit("embedding dimension is zero".into()));
        }

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let distinct: HashSet<String> = tokenize(doc.as_ref()).collect();
            for token in distinct {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n_docs = documents.len() as f32;
        let idf = document_frequency
            .into_iter()
            .map(|(token, df)| {
                let value = ((1.0 + n_docs) / (1.0 + df as f32)).ln() + 1.0;
                (token, value)
            })
            .collect();

        Ok(Self { dim, idf })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed one text into a unit vector. Texts with no tokens embed to
    /// the zero vector (cosine 0 against everything), never an error.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut term_frequency: HashMap<String, f32> = HashMap::new();
        for token in tokenize(text) {
            *term_frequency.entry(token).or_insert(0.0) += 1.0;
        }

        let mut vector = vec![0.0f32; self.dim];
        for (token, tf) in term_frequency {
            let idf = self.idf.get(&token).copied().unwrap_or(UNSEEN_TOKEN_IDF);
            let bucket = self.bucket(&token);
            vector[bucket] += tf * idf;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        hasher.write(token.as_bytes());
        (hasher.finish() % self.dim as u64) as usize
    }
}

/// Lowercased alphanumeric runs; everything else is a separator.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_deterministic() {
        let docs = ["morning run in the park", "street food market"];
        let embedder = TextEmbedder::fit(&docs, 64).unwrap();

        let a = embedder.embed("park run");
        let b = embedder.embed("park run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_embedding_is_unit_norm() {
        let docs = ["yoga and fitness tips", "community movie night"];
        let embedder = TextEmbedder::fit(&docs, 64).unwrap();

        let v = embedder.embed("fitness tips");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let docs = ["something"];
        let embedder = TextEmbedder::fit(&docs, 32).unwrap();

        let v = embedder.embed("   ,,, ");
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_similar_texts_score_higher_than_unrelated() {
        let docs = [
            "group fitness session at the gym",
            "fresh food stalls this weekend",
            "lost cat near block c",
        ];
        let embedder = TextEmbedder::fit(&docs, 128).unwrap();

        let query = embedder.embed("fitness gym session");
        let fitness = embedder.embed(docs[0]);
        let pets = embedder.embed(docs[2]);

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&query, &fitness) > dot(&query, &pets));
    }

    #[test]
    fn test_zero_dim_is_a_fit_error() {
        let docs = ["text"];
        assert!(TextEmbedder::fit(&docs, 0).is_err());
    }
}
