//! In-memory embedding cache keyed by content hash and embedder id.
//!
//! Advisory only: a poisoned lock or a miss simply means the inner
//! embedder is asked again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::debug;

use figurag_core::error::Result;
use figurag_core::traits::Embedder;

pub struct CachedEmbedder {
    inner: Box<dyn Embedder>,
    entries: RwLock<HashMap<String, Vec<f32>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CachedEmbedder {
    pub fn new(inner: Box<dyn Embedder>) -> Self {
        Self { inner, entries: RwLock::new(HashMap::new()), hits: AtomicUsize::new(0), misses: AtomicUsize::new(0) }
    }

    pub fn content_hash(&self, text: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.inner.id().as_bytes());
        hasher.update(&[0]);
        hasher.update(text.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// (hits, misses) since construction.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Embedder for CachedEmbedder {
    fn id(&self) -> &str { self.inner.id() }
    fn dim(&self) -> usize { self.inner.dim() }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let hashes: Vec<String> = texts.iter().map(|t| self.content_hash(t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = match self.entries.read() {
            Ok(map) => hashes.iter().map(|h| map.get(h).cloned()).collect(),
            Err(_) => vec![None; texts.len()],
        };

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();
        self.hits.fetch_add(texts.len() - missing.len(), Ordering::Relaxed);
        self.misses.fetch_add(missing.len(), Ordering::Relaxed);
        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self.inner.embed_batch(&batch)?;
            if fresh.len() != batch.len() {
                return Err(figurag_core::Error::MalformedResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    fresh.len()
                )));
            }
            if let Ok(mut map) = self.entries.write() {
                for (&i, v) in missing.iter().zip(&fresh) {
                    map.insert(hashes[i].clone(), v.clone());
                }
            }
            for (i, v) in missing.into_iter().zip(fresh) {
                out[i] = Some(v);
            }
            debug!(embedder = self.inner.id(), computed = batch.len(), "Embedding cache filled");
        }
        Ok(out.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::HashEmbedder;

    #[test]
    fn second_lookup_hits_the_cache() {
        let cached = CachedEmbedder::new(Box::new(HashEmbedder::new(32)));
        let texts = vec!["生存曲线".to_string(), "火山图".to_string()];
        let first = cached.embed_batch(&texts).unwrap();
        let second = cached.embed_batch(&texts).unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.stats(), (2, 2));
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn key_depends_on_embedder() {
        let a = CachedEmbedder::new(Box::new(HashEmbedder::new(32)));
        let b = CachedEmbedder::new(Box::new(HashEmbedder::new(64)));
        assert_ne!(a.content_hash("PCA"), b.content_hash("PCA"));
    }
}
