//! OpenAI-compatible embeddings client, wrapped in a process-wide bounded
//! LRU cache. The embedding provider itself is an external collaborator;
//! this is the default adapter that satisfies `persona_core::Embedder`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use persona_core::{Embedder, Error, Result};

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponseItem {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedResponseItem>,
}

pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest { model: &self.config.model, input: text };
        let mut req = self
            .client
            .post(format!("{}/embeddings", self.config.endpoint))
            .json(&request);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(|e| Error::Rag(format!("embedding request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(Error::Rag(format!("embedding request failed: {}", resp.status())));
        }
        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| Error::Rag(format!("invalid embedding response: {e}")))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Rag("empty embedding response".to_string()))
    }
}

/// Process-wide, append-only cache in front of any `Embedder`. Keyed by
/// the raw text; callers that need query-vs-document distinctions should
/// prefix the text before calling `embed`.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self { inner, cache: Mutex::new(LruCache::new(capacity)) }
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.cache.lock().get(text) {
            return Ok(hit.clone());
        }
        let vector = self.inner.embed(text).await?;
        self.cache.lock().put(text.to_string(), vector.clone());
        Ok(vector)
    }
}

/// Cosine similarity between two equal-length vectors. Returns 0.0 for
/// mismatched lengths or zero-norm vectors rather than panicking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[tokio::test]
    async fn cached_embedder_reuses_inner_result() {
        struct CountingEmbedder {
            calls: std::sync::atomic::AtomicUsize,
        }

        #[async_trait]
        impl Embedder for CountingEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(vec![1.0, 0.0])
            }
        }

        let inner = Arc::new(CountingEmbedder { calls: std::sync::atomic::AtomicUsize::new(0) });
        let cached = CachedEmbedder::new(inner.clone(), 8);
        cached.embed("hallo").await.unwrap();
        cached.embed("hallo").await.unwrap();
        assert_eq!(inner.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
