//! Retrieval & Scoring: query construction, vector search adapters,
//! hybrid re-ranking and the ASA random-draw selector.

pub mod asa_selector;
pub mod embeddings;
pub mod query;
pub mod reranker;
pub mod retrieval;
pub mod vector_store;

use thiserror::Error;

pub use asa_selector::{select_asa_example, AsaNoRepeatTracker};
pub use embeddings::{cosine_similarity, CachedEmbedder, EmbeddingConfig, HttpEmbedder};
pub use query::build_query;
pub use reranker::{is_fallback_mode, rerank, RerankContext, ScoredHit};
pub use retrieval::{retrieve, RetrievalInput, RetrievalOutput};
pub use vector_store::{QdrantExampleStore, VectorStoreConfig};

#[derive(Error, Debug)]
pub enum RagError {
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    VectorStore(String),
    #[error("search error: {0}")]
    Search(String),
}

impl From<RagError> for persona_core::Error {
    fn from(err: RagError) -> Self {
        persona_core::Error::Rag(err.to_string())
    }
}
