//! Qdrant-backed `VectorSearch` adapter over the training-example
//! collection. Payload carries the full `Example` as JSON so a hit can
//! be deserialized straight back into the shared model.

use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, Condition, FieldCondition, Filter, Match, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder,
};
use qdrant_client::Qdrant;
use std::sync::Arc;

use persona_core::{Embedder, Error, Example, Result, VectorSearch, VectorSearchHit, VectorSearchParams};

#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    pub endpoint: String,
    pub collection: String,
    pub api_key: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:6334".to_string(),
            collection: "training_examples".to_string(),
            api_key: None,
        }
    }
}

pub struct QdrantExampleStore {
    client: Qdrant,
    config: VectorStoreConfig,
    embedder: Arc<dyn Embedder>,
}

impl QdrantExampleStore {
    pub fn connect(config: VectorStoreConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let mut builder = Qdrant::from_url(&config.endpoint);
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(|e| Error::Rag(format!("qdrant connect failed: {e}")))?;
        Ok(Self { client, config, embedder })
    }

    pub async fn upsert(&self, examples: &[Example]) -> Result<()> {
        let mut points = Vec::with_capacity(examples.len());
        for example in examples {
            let Some(id) = &example.id else { continue };
            let vector = self.embedder.embed(&example.customer_message).await?;
            let mut payload = std::collections::HashMap::new();
            payload.insert(
                "example".to_string(),
                qdrant_client::qdrant::Value::from(
                    serde_json::to_string(example).map_err(|e| Error::Rag(e.to_string()))?,
                ),
            );
            if let Some(situation) = &example.situation {
                payload.insert("situation".to_string(), situation.clone().into());
            }
            points.push(PointStruct::new(id.clone(), vector, payload));
        }
        if points.is_empty() {
            return Ok(());
        }
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.config.collection, points))
            .await
            .map_err(|e| Error::Rag(format!("qdrant upsert failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl VectorSearch for QdrantExampleStore {
    async fn search(&self, query_text: &str, params: VectorSearchParams) -> Result<Vec<VectorSearchHit>> {
        let vector = self.embedder.embed(query_text).await?;

        let mut search = SearchPointsBuilder::new(&self.config.collection, vector, params.top_k as u64)
            .with_payload(true)
            .score_threshold(params.min_similarity);

        if let Some(situation) = &params.situation {
            let condition = Condition {
                condition_one_of: Some(qdrant_client::qdrant::condition::ConditionOneOf::Field(
                    FieldCondition {
                        key: "situation".to_string(),
                        r#match: Some(Match {
                            match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Keyword(
                                situation.clone(),
                            )),
                        }),
                        ..Default::default()
                    },
                )),
            };
            search = search.filter(Filter { must: vec![condition], ..Default::default() });
        }

        let response = self
            .client
            .search_points(search)
            .await
            .map_err(|e| Error::Rag(format!("qdrant search failed: {e}")))?;

        let hits = response
            .result
            .into_iter()
            .filter_map(|point| {
                let raw = point.payload.get("example")?;
                let Kind::StringValue(json) = raw.kind.as_ref()? else { return None };
                let example: Example = serde_json::from_str(json).ok()?;
                Some(VectorSearchHit { example, similarity: point.score })
            })
            .collect();

        Ok(hits)
    }
}
