//! Process-wide shared state: the persisted rules/training/learning-stats
//! snapshot, the default capability adapters, the LLM factory and the
//! ASA no-repeat tracker. Built once at startup and cloned cheaply
//! (everything inside is an `Arc`) into every request handler.

use std::sync::Arc;

use persona_config::Settings;
use persona_llm::LlmFactory;
use persona_persistence::{PersistenceStore, StorePaths};
use persona_rag::{AsaNoRepeatTracker, CachedEmbedder, EmbeddingConfig, HttpEmbedder, QdrantExampleStore, VectorStoreConfig};
use persona_tools::{
    KeywordInfoMessageClassifier, KeywordLocationClassifier, KeywordMeetingClassifier, KeywordModeration,
    NullImageAnalyzer, RegexWritingStyleAnalyzer, StaticCityLookup,
};

use persona_core::{Capabilities, Result};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<PersistenceStore>,
    pub llm_factory: Arc<LlmFactory>,
    pub capabilities: Capabilities,
    pub asa_tracker: Arc<AsaNoRepeatTracker>,
}

impl AppState {
    pub async fn build(settings: Settings) -> Result<Self> {
        let paths = StorePaths {
            rules: format!("{}/rules.json", settings.persistence.data_dir),
            training_data: format!("{}/training-data.json", settings.persistence.data_dir),
            feedback: format!("{}/feedback.json", settings.persistence.data_dir),
            learning_stats: format!("{}/learning-stats.json", settings.persistence.data_dir),
            deep_patterns: format!("{}/deep-patterns.json", settings.persistence.data_dir),
        };
        let store = Arc::new(PersistenceStore::load(paths, settings.environment.is_strict()).await?);

        let llm_factory = Arc::new(LlmFactory::new(settings.llm.clone()));

        let embedder: Arc<dyn persona_core::Embedder> = Arc::new(CachedEmbedder::new(
            Arc::new(HttpEmbedder::new(EmbeddingConfig {
                endpoint: settings.rag.embedding_endpoint.clone(),
                api_key: settings.rag.embedding_api_key.clone(),
                ..Default::default()
            })),
            settings.rag.embedding_cache_capacity,
        ));

        let vector_search: Arc<dyn persona_core::VectorSearch> = Arc::new(QdrantExampleStore::connect(
            VectorStoreConfig {
                endpoint: settings.rag.vector_endpoint.clone(),
                collection: settings.rag.collection.clone(),
                api_key: settings.rag.vector_api_key.clone(),
            },
            embedder.clone(),
        )?);

        let capabilities = Capabilities {
            llm: llm_factory.general(),
            embedder,
            vector_search,
            moderation: Arc::new(KeywordModeration),
            image_analyzer: Arc::new(NullImageAnalyzer),
            city_lookup: Arc::new(StaticCityLookup),
            meeting_classifier: Arc::new(KeywordMeetingClassifier),
            location_classifier: Arc::new(KeywordLocationClassifier),
            writing_style: Arc::new(RegexWritingStyleAnalyzer),
            info_message_classifier: Arc::new(KeywordInfoMessageClassifier),
        };

        Ok(Self {
            settings: Arc::new(settings),
            store,
            llm_factory,
            capabilities,
            asa_tracker: Arc::new(AsaNoRepeatTracker::new()),
        })
    }
}
