//! Core types and traits for the persona reply engine.
//!
//! This crate has no behavior of its own: it carries the request/response
//! DTOs, the training/feedback/learning-statistics data model, the
//! blackboard record shapes, and the capability traits every other crate
//! is written against.

pub mod blackboard_types;
pub mod error;
pub mod example;
pub mod learning;
pub mod profile;
pub mod request;
pub mod response;
pub mod situation;
pub mod traits;

pub use blackboard_types::{
    AgentId, AgentInsight, ContextualPattern, FeedbackKnowledge, Priority, PriorityGuidance,
    SynthesizedKnowledge,
};
pub use error::{Error, Result};
pub use example::{Example, FeedbackData, FeedbackEntry, FeedbackOutcome, TrainingData};
pub use learning::{
    DeepPatterns, DiffPattern, ExamplePerformance, LearningStatistics, MessageStats,
    MessageStatsPositive, ReasoningPrinciple, ResponsePattern, WordScore,
};
pub use profile::{ExtractedUserInfo, ProfileInfo, RulesBundle};
pub use request::{Capabilities, EngineRequest, HistoryMessage, PlatformId, RequestFlags};
pub use response::{EngineResponse, LocationQuestionError, QualityDetails};
pub use situation::{sort_by_priority, Situation};
pub use traits::{
    CityLookup, Directness, Embedder, Formality, ImageAnalysis, ImageAnalyzer,
    InfoMessageClassifier, LlmCompletion, LocationQuestionClassifier, MeetingRequestClassifier,
    Moderation, ModerationResult, VectorSearch, VectorSearchHit, VectorSearchParams,
    WritingStyleAnalyzer, WritingStyleFeatures,
};
