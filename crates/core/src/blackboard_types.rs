use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInsight {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub data: Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextualPattern {
    pub patterns: Vec<String>,
    pub words: Vec<String>,
    pub structures: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackKnowledge {
    pub good: Vec<String>,
    pub bad: Vec<String>,
    pub avoid: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityGuidance {
    pub guidance: String,
    pub priority: Priority,
    pub source: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesizedKnowledge {
    pub synthesized_knowledge: String,
    pub key_insights: Vec<String>,
    pub actionable_guidance: Vec<String>,
    pub priority_insights: Vec<String>,
}

/// Identifies which analysis agent wrote a given blackboard entry.
/// Using an enum rather than a string key, as spec.md §9 Design Notes
/// recommends ("model it as a struct-of-records keyed by an
/// enum-typed agent identifier").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    Safety,
    Language,
    ContextAnalyst,
    ProfileFilter,
    SituationDetector,
    FakeContextBuilder,
    ConversationFlow,
    Ambiguity,
    Agreement,
    FirstMessage,
    MetaValidator,
    MultiSituation,
    ConversationContextBuilder,
    ContextConnection,
    TrainingSelector,
    StyleAnalyst,
    ExampleIntelligence,
    MeetingResponse,
    LearningIntegrator,
    DeepLearning,
    RuleInterpreter,
    RulesApplicator,
    KnowledgeSynthesizer,
}
