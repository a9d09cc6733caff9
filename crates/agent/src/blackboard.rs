//! Shared Blackboard (C1): the request-scoped mutable store every agent
//! publishes findings to. A new request gets a freshly reset blackboard
//! (spec.md §3 invariant); nothing here is shared across requests.

use std::sync::Arc;

use parking_lot::RwLock;

use persona_core::{
    AgentId, AgentInsight, ContextualPattern, FeedbackKnowledge, LearningStatistics, Priority,
    PriorityGuidance, SynthesizedKnowledge,
};

#[derive(Default)]
struct BlackboardState {
    agent_insights: std::collections::HashMap<AgentId, AgentInsight>,
    contextual_patterns: std::collections::HashMap<String, ContextualPattern>,
    feedback_knowledge: std::collections::HashMap<String, FeedbackKnowledge>,
    priority_guidance: Vec<PriorityGuidance>,
    learning_stats: Option<Arc<LearningStatistics>>,
    synthesized_knowledge: Option<SynthesizedKnowledge>,
}

/// Request-scoped shared store (spec.md §4.1). Cheap to clone (an
/// `Arc<RwLock<..>>` underneath) so every agent task can hold its own
/// handle without lifetime gymnastics across `tokio::spawn`.
#[derive(Clone, Default)]
pub struct Blackboard {
    state: Arc<RwLock<BlackboardState>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, agent: AgentId, insights: Vec<String>, recommendations: Vec<String>, data: serde_json::Value) {
        let entry = AgentInsight { insights, recommendations, data, timestamp: chrono::Utc::now() };
        self.state.write().agent_insights.insert(agent, entry);
    }

    /// Reads the result an agent itself finalized. Never returns a
    /// partial/stale read (spec.md §3 invariant): this is the same value
    /// `write` stored, or `None` if that agent hasn't run yet in this
    /// request.
    pub fn read(&self, agent: AgentId) -> Option<AgentInsight> {
        self.state.read().agent_insights.get(&agent).cloned()
    }

    pub fn read_all(&self) -> std::collections::HashMap<AgentId, AgentInsight> {
        self.state.read().agent_insights.clone()
    }

    pub fn add_priority(&self, guidance: impl Into<String>, priority: Priority, source: impl Into<String>) {
        let mut state = self.state.write();
        state.priority_guidance.push(PriorityGuidance {
            guidance: guidance.into(),
            priority,
            source: source.into(),
            timestamp: chrono::Utc::now(),
        });
        state.priority_guidance.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Always returns guidance in descending priority order (spec.md §4.1).
    pub fn get_priority(&self, filter: Option<Priority>) -> Vec<PriorityGuidance> {
        let state = self.state.read();
        state
            .priority_guidance
            .iter()
            .filter(|g| filter.map(|f| g.priority == f).unwrap_or(true))
            .cloned()
            .collect()
    }

    pub fn add_contextual_pattern(&self, situation: impl Into<String>, value: impl Into<String>, kind: PatternKind) {
        let mut state = self.state.write();
        let entry = state.contextual_patterns.entry(situation.into()).or_default();
        match kind {
            PatternKind::Pattern => entry.patterns.push(value.into()),
            PatternKind::Word => entry.words.push(value.into()),
            PatternKind::Structure => entry.structures.push(value.into()),
        }
    }

    pub fn contextual_patterns(&self) -> std::collections::HashMap<String, ContextualPattern> {
        self.state.read().contextual_patterns.clone()
    }

    pub fn add_feedback(&self, situation: impl Into<String>, value: impl Into<String>, kind: FeedbackKind) {
        let mut state = self.state.write();
        let entry = state.feedback_knowledge.entry(situation.into()).or_default();
        match kind {
            FeedbackKind::Good => entry.good.push(value.into()),
            FeedbackKind::Bad => entry.bad.push(value.into()),
            FeedbackKind::Avoid => entry.avoid.push(value.into()),
        }
    }

    pub fn feedback_knowledge(&self) -> std::collections::HashMap<String, FeedbackKnowledge> {
        self.state.read().feedback_knowledge.clone()
    }

    pub fn set_learning_stats(&self, stats: Arc<LearningStatistics>) {
        self.state.write().learning_stats = Some(stats);
    }

    pub fn get_learning_stats(&self) -> Option<Arc<LearningStatistics>> {
        self.state.read().learning_stats.clone()
    }

    pub fn set_synthesized(&self, knowledge: SynthesizedKnowledge) {
        self.state.write().synthesized_knowledge = Some(knowledge);
    }

    pub fn get_synthesized(&self) -> Option<SynthesizedKnowledge> {
        self.state.read().synthesized_knowledge.clone()
    }
}

pub enum PatternKind {
    Pattern,
    Word,
    Structure,
}

pub enum FeedbackKind {
    Good,
    Bad,
    Avoid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_guidance_is_returned_descending() {
        let bb = Blackboard::new();
        bb.add_priority("low thing", Priority::Low, "test");
        bb.add_priority("high thing", Priority::High, "test");
        bb.add_priority("medium thing", Priority::Medium, "test");
        let guidance = bb.get_priority(None);
        assert_eq!(guidance[0].priority, Priority::High);
        assert_eq!(guidance[1].priority, Priority::Medium);
        assert_eq!(guidance[2].priority, Priority::Low);
    }

    #[test]
    fn unread_agent_returns_none() {
        let bb = Blackboard::new();
        assert!(bb.read(AgentId::StyleAnalyst).is_none());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let bb = Blackboard::new();
        bb.write(AgentId::ContextAnalyst, vec!["insight".to_string()], vec![], serde_json::json!({"topic": "hobby"}));
        let read = bb.read(AgentId::ContextAnalyst).unwrap();
        assert_eq!(read.insights, vec!["insight".to_string()]);
        assert_eq!(read.data["topic"], "hobby");
    }
}
