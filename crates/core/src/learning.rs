use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordScore {
    pub good: u32,
    pub bad: u32,
}

impl WordScore {
    pub fn ratio(&self) -> f32 {
        let total = self.good + self.bad;
        if total == 0 {
            0.5
        } else {
            self.good as f32 / total as f32
        }
    }

    pub fn total(&self) -> u32 {
        self.good + self.bad
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsePattern {
    pub situation: String,
    pub good_response: String,
    pub success_count: u32,
    pub fail_count: u32,
}

impl ResponsePattern {
    pub fn success_rate(&self) -> f32 {
        let total = self.success_count + self.fail_count;
        if total == 0 {
            0.5
        } else {
            self.success_count as f32 / total as f32
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningPrinciple {
    pub situation: String,
    pub principle: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffPattern {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamplePerformance {
    pub good: u32,
    pub bad: u32,
}

impl ExamplePerformance {
    pub fn total(&self) -> u32 {
        self.good + self.bad
    }

    /// Default-neutral: a sparse lookup with no data is a success rate of
    /// 0.5, so downstream hybrid scoring is a total function (spec.md §9).
    pub fn success_rate(&self) -> f32 {
        if self.total() == 0 {
            0.5
        } else {
            self.good as f32 / self.total() as f32
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageStatsPositive {
    pub count: u32,
    pub median_length: u32,
    pub median_questions: u32,
    pub median_exclamation_marks: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageStats {
    pub positive: MessageStatsPositive,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepPatterns {
    pub patterns: serde_json::Value,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

/// Derived, cached learning statistics (spec.md §3). Sparse two-key maps
/// are modeled with nested `HashMap`s and default-neutral accessors so
/// lookups never need special-case handling for missing keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningStatistics {
    /// situation -> word -> {good, bad}
    pub word_frequencies: HashMap<String, HashMap<String, WordScore>>,
    pub response_patterns: Vec<ResponsePattern>,
    pub reasoning_principles: Vec<ReasoningPrinciple>,
    /// situation -> diff pattern
    pub diff_patterns: HashMap<String, DiffPattern>,
    /// example_id -> situation -> performance
    pub example_performance: HashMap<String, HashMap<String, ExamplePerformance>>,
    /// situation -> message stats
    pub message_stats: HashMap<String, MessageStats>,
    pub deep_patterns: Option<DeepPatterns>,
}

impl LearningStatistics {
    /// `example_performance[id][situation]`, falling back to the
    /// "allgemein" situation, then to a neutral 0.5 — total function per
    /// spec.md §9.
    pub fn example_performance_for(&self, id: &str, situation: &str) -> (ExamplePerformance, f32) {
        if let Some(perf) = self
            .example_performance
            .get(id)
            .and_then(|m| m.get(situation))
            .filter(|p| p.total() > 0)
        {
            return (perf.clone(), 1.0);
        }
        if let Some(perf) = self
            .example_performance
            .get(id)
            .and_then(|m| m.get("allgemein"))
            .filter(|p| p.total() > 0)
        {
            return (perf.clone(), 0.7);
        }
        (ExamplePerformance::default(), 0.5)
    }

    pub fn word_score(&self, situation: &str, word: &str) -> WordScore {
        self.word_frequencies
            .get(situation)
            .and_then(|m| m.get(word))
            .cloned()
            .unwrap_or_default()
    }
}
