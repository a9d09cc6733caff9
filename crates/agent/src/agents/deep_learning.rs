//! Deep Learning (C5, layer 6, non-critical). Reads cached `deep_patterns`
//! from the learning statistics; if absent or stale, schedules background
//! extraction and returns empty context immediately — this agent never
//! blocks the request (spec.md §3 Lifecycles, §4.5).

use chrono::Duration;

use persona_core::LearningStatistics;

const STALE_AFTER_DAYS: i64 = 7;

#[derive(Debug, Clone, Default)]
pub struct DeepLearningResult {
    pub patterns: Option<serde_json::Value>,
    /// True when extraction should be kicked off in the background
    /// because the cache was missing or stale. The caller (orchestrator)
    /// is responsible for actually firing the fire-and-forget task.
    pub needs_background_extraction: bool,
}

pub fn run(stats: &LearningStatistics) -> DeepLearningResult {
    match &stats.deep_patterns {
        Some(deep) => {
            let stale = deep
                .last_updated
                .map(|ts| chrono::Utc::now().signed_duration_since(ts) > Duration::days(STALE_AFTER_DAYS))
                .unwrap_or(true);
            DeepLearningResult { patterns: Some(deep.patterns.clone()), needs_background_extraction: stale }
        }
        None => DeepLearningResult { patterns: None, needs_background_extraction: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::DeepPatterns;

    #[test]
    fn missing_patterns_schedules_extraction_and_returns_empty() {
        let stats = LearningStatistics::default();
        let result = run(&stats);
        assert!(result.patterns.is_none());
        assert!(result.needs_background_extraction);
    }

    #[test]
    fn fresh_patterns_are_used_without_scheduling_extraction() {
        let mut stats = LearningStatistics::default();
        stats.deep_patterns = Some(DeepPatterns {
            patterns: serde_json::json!({"x": 1}),
            last_updated: Some(chrono::Utc::now()),
        });
        let result = run(&stats);
        assert!(result.patterns.is_some());
        assert!(!result.needs_background_extraction);
    }

    #[test]
    fn stale_patterns_are_still_used_but_schedule_extraction() {
        let mut stats = LearningStatistics::default();
        stats.deep_patterns = Some(DeepPatterns {
            patterns: serde_json::json!({"x": 1}),
            last_updated: Some(chrono::Utc::now() - chrono::Duration::days(10)),
        });
        let result = run(&stats);
        assert!(result.patterns.is_some());
        assert!(result.needs_background_extraction);
    }
}
