//! Agreement/Consensus Detector (C5, layer 3). Builds a phrase->polarity
//! consensus map from the last few turns of both sides; contradiction
//! enforcement against this map happens downstream in the rewrite loop (C9).

use persona_core::HistoryMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Affirmed,
    Denied,
}

#[derive(Debug, Clone)]
pub struct ConsensusEntry {
    pub phrase: String,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, Default)]
pub struct AgreementResult {
    pub consensus_map: Vec<ConsensusEntry>,
    pub success: bool,
}

const AFFIRMATION_MARKERS: &[&str] = &["ja", "klar", "genau", "stimmt", "auf jeden fall", "natürlich"];
const DENIAL_MARKERS: &[&str] = &["nein", "eher nicht", "auf keinen fall", "nicht wirklich"];

fn extract_statements(messages: &[HistoryMessage]) -> Vec<ConsensusEntry> {
    messages
        .iter()
        .rev()
        .take(5)
        .filter_map(|m| {
            let lower = m.text.to_lowercase();
            if DENIAL_MARKERS.iter().any(|d| lower.contains(d)) {
                Some(ConsensusEntry { phrase: m.text.clone(), polarity: Polarity::Denied })
            } else if AFFIRMATION_MARKERS.iter().any(|a| lower.contains(a)) {
                Some(ConsensusEntry { phrase: m.text.clone(), polarity: Polarity::Affirmed })
            } else {
                None
            }
        })
        .collect()
}

pub fn run(moderator_messages: &[HistoryMessage], customer_messages: &[HistoryMessage]) -> AgreementResult {
    let mut consensus_map = extract_statements(moderator_messages);
    consensus_map.extend(extract_statements(customer_messages));
    AgreementResult { consensus_map, success: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_affirmed_and_denied_statements() {
        let customer = vec![
            HistoryMessage { text: "Ja klar, das mag ich auch".to_string(), timestamp: None },
            HistoryMessage { text: "Nein, eher nicht mein Ding".to_string(), timestamp: None },
        ];
        let result = run(&[], &customer);
        assert_eq!(result.consensus_map.len(), 2);
        assert!(result.consensus_map.iter().any(|e| e.polarity == Polarity::Affirmed));
        assert!(result.consensus_map.iter().any(|e| e.polarity == Polarity::Denied));
    }
}
