//! First-Message Detector (C5, layer 1). Flags the opening message of a
//! conversation so downstream composers can pick the greeting template
//! instead of a reply-to-customer template.

use persona_core::EngineRequest;

#[derive(Debug, Clone, Copy)]
pub struct FirstMessageResult {
    pub is_first_message: bool,
}

pub fn run(request: &EngineRequest) -> FirstMessageResult {
    FirstMessageResult { is_first_message: request.is_first_contact_from_us() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;
    use persona_core::{Capabilities, ExtractedUserInfo, ProfileInfo, RequestFlags, RulesBundle};
    use std::sync::Arc;

    fn base_request(caps: Capabilities) -> EngineRequest {
        EngineRequest {
            persona_id: "p1".to_string(),
            customer_message: String::new(),
            conversation_history: String::new(),
            moderator_messages: vec![],
            customer_messages: vec![],
            profile_info: ProfileInfo::default(),
            extracted_user_info: ExtractedUserInfo::default(),
            rules: RulesBundle::default(),
            training_data: Default::default(),
            feedback_data: None,
            learning_stats: Arc::new(Default::default()),
            image_url: None,
            image_type: None,
            image_description: None,
            flags: RequestFlags::default(),
            capabilities: caps,
        }
    }

    #[test]
    fn empty_history_and_empty_message_is_first_contact() {
        let req = base_request(test_capabilities());
        assert!(run(&req).is_first_message);
    }

    #[test]
    fn non_empty_customer_message_is_not_first_contact() {
        let mut req = base_request(test_capabilities());
        req.customer_message = "Hallo!".to_string();
        assert!(!run(&req).is_first_message);
    }
}
