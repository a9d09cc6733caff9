//! Safety Gate (C3): the first check on every request. Delegates to the
//! moderation capability; on block, short-circuits the pipeline with no
//! generation call ever issued (spec.md §4.3, §8 invariant).

use persona_core::{Capabilities, ModerationResult, Result};

pub async fn check_safety(capabilities: &Capabilities, customer_message: &str) -> Result<ModerationResult> {
    capabilities.moderation.check(customer_message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_capabilities;

    #[tokio::test]
    async fn clean_message_is_not_blocked() {
        let caps = test_capabilities();
        let result = check_safety(&caps, "Wie war dein Tag?").await.unwrap();
        assert!(!result.is_blocked);
    }
}
