use super::{EvaluationContext, TriggerCondition};
use crate::domain::entities::ConditionOperator;
use serde_json::Value;

pub const CONVERSATION_CREATED: &str = "conversation_created";
pub const CONVERSATION_UPDATED: &str = "conversation_updated";

/// Matches the `conversation_created` / `conversation_updated` pseudo events
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTypeCondition;

impl TriggerCondition for EventTypeCondition {
    fn is_met(
        &self,
        ctx: &EvaluationContext<'_>,
        operator: &ConditionOperator,
        value: &Value,
    ) -> bool {
        let has_prior = ctx.prior.is_some();
        let event = value.as_str().unwrap_or_default();

        match operator {
            ConditionOperator::Equals => {
                (event == CONVERSATION_CREATED && !has_prior)
                    || (event == CONVERSATION_UPDATED && has_prior)
            }
            ConditionOperator::NotEquals => {
                (event == CONVERSATION_CREATED && has_prior)
                    || (event == CONVERSATION_UPDATED && !has_prior)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Conversation;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_event_type_matrix() {
        let now = Utc::now();
        let current = Conversation::new("conv-1", now);
        let prior = current.clone();
        let created = EvaluationContext::created(&current, now);
        let updated = EvaluationContext::updated(&current, &prior, now);
        let condition = EventTypeCondition;
        let is = ConditionOperator::parse("is");
        let not = ConditionOperator::parse("not");

        assert!(condition.is_met(&created, &is, &json!(CONVERSATION_CREATED)));
        assert!(!condition.is_met(&updated, &is, &json!(CONVERSATION_CREATED)));
        assert!(condition.is_met(&updated, &is, &json!(CONVERSATION_UPDATED)));
        assert!(!condition.is_met(&created, &is, &json!(CONVERSATION_UPDATED)));

        assert!(condition.is_met(&updated, &not, &json!(CONVERSATION_CREATED)));
        assert!(!condition.is_met(&created, &not, &json!(CONVERSATION_CREATED)));
        assert!(condition.is_met(&created, &not, &json!(CONVERSATION_UPDATED)));
        assert!(!condition.is_met(&updated, &not, &json!(CONVERSATION_UPDATED)));
    }

    #[test]
    fn test_unknown_event_or_operator() {
        let now = Utc::now();
        let current = Conversation::new("conv-1", now);
        let created = EvaluationContext::created(&current, now);
        let condition = EventTypeCondition;

        // an unknown event name matches neither `is` nor `not`
        assert!(!condition.is_met(&created, &ConditionOperator::Equals, &json!("message_sent")));
        assert!(!condition.is_met(&created, &ConditionOperator::NotEquals, &json!("message_sent")));
        assert!(!condition.is_met(
            &created,
            &ConditionOperator::Contains,
            &json!(CONVERSATION_CREATED)
        ));
    }
}
