pub mod attribute;
pub mod event_type;
pub mod timeframe;

pub use attribute::*;
pub use event_type::*;
pub use timeframe::*;

use crate::domain::entities::{ConditionOperator, Conversation};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// What a condition is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub conversation: &'a Conversation,
    /// State before the update. `None` means the conversation was just created.
    pub prior: Option<&'a Conversation>,
    pub now: DateTime<Utc>,
}

impl<'a> EvaluationContext<'a> {
    pub fn created(conversation: &'a Conversation, now: DateTime<Utc>) -> Self {
        Self {
            conversation,
            prior: None,
            now,
        }
    }

    pub fn updated(
        conversation: &'a Conversation,
        prior: &'a Conversation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation,
            prior: Some(prior),
            now,
        }
    }
}

/// A named predicate over a conversation, registered in the condition registry.
///
/// Implementations must not fail: anything that cannot be evaluated is `false`.
pub trait TriggerCondition: Send + Sync {
    fn is_met(&self, ctx: &EvaluationContext<'_>, operator: &ConditionOperator, value: &Value)
        -> bool;
}
