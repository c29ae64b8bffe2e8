//! Conditions that become true purely because time passed.
//!
//! Each one checks that a conversation timestamp lies at least N hours in the
//! past, N being the integer cast of the condition value. The operator is not
//! consulted. All of them are registered as time based so a scheduler can
//! re-evaluate them periodically.

use super::{EvaluationContext, TriggerCondition};
use crate::domain::entities::ConditionOperator;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct HoursSinceClosedCondition;

#[derive(Debug, Clone, Copy, Default)]
pub struct HoursSinceCreatedCondition;

#[derive(Debug, Clone, Copy, Default)]
pub struct HoursSinceLastActivityCondition;

#[derive(Debug, Clone, Copy, Default)]
pub struct HoursSinceLastReplyCondition;

impl TriggerCondition for HoursSinceClosedCondition {
    fn is_met(&self, ctx: &EvaluationContext<'_>, _: &ConditionOperator, value: &Value) -> bool {
        elapsed_at_least(ctx.conversation.closed_at, ctx.now, value)
    }
}

impl TriggerCondition for HoursSinceCreatedCondition {
    fn is_met(&self, ctx: &EvaluationContext<'_>, _: &ConditionOperator, value: &Value) -> bool {
        elapsed_at_least(Some(ctx.conversation.created_at), ctx.now, value)
    }
}

impl TriggerCondition for HoursSinceLastActivityCondition {
    fn is_met(&self, ctx: &EvaluationContext<'_>, _: &ConditionOperator, value: &Value) -> bool {
        elapsed_at_least(Some(ctx.conversation.updated_at), ctx.now, value)
    }
}

impl TriggerCondition for HoursSinceLastReplyCondition {
    fn is_met(&self, ctx: &EvaluationContext<'_>, _: &ConditionOperator, value: &Value) -> bool {
        elapsed_at_least(ctx.conversation.last_reply_at(), ctx.now, value)
    }
}

fn elapsed_at_least(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>, hours: &Value) -> bool {
    let Some(ts) = timestamp else {
        return false;
    };

    Duration::try_hours(integer_cast(hours))
        .and_then(|window| now.checked_sub_signed(window))
        .is_some_and(|threshold| ts <= threshold)
}

/// Loose integer cast: numbers truncate, strings parse their leading integer,
/// booleans become 0/1, everything else is 0.
pub fn integer_cast(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let sign_len = usize::from(trimmed.starts_with(['-', '+']));
            let digits = trimmed[sign_len..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            trimmed[..sign_len + digits].parse().unwrap_or(0)
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Conversation, MessageAuthor, MessageRef};
    use serde_json::json;

    #[test]
    fn test_integer_cast() {
        assert_eq!(integer_cast(&json!(5)), 5);
        assert_eq!(integer_cast(&json!(5.9)), 5);
        assert_eq!(integer_cast(&json!("12")), 12);
        assert_eq!(integer_cast(&json!(" 8 hours")), 8);
        assert_eq!(integer_cast(&json!("-3")), -3);
        assert_eq!(integer_cast(&json!("abc")), 0);
        assert_eq!(integer_cast(&json!(true)), 1);
        assert_eq!(integer_cast(&Value::Null), 0);
    }

    #[test]
    fn test_hours_since_closed() {
        let now = Utc::now();
        let mut conversation = Conversation::new("conv-1", now - Duration::hours(100));
        let op = ConditionOperator::More;

        // never closed
        let ctx = EvaluationContext::created(&conversation, now);
        assert!(!HoursSinceClosedCondition.is_met(&ctx, &op, &json!(0)));
        assert!(!HoursSinceClosedCondition.is_met(&ctx, &op, &json!(24)));

        conversation.closed_at = Some(now - Duration::hours(30));
        let ctx = EvaluationContext::created(&conversation, now);
        assert!(HoursSinceClosedCondition.is_met(&ctx, &op, &json!(24)));
        assert!(HoursSinceClosedCondition.is_met(&ctx, &op, &json!("30")));
        assert!(!HoursSinceClosedCondition.is_met(&ctx, &op, &json!(31)));
    }

    #[test]
    fn test_hours_since_created_and_activity() {
        let now = Utc::now();
        let mut conversation = Conversation::new("conv-1", now - Duration::hours(10));
        conversation.updated_at = now - Duration::hours(2);
        let ctx = EvaluationContext::created(&conversation, now);
        let op = ConditionOperator::More;

        assert!(HoursSinceCreatedCondition.is_met(&ctx, &op, &json!(10)));
        assert!(!HoursSinceCreatedCondition.is_met(&ctx, &op, &json!(11)));
        assert!(HoursSinceLastActivityCondition.is_met(&ctx, &op, &json!(2)));
        assert!(!HoursSinceLastActivityCondition.is_met(&ctx, &op, &json!(3)));
    }

    #[test]
    fn test_hours_since_last_reply() {
        let now = Utc::now();
        let mut conversation = Conversation::new("conv-1", now - Duration::hours(10));
        let op = ConditionOperator::More;

        let ctx = EvaluationContext::created(&conversation, now);
        assert!(!HoursSinceLastReplyCondition.is_met(&ctx, &op, &json!(1)));

        conversation.latest_message = Some(MessageRef {
            id: "msg-1".to_string(),
            body: "Any update?".to_string(),
            author: MessageAuthor::Contact,
            created_at: now - Duration::hours(5),
        });
        let ctx = EvaluationContext::created(&conversation, now);
        assert!(HoursSinceLastReplyCondition.is_met(&ctx, &op, &json!(4)));
        assert!(!HoursSinceLastReplyCondition.is_met(&ctx, &op, &json!(6)));
    }
}
