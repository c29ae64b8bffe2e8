use crate::domain::entities::Trigger;
use crate::domain::services::condition_registry::ConditionRegistry;
use crate::domain::services::conditions::EvaluationContext;
use std::sync::Arc;

/// Evaluates triggers against the condition registry
#[derive(Debug, Clone)]
pub struct TriggerRuleSet {
    registry: Arc<ConditionRegistry>,
}

impl TriggerRuleSet {
    pub fn new(registry: Arc<ConditionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// Triggers with at least one known condition whose `time_based` flag equals
    /// `is_time_based`. Conditions missing from the registry are ignored.
    pub fn get_all_where_time_based<'t>(
        &self,
        triggers: &'t [Trigger],
        is_time_based: bool,
    ) -> Vec<&'t Trigger> {
        triggers
            .iter()
            .filter(|trigger| {
                trigger
                    .conditions()
                    .iter()
                    .filter_map(|condition| self.registry.is_time_based(&condition.name))
                    .any(|time_based| time_based == is_time_based)
            })
            .collect()
    }

    /// True when the trigger has conditions and every one of them is met
    pub fn evaluate(&self, trigger: &Trigger, ctx: &EvaluationContext<'_>) -> bool {
        if trigger.conditions().is_empty() {
            tracing::debug!("Trigger '{}' ({}) has no conditions", trigger.name, trigger.id);
            return false;
        }

        trigger.conditions().iter().all(|condition| {
            let Some(entry) = self.registry.get(&condition.name) else {
                tracing::warn!(
                    "Trigger '{}' ({}) references unknown condition '{}'",
                    trigger.name,
                    trigger.id,
                    condition.name
                );
                return false;
            };

            if !entry.meta.permits(&condition.operator) {
                tracing::warn!(
                    "Operator '{}' not allowed for condition '{}' in trigger '{}'",
                    condition.operator,
                    condition.name,
                    trigger.name
                );
                return false;
            }

            let met = entry.is_met(ctx, condition);
            if !met {
                tracing::debug!(
                    "Condition '{}' not met for trigger '{}' on conversation {}",
                    condition.name,
                    trigger.name,
                    ctx.conversation.id
                );
            }
            met
        })
    }

    /// Triggers that fire for the context, in input order
    pub fn matching<'t>(
        &self,
        triggers: &'t [Trigger],
        ctx: &EvaluationContext<'_>,
    ) -> Vec<&'t Trigger> {
        triggers
            .iter()
            .filter(|trigger| self.evaluate(trigger, ctx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ActionSpec, ConditionSpec, Conversation, TriggerConfig};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn trigger(name: &str, conditions: Vec<ConditionSpec>) -> Trigger {
        Trigger::new(
            name.to_string(),
            TriggerConfig {
                conditions,
                actions: vec![ActionSpec::AddNote(name.to_string())],
            },
        )
    }

    fn rule_set() -> TriggerRuleSet {
        TriggerRuleSet::new(Arc::new(ConditionRegistry::with_defaults()))
    }

    #[test]
    fn test_time_based_filter() {
        let time_only = trigger(
            "time",
            vec![ConditionSpec::new("timeframe:hours_since_closed", "more", json!(24))],
        );
        let event_only = trigger(
            "event",
            vec![ConditionSpec::new("event:type", "is", json!("conversation_created"))],
        );
        let both = trigger(
            "both",
            vec![
                ConditionSpec::new("event:type", "is", json!("conversation_updated")),
                ConditionSpec::new("timeframe:hours_since_created", "more", json!(1)),
            ],
        );
        let unknown = trigger(
            "unknown",
            vec![ConditionSpec::new("removed:condition", "is", json!(1))],
        );
        let triggers = vec![time_only, event_only, both, unknown];
        let rules = rule_set();

        let names = |list: Vec<&Trigger>| list.iter().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(
            names(rules.get_all_where_time_based(&triggers, true)),
            vec!["time", "both"]
        );
        assert_eq!(
            names(rules.get_all_where_time_based(&triggers, false)),
            vec!["event", "both"]
        );
    }

    #[test]
    fn test_all_conditions_must_match() {
        let now = Utc::now();
        let mut conversation = Conversation::new("conv-1", now - Duration::hours(3));
        conversation.subject = Some("Refund please".to_string());
        let ctx = EvaluationContext::created(&conversation, now);
        let rules = rule_set();

        let fires = trigger(
            "fires",
            vec![
                ConditionSpec::new("event:type", "is", json!("conversation_created")),
                ConditionSpec::new("conversation:subject", "contains", json!("refund")),
            ],
        );
        let misses = trigger(
            "misses",
            vec![
                ConditionSpec::new("event:type", "is", json!("conversation_created")),
                ConditionSpec::new("conversation:subject", "contains", json!("invoice")),
            ],
        );

        assert!(rules.evaluate(&fires, &ctx));
        assert!(!rules.evaluate(&misses, &ctx));
    }

    #[test]
    fn test_fail_closed_cases() {
        let now = Utc::now();
        let conversation = Conversation::new("conv-1", now);
        let ctx = EvaluationContext::created(&conversation, now);
        let rules = rule_set();

        assert!(!rules.evaluate(&trigger("empty", vec![]), &ctx));
        assert!(!rules.evaluate(
            &trigger(
                "unknown",
                vec![ConditionSpec::new("weather:sunny", "is", json!(true))]
            ),
            &ctx
        ));
        // startsWith is not allowed for event:type
        assert!(!rules.evaluate(
            &trigger(
                "operator",
                vec![ConditionSpec::new("event:type", "startsWith", json!("conversation"))]
            ),
            &ctx
        ));
    }

    #[test]
    fn test_matching_preserves_order() {
        let now = Utc::now();
        let conversation = Conversation::new("conv-1", now);
        let ctx = EvaluationContext::created(&conversation, now);
        let created = || ConditionSpec::new("event:type", "is", json!("conversation_created"));
        let triggers = vec![
            trigger("b", vec![created()]),
            trigger(
                "skip",
                vec![ConditionSpec::new("event:type", "is", json!("conversation_updated"))],
            ),
            trigger("a", vec![created()]),
        ];

        let matched: Vec<&str> = rule_set()
            .matching(&triggers, &ctx)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(matched, vec!["b", "a"]);
    }
}
