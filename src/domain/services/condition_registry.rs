use crate::domain::entities::{ConditionOperator, ConditionSpec};
use crate::domain::services::conditions::{
    AttributeCondition, ConversationAttribute, EvaluationContext, EventTypeCondition,
    HoursSinceClosedCondition, HoursSinceCreatedCondition, HoursSinceLastActivityCondition,
    HoursSinceLastReplyCondition, StatusChangedCondition, TriggerCondition,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Descriptive metadata for a registered condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionMeta {
    pub name: String,
    pub label: String,
    pub group: String,
    /// Operators the condition accepts; empty means any recognized operator
    pub operators: Vec<ConditionOperator>,
    /// Truth value can change with elapsed time alone
    pub time_based: bool,
}

impl ConditionMeta {
    pub fn new(name: &str, label: &str, group: &str, operators: Vec<ConditionOperator>) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            group: group.to_string(),
            operators,
            time_based: false,
        }
    }

    pub fn time_based(mut self) -> Self {
        self.time_based = true;
        self
    }

    pub fn permits(&self, operator: &ConditionOperator) -> bool {
        if matches!(operator, ConditionOperator::Unrecognized(_)) {
            return false;
        }
        self.operators.is_empty() || self.operators.contains(operator)
    }
}

#[derive(Clone)]
pub struct RegisteredCondition {
    pub meta: ConditionMeta,
    evaluator: Arc<dyn TriggerCondition>,
}

impl RegisteredCondition {
    pub fn is_met(&self, ctx: &EvaluationContext<'_>, spec: &ConditionSpec) -> bool {
        self.evaluator.is_met(ctx, &spec.operator, &spec.value)
    }
}

impl fmt::Debug for RegisteredCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCondition")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Read-only table of condition name -> evaluator + metadata.
///
/// Build it once at startup and share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    entries: HashMap<String, RegisteredCondition>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        use ConditionOperator::*;

        let text_ops = || {
            vec![
                Contains,
                NotContains,
                StartsWith,
                EndsWith,
                Equals,
                NotEquals,
                MatchesRegex,
            ]
        };
        let equality_ops = || vec![Equals, NotEquals];

        let mut registry = Self::new();

        registry.register(
            ConditionMeta::new("event:type", "Event type", "event", equality_ops()),
            EventTypeCondition,
        );

        registry.register(
            ConditionMeta::new(
                "timeframe:hours_since_closed",
                "Hours since closed",
                "timeframe",
                vec![More],
            )
            .time_based(),
            HoursSinceClosedCondition,
        );
        registry.register(
            ConditionMeta::new(
                "timeframe:hours_since_created",
                "Hours since created",
                "timeframe",
                vec![More],
            )
            .time_based(),
            HoursSinceCreatedCondition,
        );
        registry.register(
            ConditionMeta::new(
                "timeframe:hours_since_last_activity",
                "Hours since last activity",
                "timeframe",
                vec![More],
            )
            .time_based(),
            HoursSinceLastActivityCondition,
        );
        registry.register(
            ConditionMeta::new(
                "timeframe:hours_since_last_reply",
                "Hours since last reply",
                "timeframe",
                vec![More],
            )
            .time_based(),
            HoursSinceLastReplyCondition,
        );

        let attributes = [
            (
                "conversation:status",
                "Status",
                "conversation",
                ConversationAttribute::Status,
                equality_ops(),
            ),
            (
                "conversation:subject",
                "Subject",
                "conversation",
                ConversationAttribute::Subject,
                text_ops(),
            ),
            (
                "conversation:priority",
                "Priority",
                "conversation",
                ConversationAttribute::Priority,
                equality_ops(),
            ),
            (
                "conversation:tags",
                "Tags",
                "conversation",
                ConversationAttribute::Tags,
                vec![Contains, NotContains, NotNull],
            ),
            (
                "conversation:assigned_user",
                "Assigned agent",
                "conversation",
                ConversationAttribute::AssignedUser,
                vec![Equals, NotEquals, NotNull],
            ),
            (
                "conversation:assigned_team",
                "Assigned team",
                "conversation",
                ConversationAttribute::AssignedTeam,
                vec![Equals, NotEquals, NotNull],
            ),
            (
                "message:body",
                "Message body",
                "message",
                ConversationAttribute::MessageBody,
                text_ops(),
            ),
            (
                "message:author",
                "Message author",
                "message",
                ConversationAttribute::MessageAuthor,
                equality_ops(),
            ),
        ];
        for (name, label, group, attribute, operators) in attributes {
            registry.register(
                ConditionMeta::new(name, label, group, operators),
                AttributeCondition::new(attribute),
            );
        }

        registry.register(
            ConditionMeta::new(
                "conversation:status_changed",
                "Status changed to",
                "conversation",
                equality_ops(),
            ),
            StatusChangedCondition::default(),
        );

        registry
    }

    /// Add or replace a condition
    pub fn register<C>(&mut self, meta: ConditionMeta, condition: C)
    where
        C: TriggerCondition + 'static,
    {
        let name = meta.name.clone();
        let entry = RegisteredCondition {
            meta,
            evaluator: Arc::new(condition),
        };

        if self.entries.insert(name.clone(), entry).is_some() {
            tracing::warn!("Condition '{}' registered twice, keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredCondition> {
        self.entries.get(name)
    }

    /// `None` for names the registry does not know
    pub fn is_time_based(&self, name: &str) -> Option<bool> {
        self.get(name).map(|entry| entry.meta.time_based)
    }

    /// Metadata of every condition, sorted by group then name
    pub fn describe(&self) -> Vec<&ConditionMeta> {
        let mut metas: Vec<&ConditionMeta> = self.entries.values().map(|e| &e.meta).collect();
        metas.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.name.cmp(&b.name)));
        metas
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
