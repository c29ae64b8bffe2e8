use super::{EvaluationContext, TriggerCondition};
use crate::domain::entities::{ConditionOperator, Conversation};
use crate::domain::services::value_comparator::ValueComparator;
use serde_json::Value;

/// Conversation fields exposed to generic conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAttribute {
    Status,
    Subject,
    Priority,
    Tags,
    AssignedUser,
    AssignedTeam,
    MessageBody,
    MessageAuthor,
}

impl ConversationAttribute {
    /// Read the attribute as a JSON value; missing values are `null`
    pub fn read(&self, conversation: &Conversation) -> Value {
        match self {
            ConversationAttribute::Status => Value::String(conversation.status.to_string()),
            ConversationAttribute::Subject => opt_string(conversation.subject.clone()),
            ConversationAttribute::Priority => {
                opt_string(conversation.priority.map(|p| p.to_string()))
            }
            ConversationAttribute::Tags => Value::Array(
                conversation
                    .tags
                    .iter()
                    .map(|t| Value::String(t.clone()))
                    .collect(),
            ),
            ConversationAttribute::AssignedUser => {
                opt_string(conversation.assigned_user_id.clone())
            }
            ConversationAttribute::AssignedTeam => {
                opt_string(conversation.assigned_team_id.clone())
            }
            ConversationAttribute::MessageBody => {
                opt_string(conversation.latest_message.as_ref().map(|m| m.body.clone()))
            }
            ConversationAttribute::MessageAuthor => opt_string(
                conversation
                    .latest_message
                    .as_ref()
                    .map(|m| m.author.to_string()),
            ),
        }
    }
}

fn opt_string(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}

/// Compares one attribute of the current conversation state against the condition value
#[derive(Debug, Clone, Copy)]
pub struct AttributeCondition {
    attribute: ConversationAttribute,
    comparator: ValueComparator,
}

impl AttributeCondition {
    pub fn new(attribute: ConversationAttribute) -> Self {
        Self {
            attribute,
            comparator: ValueComparator::new(),
        }
    }
}

impl TriggerCondition for AttributeCondition {
    fn is_met(
        &self,
        ctx: &EvaluationContext<'_>,
        operator: &ConditionOperator,
        value: &Value,
    ) -> bool {
        let current = self.attribute.read(ctx.conversation);
        self.comparator.compare(&current, value, operator)
    }
}

/// True when an update moved the conversation into a status matching the value
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusChangedCondition {
    comparator: ValueComparator,
}

impl TriggerCondition for StatusChangedCondition {
    fn is_met(
        &self,
        ctx: &EvaluationContext<'_>,
        operator: &ConditionOperator,
        value: &Value,
    ) -> bool {
        let Some(prior) = ctx.prior else {
            return false;
        };

        if prior.status == ctx.conversation.status {
            return false;
        }

        let current = ConversationAttribute::Status.read(ctx.conversation);
        self.comparator.compare(&current, value, operator)
    }
}
