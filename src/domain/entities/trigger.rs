use crate::domain::entities::{ConversationStatus, Priority};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::services::condition_registry::ConditionRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A rule made of conditions (all must match) and actions (run in order on match)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub times_fired: u64,
    pub user_id: Option<String>,
    pub config: TriggerConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

/// One condition of a trigger. `name` keys into the condition registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub name: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
}

impl ConditionSpec {
    pub fn new(name: impl Into<String>, operator: &str, value: Value) -> Self {
        Self {
            name: name.into(),
            operator: ConditionOperator::parse(operator),
            value,
        }
    }
}

/// Comparison operators understood by the value comparator.
///
/// Free-form operator names (`is`, `is_not`, `>=`, `not-contains`, ...) are
/// resolved once when a condition is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    More,
    Less,
    Gte,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    MatchesRegex,
    NotNull,
    Unrecognized(String),
}

impl ConditionOperator {
    pub fn parse(name: &str) -> Self {
        match camel_case(name.trim()).as_str() {
            "equals" | "is" | "=" | "==" | "eq" => ConditionOperator::Equals,
            "notEquals" | "not" | "isNot" | "!=" | "<>" | "ne" => ConditionOperator::NotEquals,
            "more" | "moreThan" | "greaterThan" | ">" | "gt" => ConditionOperator::More,
            "less" | "lessThan" | "<" | "lt" => ConditionOperator::Less,
            "gte" | ">=" => ConditionOperator::Gte,
            "lte" | "<=" => ConditionOperator::Lte,
            "contains" => ConditionOperator::Contains,
            "notContains" | "doesNotContain" => ConditionOperator::NotContains,
            "startsWith" => ConditionOperator::StartsWith,
            "endsWith" => ConditionOperator::EndsWith,
            "matchesRegex" => ConditionOperator::MatchesRegex,
            "notNull" | "isNotNull" => ConditionOperator::NotNull,
            _ => ConditionOperator::Unrecognized(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::More => "more",
            ConditionOperator::Less => "less",
            ConditionOperator::Gte => "gte",
            ConditionOperator::Lte => "lte",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "notContains",
            ConditionOperator::StartsWith => "startsWith",
            ConditionOperator::EndsWith => "endsWith",
            ConditionOperator::MatchesRegex => "matchesRegex",
            ConditionOperator::NotNull => "notNull",
            ConditionOperator::Unrecognized(name) => name,
        }
    }
}

impl From<String> for ConditionOperator {
    fn from(s: String) -> Self {
        ConditionOperator::parse(&s)
    }
}

impl From<&str> for ConditionOperator {
    fn from(s: &str) -> Self {
        ConditionOperator::parse(s)
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `is_not` -> `isNot`, `Not-Contains` -> `notContains`. Symbols pass through.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if matches!(c, '_' | '-' | ' ') {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Email sent to the conversation's contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

/// Action to run when every condition of a trigger matched.
/// Execution belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "snake_case")]
pub enum ActionSpec {
    ChangeStatus(ConversationStatus),
    SetPriority(Priority),
    AssignToUser(String),
    AssignToTeam(String),
    AddTags(Vec<String>),
    RemoveTags(Vec<String>),
    AddNote(String),
    SendEmailToContact(EmailTemplate),
    DeleteConversation,
}

impl ActionSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ActionSpec::ChangeStatus(_) => "change_status",
            ActionSpec::SetPriority(_) => "set_priority",
            ActionSpec::AssignToUser(_) => "assign_to_user",
            ActionSpec::AssignToTeam(_) => "assign_to_team",
            ActionSpec::AddTags(_) => "add_tags",
            ActionSpec::RemoveTags(_) => "remove_tags",
            ActionSpec::AddNote(_) => "add_note",
            ActionSpec::SendEmailToContact(_) => "send_email_to_contact",
            ActionSpec::DeleteConversation => "delete_conversation",
        }
    }
}

impl TriggerConfig {
    /// Parse a stored configuration blob. Unknown action names are rejected.
    pub fn from_json(raw: Value) -> DomainResult<Self> {
        serde_json::from_value(raw).map_err(|e| {
            tracing::warn!("Rejected trigger configuration: {}", e);
            DomainError::ValidationError(format!("Invalid trigger configuration: {}", e))
        })
    }

    /// Check the configuration against the condition registry
    pub fn validate(&self, registry: &ConditionRegistry) -> DomainResult<()> {
        if self.conditions.is_empty() {
            return Err(DomainError::ValidationError(
                "Trigger must have at least one condition".to_string(),
            ));
        }

        if self.actions.is_empty() {
            return Err(DomainError::ValidationError(
                "Trigger must have at least one action".to_string(),
            ));
        }

        for condition in &self.conditions {
            let entry = registry.get(&condition.name).ok_or_else(|| {
                DomainError::ValidationError(format!("Unknown condition: {}", condition.name))
            })?;

            if !entry.meta.permits(&condition.operator) {
                return Err(DomainError::ValidationError(format!(
                    "Operator '{}' is not allowed for condition '{}'",
                    condition.operator, condition.name
                )));
            }
        }

        Ok(())
    }
}

impl Trigger {
    pub fn new(name: String, config: TriggerConfig) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: None,
            enabled: true,
            times_fired: 0,
            user_id: None,
            config,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn conditions(&self) -> &[ConditionSpec] {
        &self.config.conditions
    }

    pub fn actions(&self) -> &[ActionSpec] {
        &self.config.actions
    }

    pub fn validate(&self, registry: &ConditionRegistry) -> DomainResult<()> {
        if self.name.trim().is_empty() || self.name.len() > 200 {
            return Err(DomainError::ValidationError(
                "Trigger name must be 1-200 characters".to_string(),
            ));
        }

        self.config.validate(registry)
    }
}
