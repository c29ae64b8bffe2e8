use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A key/operator/value filter handed to a storage or search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicate {
    pub key: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    /// Operator as supplied before normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_operator: Option<FilterOperator>,
}

impl FilterPredicate {
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            key: key.into(),
            operator,
            value,
            original_operator: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "has")]
    Has,
    #[serde(rename = "doesntHave")]
    DoesntHave,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "notContains")]
    NotContains,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "endsWith")]
    EndsWith,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Has => "has",
            FilterOperator::DoesntHave => "doesntHave",
            FilterOperator::Between => "between",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "notContains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
