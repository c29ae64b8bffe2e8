use crate::domain::entities::{FilterOperator, FilterPredicate};
use crate::domain::services::conditions::integer_cast;
use crate::domain::services::value_comparator::parse_instant;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

const HOURS_SUFFIX: &str = "_at_hours";
pub const NULL_LITERAL: &str = "_null";
pub const CURRENT_USER: &str = "currentUser";

/// Malformed filter input. These point at a bug in the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Filter '{0}' uses between without a {{start, end}} range")]
    InvalidRange(String),
    #[error("Filter '{key}' has an unparseable date bound: {value}")]
    InvalidDate { key: String, value: String },
    #[error("Filter '{0}' has an out of range hour offset")]
    InvalidHours(String),
}

/// Ambient values the normalizer reads
#[derive(Debug, Clone)]
pub struct NormalizerContext {
    pub now: DateTime<Utc>,
    pub current_user_id: Option<String>,
    /// Date-typed columns of the target model, custom attributes included (`ca_*`)
    pub date_columns: HashSet<String>,
}

impl NormalizerContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            current_user_id: None,
            date_columns: HashSet::new(),
        }
    }

    pub fn with_current_user(mut self, user_id: impl Into<String>) -> Self {
        self.current_user_id = Some(user_id.into());
        self
    }

    pub fn with_date_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns.extend(columns.into_iter().map(Into::into));
        self
    }
}

/// Rewrites user filters into the canonical form every backend adapter accepts
#[derive(Debug, Clone)]
pub struct FilterNormalizer {
    context: NormalizerContext,
}

impl FilterNormalizer {
    pub fn new(context: NormalizerContext) -> Self {
        Self { context }
    }

    pub fn normalize(
        &self,
        filters: &[FilterPredicate],
    ) -> Result<Vec<FilterPredicate>, FilterError> {
        let mut normalized = Vec::with_capacity(filters.len());

        for filter in filters {
            if filter.operator == FilterOperator::Between {
                normalized.extend(self.expand_range(filter)?);
            } else if let Some(prefix) = filter.key.strip_suffix(HOURS_SUFFIX) {
                normalized.push(self.relative_hours(filter, prefix)?);
            } else {
                normalized.push(self.normalize_plain(filter));
            }
        }

        tracing::debug!(
            "Normalized {} filter(s) into {} predicate(s)",
            filters.len(),
            normalized.len()
        );

        Ok(normalized)
    }

    fn expand_range(&self, filter: &FilterPredicate) -> Result<Vec<FilterPredicate>, FilterError> {
        let range = filter
            .value
            .as_object()
            .ok_or_else(|| FilterError::InvalidRange(filter.key.clone()))?;

        let mut predicates = Vec::with_capacity(2);
        let bounds = [("start", FilterOperator::Gte), ("end", FilterOperator::Lte)];

        for (bound, operator) in bounds {
            let Some(raw) = range.get(bound).filter(|v| !v.is_null()) else {
                continue;
            };

            predicates.push(FilterPredicate {
                key: filter.key.clone(),
                operator,
                value: Value::from(unix_timestamp(&filter.key, raw)?),
                original_operator: Some(FilterOperator::Between),
            });
        }

        Ok(predicates)
    }

    /// `created_at_hours > 5` means "created more than 5 hours ago", which is
    /// `created_at < now - 5h`. Only `>` maps to `<`, everything else maps to `>`.
    fn relative_hours(
        &self,
        filter: &FilterPredicate,
        prefix: &str,
    ) -> Result<FilterPredicate, FilterError> {
        let operator = if filter.operator == FilterOperator::Gt {
            FilterOperator::Lt
        } else {
            FilterOperator::Gt
        };

        let threshold = Duration::try_hours(integer_cast(&filter.value))
            .and_then(|window| self.context.now.checked_sub_signed(window))
            .ok_or_else(|| FilterError::InvalidHours(filter.key.clone()))?;

        Ok(FilterPredicate {
            key: format!("{}_at", prefix),
            operator,
            value: Value::from(threshold.timestamp()),
            original_operator: Some(filter.operator),
        })
    }

    fn normalize_plain(&self, filter: &FilterPredicate) -> FilterPredicate {
        let operator = match filter.operator {
            FilterOperator::Has => FilterOperator::Eq,
            FilterOperator::DoesntHave => FilterOperator::Ne,
            other => other,
        };

        FilterPredicate {
            key: filter.key.clone(),
            operator,
            value: self.normalize_value(&filter.key, &filter.value),
            original_operator: filter.original_operator.or(Some(filter.operator)),
        }
    }

    fn normalize_value(&self, key: &str, value: &Value) -> Value {
        match value {
            Value::Null => Value::from(NULL_LITERAL),
            Value::Bool(b) => Value::from(b.to_string()),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item.get("id") {
                        Some(id) if item.is_object() => id.clone(),
                        _ => item.clone(),
                    })
                    .collect(),
            ),
            Value::String(s) if s == CURRENT_USER => match &self.context.current_user_id {
                Some(user_id) => Value::from(user_id.as_str()),
                None => Value::from(NULL_LITERAL),
            },
            Value::String(s) => {
                if self.context.date_columns.contains(key) {
                    if let Some(instant) = parse_instant(value) {
                        return Value::from(instant.timestamp());
                    }
                }

                if s.contains(' ') && !is_quoted(s) {
                    Value::from(format!("'{}'", s))
                } else {
                    value.clone()
                }
            }
            other => other.clone(),
        }
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'')
}

fn unix_timestamp(key: &str, raw: &Value) -> Result<i64, FilterError> {
    if let Some(ts) = raw.as_i64() {
        return Ok(ts);
    }

    parse_instant(raw)
        .map(|instant| instant.timestamp())
        .ok_or_else(|| FilterError::InvalidDate {
            key: key.to_string(),
            value: raw.to_string(),
        })
}
