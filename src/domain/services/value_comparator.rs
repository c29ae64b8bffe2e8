use crate::domain::entities::ConditionOperator;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Compares two arbitrary values under a condition operator.
///
/// Never fails: unknown operators, type mismatches and unparseable dates all
/// compare as `false`. When the generic comparison is `false` and the left
/// operand looks like `YYYY-MM-DDTHH:MM:SS.sssZ`, the comparison is retried
/// on the parsed instants.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueComparator;

impl ValueComparator {
    pub fn new() -> Self {
        Self
    }

    /// Compare using a free-form operator name (`is`, `is_not`, `>=`, ...)
    pub fn compare_named(&self, left: &Value, right: &Value, operator: &str) -> bool {
        self.compare(left, right, &ConditionOperator::parse(operator))
    }

    pub fn compare(&self, left: &Value, right: &Value, operator: &ConditionOperator) -> bool {
        let matched = match left {
            Value::Array(items) => compare_array(items, right, operator),
            _ => compare_scalar(left, right, operator),
        };

        if matched {
            return true;
        }

        if iso_timestamp_regex().is_match(&stringify(left)) {
            return compare_dates(left, right, operator);
        }

        false
    }
}

fn iso_timestamp_regex() -> &'static Regex {
    static ISO_TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    ISO_TIMESTAMP.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$")
            .expect("Invalid timestamp regex")
    })
}

fn compare_array(items: &[Value], needle: &Value, operator: &ConditionOperator) -> bool {
    match operator {
        ConditionOperator::NotNull => !items.is_empty(),
        ConditionOperator::Contains => items.iter().any(|item| loosely_equal(item, needle)),
        ConditionOperator::NotContains => !items.iter().any(|item| loosely_equal(item, needle)),
        _ => false,
    }
}

fn compare_scalar(left: &Value, right: &Value, operator: &ConditionOperator) -> bool {
    let haystack = stringify(left).to_lowercase();
    let needle = stringify(right).to_lowercase();

    match operator {
        ConditionOperator::Contains => !needle.is_empty() && haystack.contains(&needle),
        ConditionOperator::NotContains => needle.is_empty() || !haystack.contains(&needle),
        ConditionOperator::StartsWith => !needle.is_empty() && haystack.starts_with(&needle),
        ConditionOperator::EndsWith => !needle.is_empty() && haystack.ends_with(&needle),
        ConditionOperator::Equals => haystack == needle,
        ConditionOperator::NotEquals => haystack != needle,
        ConditionOperator::More => ordering(left, right) == Some(Ordering::Greater),
        ConditionOperator::Less => ordering(left, right) == Some(Ordering::Less),
        ConditionOperator::Gte => matches!(
            ordering(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ConditionOperator::Lte => matches!(
            ordering(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ConditionOperator::MatchesRegex => Regex::new(&stringify(right))
            .map(|re| re.is_match(&stringify(left)))
            .unwrap_or(false),
        ConditionOperator::NotNull => !left.is_null() && !haystack.is_empty(),
        ConditionOperator::Unrecognized(name) => {
            tracing::debug!("Unrecognized comparison operator '{}'", name);
            false
        }
    }
}

fn compare_dates(left: &Value, right: &Value, operator: &ConditionOperator) -> bool {
    let (Some(left), Some(right)) = (parse_instant(left), parse_instant(right)) else {
        return false;
    };

    match operator {
        ConditionOperator::NotNull => true,
        ConditionOperator::Equals => left == right,
        ConditionOperator::NotEquals => left != right,
        ConditionOperator::More => left > right,
        ConditionOperator::Less => left < right,
        ConditionOperator::Gte => left >= right,
        ConditionOperator::Lte => left <= right,
        _ => false,
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (midnight UTC)
pub(crate) fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Numeric when both sides are numbers (or numeric strings), lexicographic for
/// two plain strings, otherwise incomparable.
fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => match (left, right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn loosely_equal(item: &Value, needle: &Value) -> bool {
    if item == needle {
        return true;
    }

    let is_scalar = |v: &Value| !(v.is_array() || v.is_object() || v.is_null());
    is_scalar(item)
        && is_scalar(needle)
        && stringify(item).to_lowercase() == stringify(needle).to_lowercase()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
