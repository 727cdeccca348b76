//! Filter predicates applied by the query engine.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::{Record, Timestamp};
use crate::value;

/// Equality filter values that mean "no filtering".
pub const ALL_SENTINELS: &[&str] = &["All", "all"];

/// Length of the `week` bucket, in days.
pub const WEEK_BUCKET_DAYS: i64 = 7;

/// A named relative time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBucket {
    #[default]
    All,
    /// Same calendar day as the clock, in the clock's offset.
    Today,
    /// Strictly after the clock minus seven days.
    Week,
}

impl DateBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            DateBucket::All => "all",
            DateBucket::Today => "today",
            DateBucket::Week => "week",
        }
    }

    /// Whether `value` falls inside this bucket relative to `now`.
    ///
    /// Missing or unparsable timestamps only pass [`DateBucket::All`].
    pub fn contains(self, value: Option<&Value>, now: &Timestamp) -> bool {
        if self == DateBucket::All {
            return true;
        }
        let Some(ts) = value.and_then(|v| value::parse_timestamp(v, now.offset())) else {
            return false;
        };
        match self {
            DateBucket::All => true,
            DateBucket::Today => ts.date_naive() == now.date_naive(),
            DateBucket::Week => ts > *now - Duration::days(WEEK_BUCKET_DAYS),
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateBucket {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DateBucket::All),
            "today" => Ok(DateBucket::Today),
            "week" => Ok(DateBucket::Week),
            other => Err(CoreError::Parse(format!(
                "Unknown date bucket '{other}'. Must be one of: all, today, week"
            ))),
        }
    }
}

/// One predicate over a record field. A record must pass every filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals `value`, unless `value` is an "All" sentinel.
    Equality { field: String, value: Value },
    /// Numeric field within `[min, max]`; a missing bound is open.
    Range {
        field: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Timestamp field inside a named window.
    DateBucket { field: String, bucket: DateBucket },
}

impl Filter {
    pub fn equality(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equality {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Filter::Range {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn date_bucket(field: impl Into<String>, bucket: DateBucket) -> Self {
        Filter::DateBucket {
            field: field.into(),
            bucket,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Filter::Equality { field, .. }
            | Filter::Range { field, .. }
            | Filter::DateBucket { field, .. } => field,
        }
    }

    /// `true` when the filter lets every record through.
    pub fn is_noop(&self) -> bool {
        match self {
            Filter::Equality { value, .. } => is_all_sentinel(value),
            Filter::Range { min, max, .. } => min.is_none() && max.is_none(),
            Filter::DateBucket { bucket, .. } => *bucket == DateBucket::All,
        }
    }

    pub fn matches(&self, record: &Record, now: &Timestamp) -> bool {
        if self.is_noop() {
            return true;
        }
        let actual = record.get(self.field());
        match self {
            Filter::Equality { value, .. } => actual.is_some_and(|a| values_equal(a, value)),
            Filter::Range { min, max, .. } => actual
                .and_then(value::as_number)
                .is_some_and(|n| min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m)),
            Filter::DateBucket { bucket, .. } => bucket.contains(actual, now),
        }
    }
}

pub fn is_all_sentinel(value: &Value) -> bool {
    value.as_str().is_some_and(|s| ALL_SENTINELS.contains(&s))
}

/// Exact JSON equality, falling back to textual comparison for scalars.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (value::as_text(actual), value::as_text(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
