//! Search → filter → sort → paginate over an in-memory collection.

use std::cmp::Ordering;

use chrono::{FixedOffset, Local};
use serde::Serialize;
use serde_json::Value;

use super::spec::{QuerySpec, SortDirection, SortSpec};
use crate::types::{Record, Timestamp};
use crate::value;

/// One page of matches, borrowed from the queried collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<'a> {
    pub items: Vec<&'a Record>,
    pub total_matched: usize,
    pub total_pages: usize,
    /// The page actually returned, after clamping.
    pub page: usize,
}

/// Run `spec` against `collection` using the local clock for date buckets.
pub fn run<'a>(collection: &'a [Record], spec: &QuerySpec) -> QueryResult<'a> {
    run_at(collection, spec, Local::now().fixed_offset())
}

/// Run `spec` against `collection` with an explicit clock.
///
/// Date buckets compare against `now`, and timestamps without an offset are
/// read in `now`'s offset.
pub fn run_at<'a>(collection: &'a [Record], spec: &QuerySpec, now: Timestamp) -> QueryResult<'a> {
    let needle = spec.search_text().to_lowercase();

    let searched: Vec<&Record> = collection
        .iter()
        .filter(|record| matches_search(record, &needle, spec.search_fields()))
        .collect();
    let searched_count = searched.len();

    let mut matched: Vec<&Record> = searched
        .into_iter()
        .filter(|record| spec.filters().iter().all(|f| f.matches(record, &now)))
        .collect();

    if let Some(sort) = spec.sort() {
        matched = sort_records(matched, sort, now.offset());
    }

    let result = paginate(matched, spec.page(), spec.page_size());
    tracing::debug!(
        collection = collection.len(),
        searched = searched_count,
        matched = result.total_matched,
        page = result.page,
        total_pages = result.total_pages,
        "Ran query"
    );
    result
}

/// Case-insensitive substring match on any search field. Only an empty
/// needle matches everything; whitespace is searched for like any other text.
fn matches_search(record: &Record, needle: &str, fields: &[String]) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| {
        record
            .get(field)
            .and_then(value::as_text)
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// A comparable projection of one sort-key value.
///
/// Every present value in a column is projected the same way (see
/// [`column_kind`]), which keeps the comparison a total order.
#[derive(Debug, Clone)]
enum SortKey {
    Number(f64),
    Time(Timestamp),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Time(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Number,
    Time,
    Text,
}

/// Numbers and numeric strings sort numerically, timestamp strings
/// chronologically, anything else case-insensitively as text.
fn column_kind(values: &[Option<&Value>], offset: &FixedOffset) -> ColumnKind {
    let present = || values.iter().flatten();
    if present().all(|v| value::as_number(v).is_some()) {
        ColumnKind::Number
    } else if present().all(|v| value::parse_timestamp(v, offset).is_some()) {
        ColumnKind::Time
    } else {
        ColumnKind::Text
    }
}

fn sort_key(value: &Value, kind: ColumnKind, offset: &FixedOffset) -> Option<SortKey> {
    match kind {
        ColumnKind::Number => value::as_number(value).map(SortKey::Number),
        ColumnKind::Time => value::parse_timestamp(value, offset).map(SortKey::Time),
        ColumnKind::Text => value::as_text(value).map(|t| SortKey::Text(t.to_lowercase())),
    }
}

/// Stable sort; records with no usable key go last in either direction.
fn sort_records<'a>(
    records: Vec<&'a Record>,
    sort: &SortSpec,
    offset: &FixedOffset,
) -> Vec<&'a Record> {
    let values: Vec<Option<&Value>> = records
        .iter()
        .map(|&record| record.get(&sort.key).filter(|v| !v.is_null()))
        .collect();
    let kind = column_kind(&values, offset);

    let mut keyed: Vec<(Option<SortKey>, &'a Record)> = values
        .iter()
        .map(|v| v.and_then(|v| sort_key(v, kind, offset)))
        .zip(records)
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match sort.direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => b.compare(a),
        },
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

fn paginate(matched: Vec<&Record>, page: usize, page_size: usize) -> QueryResult<'_> {
    let total_matched = matched.len();
    let total_pages = total_matched.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let items = matched
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    QueryResult {
        items,
        total_matched,
        total_pages,
        page,
    }
}
