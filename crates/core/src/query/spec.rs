//! Query descriptions: what to search, filter, sort and which page to show.

use serde::{Deserialize, Serialize};

use super::filter::Filter;
use crate::config::QueryDefaults;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// A validated, immutable view description over a collection.
///
/// Only constructible through [`QuerySpec::builder`] or
/// [`QueryParams::into_spec`], both of which reject a non-positive page size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    search_text: String,
    search_fields: Vec<String>,
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
}

impl QuerySpec {
    pub fn builder() -> QuerySpecBuilder {
        QuerySpecBuilder::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Requested page (1-based). Out-of-range values are clamped when run.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[derive(Debug, Clone)]
pub struct QuerySpecBuilder {
    search_text: String,
    search_fields: Vec<String>,
    filters: Vec<Filter>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: i64,
}

impl Default for QuerySpecBuilder {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            search_fields: Vec::new(),
            filters: Vec::new(),
            sort: None,
            page: 1,
            page_size: QueryDefaults::default().default_page_size as i64,
        }
    }
}

impl QuerySpecBuilder {
    /// Free-text search over `fields`; empty text disables searching.
    pub fn search<I, S>(mut self, text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_text = text.into();
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        self.filters.extend(filters);
        self
    }

    /// Sort by `key`; an empty key leaves the input order untouched.
    pub fn sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        let key = key.into();
        self.sort = (!key.is_empty()).then_some(SortSpec { key, direction });
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn build(self) -> Result<QuerySpec, CoreError> {
        let page_size = usize::try_from(self.page_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "Page size must be positive, got {}",
                    self.page_size
                ))
            })?;

        for filter in &self.filters {
            if let Filter::Range {
                field,
                min: Some(min),
                max: Some(max),
            } = filter
            {
                if min > max {
                    return Err(CoreError::Config(format!(
                        "Range filter on '{field}' has min {min} greater than max {max}"
                    )));
                }
            }
        }

        Ok(QuerySpec {
            search_text: self.search_text,
            search_fields: self.search_fields,
            filters: self.filters,
            sort: self.sort,
            page: self.page,
            page_size,
        })
    }
}

/// Loosely-typed query parameters, as deserialized from callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub search_text: String,
    pub search_fields: Vec<String>,
    pub filters: Vec<Filter>,
    pub sort_key: Option<String>,
    pub sort_direction: SortDirection,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl QueryParams {
    /// Validate into a [`QuerySpec`].
    ///
    /// A missing page size takes `defaults.default_page_size`; one above
    /// `defaults.max_page_size` is clamped to it. Negative pages become 0,
    /// which the engine clamps to the first page.
    pub fn into_spec(self, defaults: &QueryDefaults) -> Result<QuerySpec, CoreError> {
        let max = defaults.max_page_size as i64;
        let page_size = match self.page_size {
            None => defaults.default_page_size as i64,
            Some(n) if n > max => {
                tracing::warn!(requested = n, max, "Clamping page size to maximum");
                max
            }
            Some(n) => n,
        };
        let page = usize::try_from(self.page.unwrap_or(1).max(0)).unwrap_or(usize::MAX);

        let mut builder = QuerySpec::builder()
            .search(self.search_text, self.search_fields)
            .filters(self.filters)
            .page(page)
            .page_size(page_size);
        if let Some(key) = self.sort_key {
            builder = builder.sort(key, self.sort_direction);
        }
        builder.build()
    }
}

impl TryFrom<QueryParams> for QuerySpec {
    type Error = CoreError;

    fn try_from(params: QueryParams) -> Result<Self, Self::Error> {
        params.into_spec(&QueryDefaults::default())
    }
}
