//! Caller-owned list-view state.
//!
//! Each list screen keeps one of these structs as its UI state and rebuilds a
//! [`QuerySpec`] from it on every change. Changing the search text or a
//! filter sends the view back to page 1.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::query::{DateBucket, Filter, QuerySpec, SortDirection};

/// Equality-filter value that disables a categorical filter.
pub const ALL: &str = "All";

pub const ACTIVITY_LOG_PAGE_SIZE: i64 = 10;
pub const MENTOR_DIRECTORY_PAGE_SIZE: i64 = 6;
pub const RESOURCE_CATALOG_PAGE_SIZE: i64 = 9;

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// Admin activity log. The source collection is already most-recent-first,
/// so no explicit sort is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogView {
    pub search: String,
    pub action_type: String,
    pub date_range: DateBucket,
    pub page: usize,
}

impl Default for ActivityLogView {
    fn default() -> Self {
        Self {
            search: String::new(),
            action_type: ALL.to_string(),
            date_range: DateBucket::All,
            page: 1,
        }
    }
}

impl ActivityLogView {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["user", "description"];

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_action_type(&mut self, action_type: impl Into<String>) {
        self.action_type = action_type.into();
        self.page = 1;
    }

    pub fn set_date_range(&mut self, date_range: DateBucket) {
        self.date_range = date_range;
        self.page = 1;
    }

    pub fn to_query_spec(&self) -> Result<QuerySpec, CoreError> {
        QuerySpec::builder()
            .search(self.search.as_str(), Self::SEARCH_FIELDS.iter().copied())
            .filter(Filter::equality("action_type", self.action_type.as_str()))
            .filter(Filter::date_bucket("timestamp", self.date_range))
            .page(self.page)
            .page_size(ACTIVITY_LOG_PAGE_SIZE)
            .build()
    }
}

// ---------------------------------------------------------------------------
// Mentor directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorSort {
    #[default]
    Rating,
    PriceLowToHigh,
    PriceHighToLow,
    Experience,
}

impl MentorSort {
    fn key(self) -> (&'static str, SortDirection) {
        match self {
            MentorSort::Rating => ("rating", SortDirection::Desc),
            MentorSort::PriceLowToHigh => ("price", SortDirection::Asc),
            MentorSort::PriceHighToLow => ("price", SortDirection::Desc),
            MentorSort::Experience => ("experience_years", SortDirection::Desc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorDirectoryView {
    pub search: String,
    pub expertise: String,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub sort: MentorSort,
    pub page: usize,
}

impl Default for MentorDirectoryView {
    fn default() -> Self {
        Self {
            search: String::new(),
            expertise: ALL.to_string(),
            max_price: None,
            min_rating: None,
            sort: MentorSort::default(),
            page: 1,
        }
    }
}

impl MentorDirectoryView {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["name", "expertise", "bio"];

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_expertise(&mut self, expertise: impl Into<String>) {
        self.expertise = expertise.into();
        self.page = 1;
    }

    pub fn set_max_price(&mut self, max_price: Option<f64>) {
        self.max_price = max_price;
        self.page = 1;
    }

    pub fn set_min_rating(&mut self, min_rating: Option<f64>) {
        self.min_rating = min_rating;
        self.page = 1;
    }

    /// Re-sorting keeps the current page.
    pub fn set_sort(&mut self, sort: MentorSort) {
        self.sort = sort;
    }

    pub fn to_query_spec(&self) -> Result<QuerySpec, CoreError> {
        let (key, direction) = self.sort.key();
        QuerySpec::builder()
            .search(self.search.as_str(), Self::SEARCH_FIELDS.iter().copied())
            .filter(Filter::equality("expertise", self.expertise.as_str()))
            .filter(Filter::range("price", None, self.max_price))
            .filter(Filter::range("rating", self.min_rating, None))
            .sort(key, direction)
            .page(self.page)
            .page_size(MENTOR_DIRECTORY_PAGE_SIZE)
            .build()
    }
}

// ---------------------------------------------------------------------------
// Resource catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSort {
    #[default]
    Newest,
    Title,
    Popular,
}

impl ResourceSort {
    fn key(self) -> (&'static str, SortDirection) {
        match self {
            ResourceSort::Newest => ("published_at", SortDirection::Desc),
            ResourceSort::Title => ("title", SortDirection::Asc),
            ResourceSort::Popular => ("downloads", SortDirection::Desc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceCatalogView {
    pub search: String,
    pub category: String,
    pub resource_type: String,
    pub sort: ResourceSort,
    pub page: usize,
}

impl Default for ResourceCatalogView {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.to_string(),
            resource_type: ALL.to_string(),
            sort: ResourceSort::default(),
            page: 1,
        }
    }
}

impl ResourceCatalogView {
    pub const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "author"];

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.page = 1;
    }

    pub fn set_resource_type(&mut self, resource_type: impl Into<String>) {
        self.resource_type = resource_type.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: ResourceSort) {
        self.sort = sort;
    }

    pub fn to_query_spec(&self) -> Result<QuerySpec, CoreError> {
        let (key, direction) = self.sort.key();
        QuerySpec::builder()
            .search(self.search.as_str(), Self::SEARCH_FIELDS.iter().copied())
            .filter(Filter::equality("category", self.category.as_str()))
            .filter(Filter::equality("type", self.resource_type.as_str()))
            .sort(key, direction)
            .page(self.page)
            .page_size(RESOURCE_CATALOG_PAGE_SIZE)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortSpec;
    use assert_matches::assert_matches;

    #[test]
    fn default_activity_view_has_only_noop_filters() {
        let spec = ActivityLogView::default().to_query_spec().unwrap();
        assert!(spec.filters().iter().all(Filter::is_noop));
        assert!(spec.sort().is_none());
        assert_eq!(spec.page_size(), 10);
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut view = ActivityLogView {
            page: 4,
            ..ActivityLogView::default()
        };
        view.set_date_range(DateBucket::Today);
        assert_eq!(view.page, 1);

        let mut mentors = MentorDirectoryView {
            page: 3,
            ..MentorDirectoryView::default()
        };
        mentors.set_sort(MentorSort::Experience);
        assert_eq!(mentors.page, 3);
        mentors.set_expertise("Data Science");
        assert_eq!(mentors.page, 1);
    }

    #[test]
    fn mentor_sort_maps_to_field_and_direction() {
        let view = MentorDirectoryView {
            sort: MentorSort::PriceLowToHigh,
            max_price: Some(50.0),
            ..MentorDirectoryView::default()
        };
        let spec = view.to_query_spec().unwrap();
        assert_eq!(
            spec.sort(),
            Some(&SortSpec {
                key: "price".to_string(),
                direction: SortDirection::Asc
            })
        );
        assert!(spec
            .filters()
            .contains(&Filter::range("price", None, Some(50.0))));
    }

    #[test]
    fn resource_view_filters_category_and_type() {
        let mut view = ResourceCatalogView::default();
        view.set_category("Research");
        view.set_resource_type("PDF");
        let spec = view.to_query_spec().unwrap();
        assert_eq!(
            spec.filters(),
            [
                Filter::equality("category", "Research"),
                Filter::equality("type", "PDF"),
            ]
        );
    }

    #[test]
    fn mentor_rating_floor_is_open_ended_range() {
        let view = MentorDirectoryView {
            min_rating: Some(4.0),
            ..MentorDirectoryView::default()
        };
        let spec = view.to_query_spec();
        assert_matches!(
            spec,
            Ok(spec) if spec.filters().contains(&Filter::range("rating", Some(4.0), None))
        );
    }
}
