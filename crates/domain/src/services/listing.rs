//! List-view derivation: search, sort, then slice into a page.
//!
//! Every list endpoint loads its collection and runs it through
//! [`apply_view`]; nothing is cached between requests.

use chrono::{DateTime, NaiveDate, Utc};
use shared::pagination::{paginate, Page, PageRequest};
use shared::search::matches_any;
use std::cmp::Ordering;
use thiserror::Error;

use crate::models::listing::{ListQuery, SortOrder};

/// Error raised for a malformed view request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Cannot sort by '{field}'. Allowed fields: {allowed}")]
    UnknownSortField { field: String, allowed: String },
}

/// A comparable value extracted from a record for sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Time(DateTime<Utc>),
    Flag(bool),
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            (SortValue::Flag(a), SortValue::Flag(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A record that can be shown in a list view.
pub trait Listable {
    /// Field names accepted by `sort`.
    const SORT_FIELDS: &'static [&'static str];

    /// Text the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a sortable field; `None` for unknown fields.
    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

/// Page-size bounds applied to list requests.
#[derive(Debug, Clone, Copy)]
pub struct ViewLimits {
    pub default_per_page: usize,
    pub max_per_page: usize,
}

impl Default for ViewLimits {
    fn default() -> Self {
        Self {
            default_per_page: shared::pagination::DEFAULT_PAGE_SIZE,
            max_per_page: shared::pagination::MAX_PAGE_SIZE,
        }
    }
}

/// Filters `items` by the search term, sorts them if requested and returns
/// the requested page.
///
/// Sorting is stable, so records with equal keys keep their store order.
pub fn apply_view<T: Listable>(
    items: Vec<T>,
    query: &ListQuery,
    limits: ViewLimits,
) -> Result<Page<T>, ViewError> {
    let search = query.search.as_deref();
    let mut filtered: Vec<T> = items
        .into_iter()
        .filter(|item| matches_any(search, item.search_fields()))
        .collect();

    if let Some(field) = query.sort.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        if !T::SORT_FIELDS.contains(&field) {
            return Err(ViewError::UnknownSortField {
                field: field.to_string(),
                allowed: T::SORT_FIELDS.join(", "),
            });
        }

        let descending = query.order.unwrap_or_default() == SortOrder::Desc;
        filtered.sort_by(|a, b| {
            let ordering = match (a.sort_value(field), b.sort_value(field)) {
                (Some(x), Some(y)) => x.compare(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    let request = PageRequest::new(
        query.page,
        query.per_page,
        limits.default_per_page,
        limits.max_per_page,
    );
    Ok(paginate(filtered, request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: String,
        amount: f64,
    }

    impl Listable for Item {
        const SORT_FIELDS: &'static [&'static str] = &["name", "amount"];

        fn search_fields(&self) -> Vec<&str> {
            vec![self.name.as_str()]
        }

        fn sort_value(&self, field: &str) -> Option<SortValue> {
            match field {
                "name" => Some(SortValue::text(&self.name)),
                "amount" => Some(SortValue::Number(self.amount)),
                _ => None,
            }
        }
    }

    fn items() -> Vec<Item> {
        [("Water well", 50.0), ("winter Clothes", 10.0), ("Books", 30.0), ("Warm meals", 20.0)]
            .into_iter()
            .map(|(name, amount)| Item {
                name: name.to_string(),
                amount,
            })
            .collect()
    }

    fn names(page: &Page<Item>) -> Vec<&str> {
        page.data.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_no_query_keeps_store_order() {
        let page = apply_view(items(), &ListQuery::default(), ViewLimits::default()).unwrap();
        assert_eq!(names(&page), vec!["Water well", "winter Clothes", "Books", "Warm meals"]);
        assert_eq!(page.pagination.total, 4);
    }

    #[test]
    fn test_search_filters_before_paging() {
        let query = ListQuery {
            search: Some("w".to_string()),
            per_page: Some(2),
            page: Some(2),
            ..Default::default()
        };
        let page = apply_view(items(), &query, ViewLimits::default()).unwrap();

        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(names(&page), vec!["Warm meals"]);
    }

    #[test]
    fn test_sort_text_is_case_insensitive() {
        let query = ListQuery {
            sort: Some("name".to_string()),
            ..Default::default()
        };
        let page = apply_view(items(), &query, ViewLimits::default()).unwrap();
        assert_eq!(names(&page), vec!["Books", "Warm meals", "Water well", "winter Clothes"]);
    }

    #[test]
    fn test_sort_descending_numbers() {
        let query = ListQuery {
            sort: Some("amount".to_string()),
            order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let page = apply_view(items(), &query, ViewLimits::default()).unwrap();
        assert_eq!(names(&page), vec!["Water well", "Books", "Warm meals", "winter Clothes"]);
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let query = ListQuery {
            sort: Some("password".to_string()),
            ..Default::default()
        };
        let err = apply_view(items(), &query, ViewLimits::default()).unwrap_err();
        assert_eq!(
            err,
            ViewError::UnknownSortField {
                field: "password".to_string(),
                allowed: "name, amount".to_string(),
            }
        );
    }

    #[test]
    fn test_per_page_is_capped() {
        let query = ListQuery {
            per_page: Some(1000),
            ..Default::default()
        };
        let limits = ViewLimits {
            default_per_page: 2,
            max_per_page: 3,
        };
        let page = apply_view(items(), &query, limits).unwrap();
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.pagination.per_page, 3);
    }
}
