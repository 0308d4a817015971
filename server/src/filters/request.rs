//! Request shapes: pagination, sort and the combined filter request

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use super::range::RangeTable;

/// Largest page size accepted at the HTTP boundary
pub const MAX_PAGE_SIZE: u32 = 500;
pub const DEFAULT_PAGE_NUMBER: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Case-insensitive; anything other than "asc" sorts descending
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn is_desc(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Validator function for pageSize
pub fn validate_page_size(size: u32) -> Result<(), ValidationError> {
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ValidationError::new("page_size_range")
            .with_message(format!("pageSize must be between 1 and {}", MAX_PAGE_SIZE).into()));
    }
    Ok(())
}

fn default_page_number() -> u32 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSpec {
    /// Page number (0-based)
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    /// Number of items per page
    #[serde(default = "default_page_size")]
    #[validate(custom(function = "validate_page_size"))]
    pub page_size: u32,
    /// Field to sort by
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl Default for PaginationSpec {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl PaginationSpec {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_direction = direction;
        self
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip; never above `i64::MAX`, the widest offset SQL backends bind
    pub fn offset(&self) -> u64 {
        (self.page_number as u64)
            .saturating_mul(self.page_size as u64)
            .min(i64::MAX as u64)
    }
}

/// Everything a caller sends for one filtered listing. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest<F> {
    pub filters: Option<F>,
    pub range_filters: Option<RangeTable>,
    pub pagination: Option<PaginationSpec>,
}

impl<F> Default for FilterRequest<F> {
    fn default() -> Self {
        Self {
            filters: None,
            range_filters: None,
            pagination: None,
        }
    }
}

impl<F> FilterRequest<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: F) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_ranges(mut self, ranges: RangeTable) -> Self {
        self.range_filters = Some(ranges);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationSpec) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Pagination, or the defaults when none was sent
    pub fn pagination(&self) -> PaginationSpec {
        self.pagination.clone().unwrap_or_default()
    }
}
