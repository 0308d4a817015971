//! Shared fixtures for filter engine tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::descriptor::{Entity, FieldDescriptor, FilterSpec, FilterValue, SemanticType};
use super::error::FieldAccessError;
use crate::data::DataError;
use crate::data::sql::{SqlDialect, SqliteDialect, Statement};
use crate::data::traits::DataAccess;

pub const TIERS: &[&str] = &["bronze", "silver", "gold"];

pub static SAMPLE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", "id", SemanticType::Integer).primary_key(),
    FieldDescriptor::new("filterableId", "filterable_id", SemanticType::Integer).filterable_id(),
    FieldDescriptor::new("ownerId", "owner_id", SemanticType::Integer),
    FieldDescriptor::new("name", "name", SemanticType::String),
    FieldDescriptor::new("count", "count", SemanticType::Integer),
    FieldDescriptor::new("active", "active", SemanticType::Boolean),
    FieldDescriptor::new("tier", "tier", SemanticType::Enum(TIERS)),
    FieldDescriptor::new("createdDate", "created_date", SemanticType::Timestamp),
    FieldDescriptor::new("tags", "tags", SemanticType::Collection),
    FieldDescriptor::new("version", "version", SemanticType::Integer).synthetic(),
];

/// Filter over [`SampleEntity`]; every field optional
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFilter {
    pub id: Option<i64>,
    pub filterable_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub name: Option<String>,
    pub count: Option<i64>,
    pub active: Option<bool>,
    pub tier: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub version: Option<i64>,
}

impl FilterSpec for SampleFilter {
    fn fields() -> &'static [FieldDescriptor] {
        SAMPLE_FIELDS
    }

    fn read(&self, field: &FieldDescriptor) -> Result<Option<FilterValue>, FieldAccessError> {
        Ok(match field.name {
            "id" => self.id.map(FilterValue::from),
            "filterableId" => self.filterable_id.map(FilterValue::from),
            "ownerId" => self.owner_id.map(FilterValue::from),
            "name" => self.name.clone().map(FilterValue::from),
            "count" => self.count.map(FilterValue::from),
            "active" => self.active.map(FilterValue::from),
            "tier" => self.tier.clone().map(FilterValue::Enum),
            "createdDate" => self.created_date.map(FilterValue::from),
            "tags" => self.tags.clone().map(FilterValue::from),
            "version" => self.version.map(FilterValue::from),
            other => return Err(FieldAccessError::unreadable(other)),
        })
    }
}

/// Entity whose table matches [`SAMPLE_FIELDS`]; carries a label to check ordering
#[derive(Debug, Clone, PartialEq)]
pub struct SampleEntity(pub &'static str);

impl Entity for SampleEntity {
    const TABLE: &'static str = "samples";

    fn fields() -> &'static [FieldDescriptor] {
        SAMPLE_FIELDS
    }
}

/// Declares a field that `read` does not know about
pub static BROKEN_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name", "name", SemanticType::String),
    FieldDescriptor::new("ghost", "ghost", SemanticType::String),
    FieldDescriptor::new("count", "count", SemanticType::Integer),
];

pub struct BrokenFilter;

impl FilterSpec for BrokenFilter {
    fn fields() -> &'static [FieldDescriptor] {
        BROKEN_FIELDS
    }

    fn read(&self, field: &FieldDescriptor) -> Result<Option<FilterValue>, FieldAccessError> {
        match field.name {
            "name" => Ok(Some(FilterValue::from("abc"))),
            "count" => Ok(Some(FilterValue::Boolean(true))),
            other => Err(FieldAccessError::unreadable(other)),
        }
    }
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Failure {
    None,
    Fetch,
    Count,
}

/// In-memory [`DataAccess`] that returns canned rows and records statements
pub struct MockStore {
    rows: Vec<&'static str>,
    total: u64,
    failure: Failure,
    seen: Mutex<Vec<Statement>>,
}

impl MockStore {
    pub fn with_rows(rows: Vec<&'static str>, total: u64) -> Self {
        Self {
            rows,
            total,
            failure: Failure::None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_fetch() -> Self {
        Self {
            failure: Failure::Fetch,
            ..Self::with_rows(vec![], 0)
        }
    }

    pub fn failing_count() -> Self {
        Self {
            failure: Failure::Count,
            ..Self::with_rows(vec!["a"], 0)
        }
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataAccess<SampleEntity> for MockStore {
    fn dialect(&self) -> &'static dyn SqlDialect {
        &SqliteDialect
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<SampleEntity>, DataError> {
        self.seen.lock().unwrap().push(statement.clone());
        if self.failure == Failure::Fetch {
            return Err(DataError::from_sqlite(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.iter().copied().map(SampleEntity).collect())
    }

    async fn count(&self, statement: &Statement) -> Result<u64, DataError> {
        self.seen.lock().unwrap().push(statement.clone());
        if self.failure == Failure::Count {
            return Err(DataError::from_sqlite(sqlx::Error::PoolClosed));
        }
        Ok(self.total)
    }
}
