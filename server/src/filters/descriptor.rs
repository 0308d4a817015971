//! Static field-descriptor tables
//!
//! Filter and entity types declare their fields once, as a `&'static` table of
//! [`FieldDescriptor`]s. The classifier, criteria builder, sort resolution and
//! parameter metadata all read the same table, so they cannot drift apart.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::error::FieldAccessError;

/// Declared semantic type of a filter or entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    String,
    Integer,
    Decimal,
    Boolean,
    Timestamp,
    /// Enumeration with its allowed values (documentation only)
    Enum(&'static [&'static str]),
    Collection,
}

impl SemanticType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Timestamp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Enum(_) => "enum",
            Self::Collection => "collection",
        }
    }
}

/// One entry of a static field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Public field name (camelCase, as seen by API callers)
    pub name: &'static str,
    /// Backing column in the data store
    pub column: &'static str,
    pub semantic_type: SemanticType,
    /// Primary-key marker
    pub primary_key: bool,
    /// Opts an identifier back into equality filtering (never ranges)
    pub filterable_id: bool,
    /// Bookkeeping field that never carries filter data (e.g. a version counter)
    pub synthetic: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, column: &'static str, semantic_type: SemanticType) -> Self {
        Self {
            name,
            column,
            semantic_type,
            primary_key: false,
            filterable_id: false,
            synthetic: false,
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    pub const fn filterable_id(self) -> Self {
        Self {
            filterable_id: true,
            ..self
        }
    }

    pub const fn synthetic(self) -> Self {
        Self {
            synthetic: true,
            ..self
        }
    }
}

/// Look up a field by its public name
pub fn find_field(
    fields: &'static [FieldDescriptor],
    name: &str,
) -> Option<&'static FieldDescriptor> {
    fields.iter().find(|f| f.name == name)
}

/// A caller-supplied filter record.
///
/// `fields()` is the declared table; `read()` returns the current value of one
/// of those fields, `None` when unset.
pub trait FilterSpec {
    fn fields() -> &'static [FieldDescriptor];

    fn read(&self, field: &FieldDescriptor) -> Result<Option<FilterValue>, FieldAccessError>;
}

/// The stored type a filter is evaluated against
pub trait Entity: Send + Unpin + 'static {
    const TABLE: &'static str;

    fn fields() -> &'static [FieldDescriptor];
}

/// A filter value or range bound
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Enum(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Text or list with nothing in it; treated as unset
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
        }
    }

    /// Convert a loosely typed value into the declared type.
    ///
    /// Returns the original value unchanged in `Err` when no conversion applies.
    pub fn coerce_to(self, ty: &SemanticType) -> Result<FilterValue, FilterValue> {
        match (ty, self) {
            (SemanticType::String, v @ Self::Text(_)) => Ok(v),
            (SemanticType::String, Self::Enum(s)) => Ok(Self::Text(s)),

            (SemanticType::Integer, v @ Self::Integer(_)) => Ok(v),
            (SemanticType::Integer, Self::Text(s)) => {
                s.trim().parse::<i64>().map(Self::Integer).map_err(|_| Self::Text(s))
            }

            (SemanticType::Decimal, v @ Self::Decimal(_)) => Ok(v),
            (SemanticType::Decimal, Self::Integer(i)) => Ok(Self::Decimal(i as f64)),
            (SemanticType::Decimal, Self::Text(s)) => match s.trim().parse::<f64>() {
                Ok(d) if d.is_finite() => Ok(Self::Decimal(d)),
                _ => Err(Self::Text(s)),
            },

            (SemanticType::Boolean, v @ Self::Boolean(_)) => Ok(v),
            (SemanticType::Boolean, Self::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Boolean(true)),
                "false" => Ok(Self::Boolean(false)),
                _ => Err(Self::Text(s)),
            },

            (SemanticType::Timestamp, v @ Self::Timestamp(_)) => Ok(v),
            (SemanticType::Timestamp, Self::Integer(secs)) => {
                DateTime::from_timestamp(secs, 0)
                    .map(Self::Timestamp)
                    .ok_or(Self::Integer(secs))
            }
            (SemanticType::Timestamp, Self::Text(s)) => parse_timestamp(&s)
                .map(Self::Timestamp)
                .ok_or(Self::Text(s)),

            (SemanticType::Enum(_), v @ Self::Enum(_)) => Ok(v),
            (SemanticType::Enum(_), Self::Text(s)) => Ok(Self::Enum(s)),

            (SemanticType::Collection, v @ Self::List(_)) => Ok(v),
            (SemanticType::Collection, scalar) => Ok(Self::List(vec![scalar])),

            (_, v) => Err(v),
        }
    }
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at midnight UTC
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for FilterValue {
    fn from(d: f64) -> Self {
        Self::Decimal(d)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(dt)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Wire form: JSON scalars and arrays, no type tags
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterValue {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    List(Vec<RawFilterValue>),
}

impl From<RawFilterValue> for FilterValue {
    fn from(raw: RawFilterValue) -> Self {
        match raw {
            RawFilterValue::Boolean(b) => Self::Boolean(b),
            RawFilterValue::Integer(i) => Self::Integer(i),
            RawFilterValue::Decimal(d) => Self::Decimal(d),
            RawFilterValue::Text(s) => Self::Text(s),
            RawFilterValue::List(items) => Self::List(items.into_iter().map(Into::into).collect()),
        }
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawFilterValue::deserialize(deserializer).map(Into::into)
    }
}
