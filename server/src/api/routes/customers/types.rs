//! Customer API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::data::types::{CUSTOMER_TIERS, CustomerRow};
use crate::filters::{
    FieldAccessError, FieldDescriptor, FieldMetadata, FilterSpec, FilterValue, SemanticType,
};

/// Filterable customer fields.
///
/// Mirrors the `customers` table, plus `tiers` which matches any of several
/// tiers against the same column.
pub static CUSTOMER_FILTER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", "id", SemanticType::Integer).primary_key(),
    FieldDescriptor::new("externalId", "external_id", SemanticType::String).filterable_id(),
    FieldDescriptor::new("accountId", "account_id", SemanticType::Integer),
    FieldDescriptor::new("name", "name", SemanticType::String),
    FieldDescriptor::new("email", "email", SemanticType::String),
    FieldDescriptor::new("active", "active", SemanticType::Boolean),
    FieldDescriptor::new("tier", "tier", SemanticType::Enum(CUSTOMER_TIERS)),
    FieldDescriptor::new("tiers", "tier", SemanticType::Collection),
    FieldDescriptor::new("balance", "balance", SemanticType::Decimal),
    FieldDescriptor::new("orderCount", "order_count", SemanticType::Integer),
    FieldDescriptor::new("createdDate", "created_at", SemanticType::Timestamp),
];

/// Customer filter; every field optional, absent fields do not filter
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFilter {
    /// Primary key; accepted but never filtered on
    pub id: Option<i64>,
    /// Exact match
    pub external_id: Option<String>,
    /// Foreign key; accepted but never filtered on
    pub account_id: Option<i64>,
    /// Case-insensitive substring match
    pub name: Option<String>,
    /// Case-insensitive substring match
    pub email: Option<String>,
    pub active: Option<bool>,
    pub tier: Option<String>,
    /// Any of these tiers; comma-separated in a query string
    #[serde(default, deserialize_with = "one_or_many")]
    pub tiers: Option<Vec<String>>,
    pub balance: Option<f64>,
    pub order_count: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
}

impl FilterSpec for CustomerFilter {
    fn fields() -> &'static [FieldDescriptor] {
        CUSTOMER_FILTER_FIELDS
    }

    fn read(&self, field: &FieldDescriptor) -> Result<Option<FilterValue>, FieldAccessError> {
        Ok(match field.name {
            "id" => self.id.map(FilterValue::from),
            "externalId" => self.external_id.clone().map(FilterValue::from),
            "accountId" => self.account_id.map(FilterValue::from),
            "name" => self.name.clone().map(FilterValue::from),
            "email" => self.email.clone().map(FilterValue::from),
            "active" => self.active.map(FilterValue::from),
            "tier" => self.tier.clone().map(FilterValue::Enum),
            "tiers" => self.tiers.clone().map(FilterValue::from),
            "balance" => self.balance.map(FilterValue::from),
            "orderCount" => self.order_count.map(FilterValue::from),
            "createdDate" => self.created_date.map(FilterValue::from),
            other => return Err(FieldAccessError::unreadable(other)),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// A JSON array, or a single comma-separated string (query-string form)
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    let raw = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(raw.map(|raw| match raw {
        OneOrMany::One(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        OneOrMany::Many(items) => items,
    }))
}

/// Customer DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: i64,
    pub external_id: String,
    pub account_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    pub tier: String,
    pub balance: f64,
    pub order_count: i64,
    pub created_date: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerDto {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            account_id: row.account_id,
            name: row.name,
            email: row.email,
            active: row.active,
            tier: row.tier,
            balance: row.balance,
            order_count: row.order_count,
            created_date: DateTime::from_timestamp(row.created_at, 0).unwrap_or_default(),
        }
    }
}

/// Response for the filter metadata endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterMetadataResponse {
    pub fields: Vec<FieldMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{CriteriaBuilder, RangeTable, find_field};

    #[test]
    fn test_filter_deserializes_from_json() {
        let filter: CustomerFilter = serde_json::from_str(
            r#"{"name": "jo", "active": true, "tiers": ["gold", "silver"], "orderCount": 3}"#,
        )
        .unwrap();
        assert_eq!(filter.name.as_deref(), Some("jo"));
        assert_eq!(filter.active, Some(true));
        assert_eq!(filter.tiers, Some(vec!["gold".to_string(), "silver".to_string()]));
        assert_eq!(filter.order_count, Some(3));
    }

    #[test]
    fn test_tiers_accepts_comma_separated_string() {
        let filter: CustomerFilter = serde_json::from_str(r#"{"tiers": "gold, silver,"}"#).unwrap();
        assert_eq!(filter.tiers, Some(vec!["gold".to_string(), "silver".to_string()]));
    }

    #[test]
    fn test_every_declared_field_is_readable() {
        let filter = CustomerFilter::default();
        for field in CUSTOMER_FILTER_FIELDS {
            assert_eq!(filter.read(field), Ok(None), "{}", field.name);
        }
    }

    #[test]
    fn test_identifiers_never_filter() {
        let filter = CustomerFilter {
            id: Some(1),
            account_id: Some(2),
            external_id: Some("CUST-00001".to_string()),
            ..Default::default()
        };
        let criteria = CriteriaBuilder::for_entity::<CustomerRow>().build(&filter, &RangeTable::new());
        assert_eq!(criteria.predicates.len(), 1);
        assert_eq!(criteria.predicates[0].field().name, "externalId");
    }

    #[test]
    fn test_tiers_share_the_tier_column() {
        let tiers = find_field(CUSTOMER_FILTER_FIELDS, "tiers").unwrap();
        let tier = find_field(CUSTOMER_FILTER_FIELDS, "tier").unwrap();
        assert_eq!(tiers.column, tier.column);
    }

    #[test]
    fn test_dto_from_row() {
        let row = CustomerRow {
            id: 7,
            external_id: "CUST-00007".to_string(),
            account_id: 3,
            name: "Ada Lovelace".to_string(),
            email: None,
            active: true,
            tier: "gold".to_string(),
            balance: 12.5,
            order_count: 4,
            created_at: 1_704_067_200,
            version: 1,
        };
        let dto = CustomerDto::from(row);
        assert_eq!(dto.created_date.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["externalId"], "CUST-00007");
        assert_eq!(json["orderCount"], 4);
        assert!(json.get("version").is_none());
    }
}
