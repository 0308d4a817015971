//! Row types shared by the transactional backends (SQLite, PostgreSQL)

use serde::{Deserialize, Serialize};

use crate::filters::{Entity, FieldDescriptor, SemanticType};

// ============================================================================
// Customer types
// ============================================================================

/// Values accepted in the `tier` column
pub const CUSTOMER_TIERS: &[&str] = &["bronze", "silver", "gold"];

/// Field table for the `customers` table. Names are the API (camelCase) names.
pub static CUSTOMER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("id", "id", SemanticType::Integer).primary_key(),
    FieldDescriptor::new("externalId", "external_id", SemanticType::String).filterable_id(),
    FieldDescriptor::new("accountId", "account_id", SemanticType::Integer),
    FieldDescriptor::new("name", "name", SemanticType::String),
    FieldDescriptor::new("email", "email", SemanticType::String),
    FieldDescriptor::new("active", "active", SemanticType::Boolean),
    FieldDescriptor::new("tier", "tier", SemanticType::Enum(CUSTOMER_TIERS)),
    FieldDescriptor::new("balance", "balance", SemanticType::Decimal),
    FieldDescriptor::new("orderCount", "order_count", SemanticType::Integer),
    FieldDescriptor::new("createdDate", "created_at", SemanticType::Timestamp),
    FieldDescriptor::new("version", "version", SemanticType::Integer).synthetic(),
];

/// Customer row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub external_id: String,
    pub account_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    pub tier: String,
    pub balance: f64,
    pub order_count: i64,
    /// Unix seconds
    pub created_at: i64,
    pub version: i64,
}

impl Entity for CustomerRow {
    const TABLE: &'static str = "customers";

    fn fields() -> &'static [FieldDescriptor] {
        CUSTOMER_FIELDS
    }
}

/// Customer to insert; the store assigns `id` and `version`
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub external_id: String,
    pub account_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    pub tier: String,
    pub balance: f64,
    pub order_count: i64,
    pub created_at: i64,
}
