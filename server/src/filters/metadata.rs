//! Parameter metadata
//!
//! Documentation-only view of a filter type: per-field classification and the
//! flat list of query parameters a listing endpoint accepts. Both are derived
//! from [`classify`], the same function the criteria builder uses, and nothing
//! here feeds back into translation.

use serde::Serialize;
use utoipa::ToSchema;

use super::classify::classify;
use super::descriptor::{FilterSpec, SemanticType};
use super::request::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::utils::string::camel_case_to_words;

pub const RANGE_FROM_SUFFIX: &str = "From";
pub const RANGE_TO_SUFFIX: &str = "To";

/// Classification of one declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub name: String,
    pub declared_type: String,
    pub is_identifier: bool,
    pub is_filterable_identifier: bool,
    pub is_rangeable: bool,
}

/// One entry per declared, non-synthetic field of `F`
pub fn field_metadata<F: FilterSpec>() -> Vec<FieldMetadata> {
    F::fields()
        .iter()
        .filter(|f| !f.synthetic)
        .map(|f| {
            let c = classify(f);
            FieldMetadata {
                name: f.name.to_string(),
                declared_type: f.semantic_type.name().to_string(),
                is_identifier: c.is_identifier,
                is_filterable_identifier: c.is_filterable_identifier,
                is_rangeable: c.is_rangeable,
            }
        })
        .collect()
}

/// Schema of a query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSchema {
    String,
    Integer,
    Number,
    Boolean,
    Enum(Vec<String>),
    DateTime,
}

pub fn schema_for(ty: &SemanticType) -> ParameterSchema {
    match ty {
        SemanticType::String => ParameterSchema::String,
        SemanticType::Integer => ParameterSchema::Integer,
        SemanticType::Decimal => ParameterSchema::Number,
        SemanticType::Boolean => ParameterSchema::Boolean,
        SemanticType::Timestamp => ParameterSchema::DateTime,
        SemanticType::Enum(values) => {
            ParameterSchema::Enum(values.iter().map(|v| v.to_string()).collect())
        }
        SemanticType::Collection => ParameterSchema::String,
    }
}

/// An optional query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    pub name: String,
    pub schema: ParameterSchema,
    pub description: String,
    pub default: Option<String>,
}

impl QueryParameter {
    fn new(
        name: impl Into<String>,
        schema: ParameterSchema,
        description: impl Into<String>,
        default: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            description: description.into(),
            default,
        }
    }
}

/// The four pagination parameters every listing accepts
pub fn pagination_parameters() -> Vec<QueryParameter> {
    vec![
        QueryParameter::new(
            "pageNumber",
            ParameterSchema::Integer,
            "Page number (0-based)",
            Some(DEFAULT_PAGE_NUMBER.to_string()),
        ),
        QueryParameter::new(
            "pageSize",
            ParameterSchema::Integer,
            "Number of items per page",
            Some(DEFAULT_PAGE_SIZE.to_string()),
        ),
        QueryParameter::new("sortBy", ParameterSchema::String, "Field to sort by", None),
        QueryParameter::new(
            "sortDirection",
            ParameterSchema::String,
            "Sort direction (ASC or DESC)",
            Some("DESC".to_string()),
        ),
    ]
}

/// Pagination parameters, then one parameter per filterable field of `F`,
/// with `<field>From` / `<field>To` after each rangeable one
pub fn query_parameters<F: FilterSpec>() -> Vec<QueryParameter> {
    let mut params = pagination_parameters();

    for field in F::fields().iter().filter(|f| !f.synthetic) {
        let classification = classify(field);
        if classification.is_excluded() {
            continue;
        }

        let words = camel_case_to_words(field.name);
        let schema = schema_for(&field.semantic_type);
        params.push(QueryParameter::new(
            field.name,
            schema.clone(),
            format!("Filter by {}", words),
            None,
        ));

        if classification.is_rangeable {
            params.push(QueryParameter::new(
                format!("{}{}", field.name, RANGE_FROM_SUFFIX),
                schema.clone(),
                format!("Filter {} from value", words),
                None,
            ));
            params.push(QueryParameter::new(
                format!("{}{}", field.name, RANGE_TO_SUFFIX),
                schema,
                format!("Filter {} to value", words),
                None,
            ));
        }
    }

    params
}
