//! Request extractors for filtered listings
//!
//! Two ways to submit a [`FilterRequest`]:
//!
//! | Extractor        | Source        | Range bounds                 |
//! |------------------|---------------|------------------------------|
//! | `FilterQuery<F>` | query string  | `<field>From` / `<field>To`  |
//! | `FilterBody<F>`  | JSON body     | `rangeFilters` object        |
//!
//! Both validate the pagination block and reject it with 400
//! `VALIDATION_ERROR`. Query-string filter values are never rejected: a value
//! that does not fit its field's type is logged and only that field is dropped.

use std::collections::HashMap;
use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use crate::filters::{
    FieldAccessError, FilterRequest, FilterSpec, FilterValue, PaginationSpec, RANGE_FROM_SUFFIX,
    RANGE_TO_SUFFIX, Range, RangeTable, SemanticType, classify,
};

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Failed to parse query string
    Query(QueryRejection),
    /// Failed to parse JSON body
    Json(JsonRejection),
    /// Coerced query-string filters did not fit the filter type
    Filters(serde_json::Error),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                "QUERY_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "JSON_PARSE_ERROR",
                rejection.body_text(),
            ),
            Self::Filters(e) => (
                StatusCode::BAD_REQUEST,
                "QUERY_PARSE_ERROR",
                format!("Failed to deserialize query string: {}", e),
            ),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format_validation_errors(&errors),
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Collect `<field>From` / `<field>To` keys for every rangeable field of `F`.
///
/// Bounds stay as text; the criteria builder coerces them to the field type.
/// Blank values count as absent.
pub fn range_table_from_query<F: FilterSpec>(params: &HashMap<String, String>) -> RangeTable {
    let bound = |key: String| -> Option<FilterValue> {
        params
            .get(&key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| FilterValue::Text(v.clone()))
    };

    let mut table = RangeTable::new();
    for field in F::fields()
        .iter()
        .filter(|f| !f.synthetic && classify(f).is_rangeable)
    {
        let lower = bound(format!("{}{}", field.name, RANGE_FROM_SUFFIX));
        let upper = bound(format!("{}{}", field.name, RANGE_TO_SUFFIX));
        table.insert(field.name, Range::new(lower, upper));
    }
    table
}

/// Coerce the query-string value of every declared field of `F` to its type.
///
/// Returns a JSON object ready to deserialise into `F`, plus one
/// `TypeMismatch` per value that was dropped. Collections are comma-separated.
pub fn filter_object_from_query<F: FilterSpec>(
    params: &HashMap<String, String>,
) -> (Map<String, Value>, Vec<FieldAccessError>) {
    let mut object = Map::new();
    let mut mismatches = Vec::new();

    for field in F::fields().iter().filter(|f| !f.synthetic) {
        let Some(raw) = params.get(field.name).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let value = if field.semantic_type == SemanticType::Collection {
            Ok(Value::Array(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            ))
        } else {
            FilterValue::Text(raw.clone())
                .coerce_to(&field.semantic_type)
                .map(to_json)
        };

        match value {
            Ok(value) => {
                object.insert(field.name.to_string(), value);
            }
            Err(_) => {
                let mismatch = FieldAccessError::TypeMismatch {
                    field: field.name.to_string(),
                    expected: field.semantic_type.name(),
                    found: "text",
                };
                tracing::warn!(%mismatch, value = %raw, "Ignoring query filter");
                mismatches.push(mismatch);
            }
        }
    }
    (object, mismatches)
}

fn to_json(value: FilterValue) -> Value {
    match value {
        FilterValue::Integer(i) => Value::from(i),
        FilterValue::Decimal(d) => Value::from(d),
        FilterValue::Boolean(b) => Value::Bool(b),
        FilterValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
        FilterValue::Text(s) | FilterValue::Enum(s) => Value::String(s),
        FilterValue::List(items) => Value::Array(items.into_iter().map(to_json).collect()),
    }
}

/// Filter request bound from a flat query string.
///
/// Pagination keys go to [`PaginationSpec`], range keys to the range table,
/// declared field keys are coerced and deserialised into `F` (unknown keys
/// ignored).
#[derive(Debug)]
pub struct FilterQuery<F>(pub FilterRequest<F>);

impl<F> Deref for FilterQuery<F> {
    type Target = FilterRequest<F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, F> FromRequestParts<S> for FilterQuery<F>
where
    S: Send + Sync,
    F: FilterSpec + DeserializeOwned + Send,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pagination) = Query::<PaginationSpec>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        pagination
            .validate()
            .map_err(ValidationRejection::Validation)?;

        let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;

        let (object, mismatches) = filter_object_from_query::<F>(&raw);
        let filters: F =
            serde_json::from_value(Value::Object(object)).map_err(ValidationRejection::Filters)?;
        let ranges = range_table_from_query::<F>(&raw);

        tracing::trace!(
            ranges = ranges.len(),
            dropped = mismatches.len(),
            "Bound filter request from query string"
        );

        Ok(Self(
            FilterRequest::new()
                .with_filters(filters)
                .with_ranges(ranges)
                .with_pagination(pagination),
        ))
    }
}

/// Filter request from a JSON body; pagination, when present, is validated
#[derive(Debug)]
pub struct FilterBody<F>(pub FilterRequest<F>);

impl<F> Deref for FilterBody<F> {
    type Target = FilterRequest<F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, F> FromRequest<S> for FilterBody<F>
where
    S: Send + Sync,
    F: DeserializeOwned + Send,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<FilterRequest<F>>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        if let Some(pagination) = &request.pagination {
            pagination
                .validate()
                .map_err(ValidationRejection::Validation)?;
        }
        Ok(Self(request))
    }
}
