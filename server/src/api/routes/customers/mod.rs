//! Customer API endpoints
//!
//! Filtered, paginated customer listings. The same `CustomerFilter` drives
//! the query-string endpoint, the JSON search endpoint and the published
//! parameter metadata.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::extractors::{FilterBody, FilterQuery};
use crate::api::types::ApiError;
use crate::data::DataStore;
use crate::data::types::CustomerRow;
use crate::filters::{EntityFilter, FilterEngine, FilterError, FilterRequest, Page, field_metadata};

use types::{CustomerDto, CustomerFilter, FilterMetadataResponse};

/// Customer listing filter bound to the configured store
pub type CustomerListing = EntityFilter<DataStore, CustomerRow, CustomerFilter, CustomerDto>;

/// Shared state for Customer API endpoints
#[derive(Clone)]
pub struct CustomersApiState {
    pub filter: Arc<CustomerListing>,
}

/// Build Customer API routes. Fails when the engine has no store.
pub fn routes(engine: &FilterEngine<DataStore>) -> Result<Router<()>, FilterError> {
    let filter = engine.create_filter::<CustomerRow, CustomerFilter, _, _>(CustomerDto::from)?;
    let state = CustomersApiState {
        filter: Arc::new(filter),
    };

    Ok(Router::new()
        .route("/", get(list_customers))
        .route("/search", post(search_customers))
        .route("/filter-metadata", get(get_filter_metadata))
        .with_state(state))
}

async fn run_filter(
    listing: &CustomerListing,
    request: &FilterRequest<CustomerFilter>,
) -> Result<Json<Page<CustomerDto>>, ApiError> {
    let page = listing.filter(request).await?;
    Ok(Json(page))
}

/// List customers matching query-string filters
///
/// Query parameters are generated from the filter's field classification and
/// attached to this operation when the OpenAPI document is served.
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "customers",
    responses(
        (status = 200, description = "Page of matching customers", body = Page<CustomerDto>),
        (status = 400, description = "Invalid pagination parameters"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn list_customers(
    State(state): State<CustomersApiState>,
    FilterQuery(request): FilterQuery<CustomerFilter>,
) -> Result<Json<Page<CustomerDto>>, ApiError> {
    run_filter(&state.filter, &request).await
}

/// Search customers with a JSON filter request
#[utoipa::path(
    post,
    path = "/api/v1/customers/search",
    tag = "customers",
    request_body(
        content = serde_json::Value,
        description = "Filter request: `filters`, `rangeFilters` ({field: {from, to}}) and `pagination`"
    ),
    responses(
        (status = 200, description = "Page of matching customers", body = Page<CustomerDto>),
        (status = 400, description = "Malformed body or invalid pagination"),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn search_customers(
    State(state): State<CustomersApiState>,
    FilterBody(request): FilterBody<CustomerFilter>,
) -> Result<Json<Page<CustomerDto>>, ApiError> {
    run_filter(&state.filter, &request).await
}

/// Describe which customer fields are identifiers and which accept ranges
#[utoipa::path(
    get,
    path = "/api/v1/customers/filter-metadata",
    tag = "customers",
    responses(
        (status = 200, description = "Field classification metadata", body = FilterMetadataResponse)
    )
)]
pub async fn get_filter_metadata() -> Json<FilterMetadataResponse> {
    Json(FilterMetadataResponse {
        fields: field_metadata::<CustomerFilter>(),
    })
}
