//! OpenAPI specification and Swagger UI
//!
//! Filtered list operations get their query parameters generated from the
//! filter type rather than declared by hand, so the documented parameters
//! are exactly the ones `FilterQuery` binds.

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn};
use utoipa::openapi::schema::{KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::{Required, RefOr};

use crate::api::routes::customers::types::{CustomerDto, CustomerFilter, FilterMetadataResponse};
use crate::api::routes::{customers, health};
use crate::filters::{FieldMetadata, ParameterSchema, QueryParameter, query_parameters};

/// Path of the query-string customer listing
pub const CUSTOMERS_LIST_PATH: &str = "/api/v1/customers";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PageFilter API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Filtered, paginated listings over SQL stores"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "customers", description = "Filtered customer listings")
    ),
    paths(
        health::health,
        customers::list_customers,
        customers::search_customers,
        customers::get_filter_metadata,
    ),
    components(schemas(
        health::HealthResponse,
        CustomerDto,
        CustomerFilter,
        FieldMetadata,
        FilterMetadataResponse,
    ))
)]
pub struct ApiDoc;

/// Full document with generated filter parameters applied
pub fn api_doc() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    apply_filter_parameters(
        &mut doc,
        CUSTOMERS_LIST_PATH,
        query_parameters::<CustomerFilter>(),
    );
    doc
}

/// Replace the query parameters of `GET path` with `parameters`.
///
/// Path, header and cookie parameters are kept. Unknown paths are left alone.
pub fn apply_filter_parameters(
    doc: &mut utoipa::openapi::OpenApi,
    path: &str,
    parameters: Vec<QueryParameter>,
) {
    let Some(operation) = doc
        .paths
        .paths
        .get_mut(path)
        .and_then(|item| item.get.as_mut())
    else {
        tracing::warn!(path, "No GET operation to attach filter parameters to");
        return;
    };

    let mut merged: Vec<Parameter> = operation
        .parameters
        .take()
        .unwrap_or_default()
        .into_iter()
        .filter(|p| p.parameter_in != ParameterIn::Query)
        .collect();
    merged.extend(parameters.into_iter().map(to_openapi_parameter));
    operation.parameters = Some(merged);
}

fn to_openapi_parameter(param: QueryParameter) -> Parameter {
    let object = match param.schema {
        ParameterSchema::String => ObjectBuilder::new().schema_type(Type::String),
        ParameterSchema::Integer => ObjectBuilder::new()
            .schema_type(Type::Integer)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
        ParameterSchema::Number => ObjectBuilder::new()
            .schema_type(Type::Number)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::Double))),
        ParameterSchema::Boolean => ObjectBuilder::new().schema_type(Type::Boolean),
        ParameterSchema::Enum(values) => ObjectBuilder::new()
            .schema_type(Type::String)
            .enum_values(Some(values)),
        ParameterSchema::DateTime => ObjectBuilder::new()
            .schema_type(Type::String)
            .format(Some(SchemaFormat::KnownFormat(KnownFormat::DateTime))),
    };
    let object = object
        .default(param.default.map(serde_json::Value::String))
        .build();

    ParameterBuilder::new()
        .name(param.name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(param.description))
        .schema(Some(RefOr::T(Schema::Object(object))))
        .build()
}

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], Json(api_doc()))
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PageFilter API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn list_parameters(doc: &utoipa::openapi::OpenApi) -> Vec<Value> {
        let json = serde_json::to_value(doc).unwrap();
        json["paths"][CUSTOMERS_LIST_PATH]["get"]["parameters"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    }

    fn param<'a>(params: &'a [Value], name: &str) -> Option<&'a Value> {
        params.iter().find(|p| p["name"] == name)
    }

    #[test]
    fn test_customer_list_parameters_generated() {
        let params = list_parameters(&api_doc());

        let names: Vec<&str> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(
            &names[..4],
            &["pageNumber", "pageSize", "sortBy", "sortDirection"]
        );

        let created_from = param(&params, "createdDateFrom").unwrap();
        assert_eq!(created_from["in"], "query");
        assert_eq!(created_from["description"], "Filter created date from value");
        assert_eq!(created_from["schema"]["format"], "date-time");

        let tier = param(&params, "tier").unwrap();
        assert_eq!(tier["schema"]["enum"], serde_json::json!(["bronze", "silver", "gold"]));

        let page_size = param(&params, "pageSize").unwrap();
        assert_eq!(page_size["schema"]["default"], "10");

        assert!(param(&params, "externalId").is_some());
        assert!(param(&params, "id").is_none());
        assert!(param(&params, "accountId").is_none());
        assert!(param(&params, "nameFrom").is_none());
    }

    #[test]
    fn test_apply_replaces_only_query_parameters() {
        let mut doc = ApiDoc::openapi();
        let operation = doc
            .paths
            .paths
            .get_mut(CUSTOMERS_LIST_PATH)
            .and_then(|item| item.get.as_mut())
            .unwrap();
        operation.parameters = Some(vec![
            ParameterBuilder::new()
                .name("tenant")
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .build(),
            ParameterBuilder::new()
                .name("legacy")
                .parameter_in(ParameterIn::Query)
                .build(),
        ]);

        apply_filter_parameters(
            &mut doc,
            CUSTOMERS_LIST_PATH,
            query_parameters::<CustomerFilter>(),
        );

        let params = list_parameters(&doc);
        assert!(param(&params, "tenant").is_some());
        assert!(param(&params, "legacy").is_none());
        assert!(param(&params, "pageNumber").is_some());
    }

    #[test]
    fn test_apply_to_unknown_path_is_noop() {
        let mut doc = ApiDoc::openapi();
        let before = serde_json::to_value(&doc).unwrap();
        apply_filter_parameters(&mut doc, "/nope", query_parameters::<CustomerFilter>());
        assert_eq!(serde_json::to_value(&doc).unwrap(), before);
    }
}
