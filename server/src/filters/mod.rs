//! Dynamic filter translation engine
//!
//! Turns a filter record, a range table and pagination into a paginated
//! query against a relational store:
//! - `descriptor` - static field tables, filter values, `FilterSpec` / `Entity`
//! - `classify` - identifier / filterable-identifier / rangeable classification
//! - `range` - per-field lower/upper bounds
//! - `criteria` - filter + ranges to atomic predicates
//! - `translate` - predicates to a dialect-specific SQL condition
//! - `executor` - fetch + count from one condition, page assembly
//! - `engine` - one-time configured store, per-entity filters
//! - `metadata` - documentation-only parameter lists

pub mod classify;
pub mod criteria;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod executor;
pub mod metadata;
pub mod page;
pub mod range;
pub mod request;
pub mod translate;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{FieldClassification, classify};
pub use criteria::{AtomicPredicate, Criteria, CriteriaBuilder};
pub use descriptor::{Entity, FieldDescriptor, FilterSpec, FilterValue, SemanticType, find_field};
pub use engine::{EntityFilter, FilterEngine, PreparedQuery};
pub use error::{Bound, FieldAccessError, FilterDiagnostic, FilterError};
pub use executor::{PaginatedExecutor, QueryPlan};
pub use metadata::{
    FieldMetadata, ParameterSchema, QueryParameter, RANGE_FROM_SUFFIX, RANGE_TO_SUFFIX,
    field_metadata, pagination_parameters, query_parameters, schema_for,
};
pub use page::{Page, total_pages};
pub use range::{Range, RangeTable};
pub use request::{FilterRequest, MAX_PAGE_SIZE, PaginationSpec, SortDirection};
pub use translate::{Condition, PredicateTranslator};
