//! Paginated query execution
//!
//! The fetch and count statements are both rendered from the same
//! [`Condition`]; only the fetch adds ORDER BY, LIMIT and OFFSET. The two run
//! concurrently and either both succeed or the whole call fails.

use std::marker::PhantomData;

use super::descriptor::{Entity, FieldDescriptor, find_field};
use super::error::{FilterDiagnostic, FilterError};
use super::page::Page;
use super::request::{PaginationSpec, SortDirection};
use super::translate::Condition;
use crate::data::sql::{SqlDialect, Statement};
use crate::data::traits::DataAccess;

/// The two statements for one page, plus any sort diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub fetch: Statement,
    pub count: Statement,
    pub diagnostics: Vec<FilterDiagnostic>,
}

/// Resolve `sortBy` against the entity's fields. Unknown names are dropped.
pub fn resolve_sort<E: Entity>(
    pagination: &PaginationSpec,
) -> Result<Option<(&'static FieldDescriptor, SortDirection)>, FilterDiagnostic> {
    let Some(name) = pagination.sort_by.as_deref() else {
        return Ok(None);
    };
    match find_field(E::fields(), name).filter(|f| !f.synthetic) {
        Some(field) => Ok(Some((field, pagination.sort_direction))),
        None => Err(FilterDiagnostic::UnknownSortField {
            field: name.to_string(),
        }),
    }
}

/// Render fetch and count statements for `E` from one condition
pub fn plan<E: Entity>(
    dialect: &dyn SqlDialect,
    condition: &Condition,
    pagination: &PaginationSpec,
) -> QueryPlan {
    let mut diagnostics = Vec::new();
    let mut fetch_sql = format!("SELECT * FROM {} WHERE {}", E::TABLE, condition.sql);

    match resolve_sort::<E>(pagination) {
        Ok(Some((field, direction))) => {
            fetch_sql.push_str(" ORDER BY ");
            fetch_sql.push_str(&dialect.order_by(field.column, direction.is_desc()));
        }
        Ok(None) => {}
        Err(diagnostic) => {
            tracing::warn!(sort_by = ?pagination.sort_by, table = E::TABLE, "Ignoring unknown sort field");
            diagnostics.push(diagnostic);
        }
    }

    fetch_sql.push(' ');
    fetch_sql.push_str(&dialect.limit_offset(pagination.limit(), pagination.offset()));

    QueryPlan {
        fetch: Statement::new(fetch_sql, condition.params.clone()),
        count: Statement::new(
            format!("SELECT COUNT(*) FROM {} WHERE {}", E::TABLE, condition.sql),
            condition.params.clone(),
        ),
        diagnostics,
    }
}

/// Runs paginated queries for entity `E` against a store
pub struct PaginatedExecutor<'a, E, S: ?Sized> {
    store: &'a S,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E, S> PaginatedExecutor<'a, E, S>
where
    E: Entity,
    S: DataAccess<E> + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn plan(&self, condition: &Condition, pagination: &PaginationSpec) -> QueryPlan {
        plan::<E>(self.store.dialect(), condition, pagination)
    }

    /// Fetch one page and the total count, mapping rows through `mapper`
    pub async fn execute<D, M>(
        &self,
        condition: &Condition,
        pagination: &PaginationSpec,
        mapper: M,
    ) -> Result<Page<D>, FilterError>
    where
        M: Fn(E) -> D,
    {
        self.run(&self.plan(condition, pagination), pagination, mapper)
            .await
    }

    /// Run an already rendered plan for the page described by `pagination`
    pub async fn run<D, M>(
        &self,
        plan: &QueryPlan,
        pagination: &PaginationSpec,
        mapper: M,
    ) -> Result<Page<D>, FilterError>
    where
        M: Fn(E) -> D,
    {
        tracing::debug!(sql = %plan.fetch.sql, params = plan.fetch.params.len(), "Executing paginated query");

        let (rows, total) = tokio::try_join!(
            self.store.fetch(&plan.fetch),
            self.store.count(&plan.count)
        )
        .map_err(|e| {
            tracing::error!(error = %e, backend = e.backend(), table = E::TABLE, "Paginated query failed");
            FilterError::Backend(e)
        })?;

        let content = rows.into_iter().map(mapper).collect();
        Ok(Page::new(
            content,
            total,
            pagination.page_number,
            pagination.page_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use crate::data::sql::{PostgresDialect, SqlValue, SqliteDialect};
    use crate::filters::testing::{MockStore, SampleEntity};

    fn condition() -> Condition {
        Condition {
            sql: "name LIKE ? ESCAPE '\\'".to_string(),
            params: vec![SqlValue::Text("%jo%".to_string())],
        }
    }

    #[test]
    fn test_plan_shares_condition() {
        let pagination = PaginationSpec::new(2, 10).sorted_by("name", SortDirection::Asc);
        let plan = plan::<SampleEntity>(&SqliteDialect, &condition(), &pagination);
        assert_eq!(
            plan.fetch.sql,
            "SELECT * FROM samples WHERE name LIKE ? ESCAPE '\\' ORDER BY name ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            plan.count.sql,
            "SELECT COUNT(*) FROM samples WHERE name LIKE ? ESCAPE '\\'"
        );
        assert_eq!(plan.fetch.params, plan.count.params);
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_plan_sort_uses_column_name() {
        let pagination = PaginationSpec::new(0, 5).sorted_by("createdDate", SortDirection::Desc);
        let plan = plan::<SampleEntity>(&PostgresDialect, &Condition::always_true(), &pagination);
        assert_eq!(
            plan.fetch.sql,
            "SELECT * FROM samples WHERE 1=1 ORDER BY created_date DESC LIMIT 5 OFFSET 0"
        );
    }

    #[test]
    fn test_plan_unknown_sort_dropped() {
        let pagination = PaginationSpec::new(0, 5).sorted_by("nope", SortDirection::Asc);
        let plan = plan::<SampleEntity>(&SqliteDialect, &Condition::always_true(), &pagination);
        assert_eq!(plan.fetch.sql, "SELECT * FROM samples WHERE 1=1 LIMIT 5 OFFSET 0");
        assert_eq!(
            plan.diagnostics,
            vec![FilterDiagnostic::UnknownSortField {
                field: "nope".to_string()
            }]
        );
    }

    #[test]
    fn test_plan_synthetic_sort_dropped() {
        let pagination = PaginationSpec::new(0, 5).sorted_by("version", SortDirection::Asc);
        assert!(resolve_sort::<SampleEntity>(&pagination).is_err());
    }

    #[test]
    fn test_no_sort() {
        assert_eq!(resolve_sort::<SampleEntity>(&PaginationSpec::default()), Ok(None));
    }

    #[tokio::test]
    async fn test_execute_assembles_page() {
        let store = MockStore::with_rows(vec!["a", "b", "c"], 23);
        let executor = PaginatedExecutor::<SampleEntity, _>::new(&store);
        let page = executor
            .execute(&condition(), &PaginationSpec::new(1, 3), |row| row.0)
            .await
            .unwrap();
        assert_eq!(page.content.len(), 3);
        assert_eq!(page.total_elements, 23);
        assert_eq!(page.total_pages, 8);
        assert_eq!(page.current_page, 1);

        let seen = store.statements();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|s| s.params == condition().params));
    }

    #[tokio::test]
    async fn test_execute_maps_in_store_order() {
        let store = MockStore::with_rows(vec!["z", "a", "m"], 3);
        let executor = PaginatedExecutor::<SampleEntity, _>::new(&store);
        let page = executor
            .execute(&Condition::always_true(), &PaginationSpec::default(), |row| {
                row.0.to_uppercase()
            })
            .await
            .unwrap();
        assert_eq!(page.content, vec!["Z", "A", "M"]);
    }

    #[tokio::test]
    async fn test_count_failure_fails_whole_page() {
        let store = MockStore::failing_count();
        let executor = PaginatedExecutor::<SampleEntity, _>::new(&store);
        let result = executor
            .execute(&Condition::always_true(), &PaginationSpec::default(), |_| ())
            .await;
        assert!(matches!(
            result,
            Err(FilterError::Backend(DataError::Sqlite(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_whole_page() {
        let store = MockStore::failing_fetch();
        let executor = PaginatedExecutor::<SampleEntity, _>::new(&store);
        let result = executor
            .execute(&Condition::always_true(), &PaginationSpec::default(), |_| ())
            .await;
        assert!(matches!(result, Err(FilterError::Backend(_))));
    }

    #[tokio::test]
    async fn test_zero_page_size() {
        let store = MockStore::with_rows(vec![], 7);
        let executor = PaginatedExecutor::<SampleEntity, _>::new(&store);
        let page = executor
            .execute(&Condition::always_true(), &PaginationSpec::new(0, 0), |_| ())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 7);
        assert_eq!(page.total_pages, 0);
        assert!(page.content.is_empty());
    }
}
