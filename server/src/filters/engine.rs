//! Filter engine
//!
//! Holds the data-access handle, configured once at startup and shared
//! read-only afterwards. Per-entity [`EntityFilter`]s are created from a
//! configured engine; asking for one before `configure` is a configuration
//! error, so nothing is ever translated against a missing store.

use std::marker::PhantomData;
use std::sync::Arc;

use super::criteria::{Criteria, CriteriaBuilder};
use super::descriptor::{Entity, FilterSpec};
use super::error::{FilterDiagnostic, FilterError};
use super::executor::{PaginatedExecutor, QueryPlan};
use super::page::Page;
use super::request::FilterRequest;
use super::translate::{Condition, PredicateTranslator};
use crate::data::traits::DataAccess;

pub struct FilterEngine<S: ?Sized> {
    store: Option<Arc<S>>,
}

impl<S: ?Sized> Default for FilterEngine<S> {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl<S: ?Sized> FilterEngine<S> {
    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    pub fn new(store: Arc<S>) -> Self {
        Self { store: Some(store) }
    }

    /// One-time setup. A second call is rejected and leaves the first store in place.
    pub fn configure(&mut self, store: Arc<S>) -> Result<(), FilterError> {
        if self.store.is_some() {
            return Err(FilterError::Configuration(
                "filter engine is already configured".to_string(),
            ));
        }
        self.store = Some(store);
        tracing::debug!("Filter engine configured");
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Result<&Arc<S>, FilterError> {
        self.store.as_ref().ok_or_else(FilterError::not_configured)
    }

    /// Bind the engine to entity `E`, filter type `F` and a row mapper
    pub fn create_filter<E, F, D, M>(&self, mapper: M) -> Result<EntityFilter<S, E, F, D>, FilterError>
    where
        E: Entity,
        F: FilterSpec,
        S: DataAccess<E>,
        M: Fn(E) -> D + Send + Sync + 'static,
    {
        let store = Arc::clone(self.store()?);
        Ok(EntityFilter {
            store,
            mapper: Box::new(mapper),
            builder: CriteriaBuilder::for_entity::<E>(),
            _types: PhantomData,
        })
    }
}

/// Everything derived from a request before any query runs
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub criteria: Criteria,
    pub condition: Condition,
    pub plan: QueryPlan,
}

impl PreparedQuery {
    /// Criteria and sort diagnostics together
    pub fn diagnostics(&self) -> impl Iterator<Item = &FilterDiagnostic> {
        self.criteria
            .diagnostics
            .iter()
            .chain(self.plan.diagnostics.iter())
    }
}

/// Filters entity `E` with filter type `F`, mapping rows to `D`
pub struct EntityFilter<S: ?Sized, E, F, D> {
    store: Arc<S>,
    mapper: Box<dyn Fn(E) -> D + Send + Sync>,
    builder: CriteriaBuilder,
    _types: PhantomData<fn(&F)>,
}

impl<S, E, F, D> EntityFilter<S, E, F, D>
where
    S: DataAccess<E> + ?Sized,
    E: Entity,
    F: FilterSpec,
{
    fn translator(&self) -> PredicateTranslator {
        PredicateTranslator::new(self.store.dialect())
    }

    /// Build criteria, condition and statements without touching the store
    pub fn prepare(&self, request: &FilterRequest<F>) -> PreparedQuery {
        let criteria = self
            .builder
            .build_optional(request.filters.as_ref(), request.range_filters.as_ref());
        let condition = self.translator().translate(&criteria.predicates);
        let plan = PaginatedExecutor::<E, S>::new(self.store.as_ref()).plan(&condition, &request.pagination());
        PreparedQuery {
            criteria,
            condition,
            plan,
        }
    }

    /// Prepare the request, then fetch the page and total count
    pub async fn filter(&self, request: &FilterRequest<F>) -> Result<Page<D>, FilterError> {
        let pagination = request.pagination();
        let prepared = self.prepare(request);

        for diagnostic in prepared.diagnostics() {
            tracing::debug!(table = E::TABLE, %diagnostic, "Filter input skipped");
        }
        tracing::debug!(
            table = E::TABLE,
            predicates = prepared.criteria.predicates.len(),
            diagnostics = prepared.diagnostics().count(),
            page = pagination.page_number,
            size = pagination.page_size,
            "Filtering"
        );

        PaginatedExecutor::<E, S>::new(self.store.as_ref())
            .run(&prepared.plan, &pagination, self.mapper.as_ref())
            .await
    }
}
