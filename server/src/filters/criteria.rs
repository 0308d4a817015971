//! Criteria building
//!
//! Turns a filter record plus a range table into an ordered list of atomic
//! predicates. Regular filters come first (in field-table order), then range
//! filters (in field-name order). Problems with individual fields are logged,
//! recorded as diagnostics, and the field is skipped.

use super::classify::classify;
use super::descriptor::{Entity, FieldDescriptor, FilterSpec, FilterValue, find_field};
use super::error::{Bound, FieldAccessError, FilterDiagnostic};
use super::range::{Range, RangeTable};

/// One condition over one field. Predicates in a list are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicPredicate {
    Equals {
        field: &'static FieldDescriptor,
        value: FilterValue,
    },
    /// Substring match; the needle is the caller's text, unescaped
    Contains {
        field: &'static FieldDescriptor,
        needle: String,
    },
    Between {
        field: &'static FieldDescriptor,
        lower: FilterValue,
        upper: FilterValue,
    },
    GreaterOrEqual {
        field: &'static FieldDescriptor,
        lower: FilterValue,
    },
    LessOrEqual {
        field: &'static FieldDescriptor,
        upper: FilterValue,
    },
}

impl AtomicPredicate {
    pub fn field(&self) -> &'static FieldDescriptor {
        match self {
            Self::Equals { field, .. }
            | Self::Contains { field, .. }
            | Self::Between { field, .. }
            | Self::GreaterOrEqual { field, .. }
            | Self::LessOrEqual { field, .. } => field,
        }
    }
}

/// Result of a build: predicates plus anything that was dropped along the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub predicates: Vec<AtomicPredicate>,
    pub diagnostics: Vec<FilterDiagnostic>,
}

impl Criteria {
    /// No predicates: matches every row
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Builds criteria against a target field table (the entity being queried).
///
/// Range entries are resolved against the target; regular filters use the
/// filter type's own table.
#[derive(Debug, Clone, Copy)]
pub struct CriteriaBuilder {
    target: &'static [FieldDescriptor],
}

impl CriteriaBuilder {
    pub fn for_target(target: &'static [FieldDescriptor]) -> Self {
        Self { target }
    }

    pub fn for_entity<E: Entity>() -> Self {
        Self::for_target(E::fields())
    }

    pub fn build<F: FilterSpec>(&self, filters: &F, ranges: &RangeTable) -> Criteria {
        let mut criteria = Criteria::default();
        self.push_regular(filters, &mut criteria);
        self.push_ranges(ranges, &mut criteria);
        criteria
    }

    /// Build with either half optional, as in a request where both may be absent
    pub fn build_optional<F: FilterSpec>(
        &self,
        filters: Option<&F>,
        ranges: Option<&RangeTable>,
    ) -> Criteria {
        let mut criteria = Criteria::default();
        if let Some(filters) = filters {
            self.push_regular(filters, &mut criteria);
        }
        if let Some(ranges) = ranges {
            self.push_ranges(ranges, &mut criteria);
        }
        criteria
    }

    fn push_regular<F: FilterSpec>(&self, filters: &F, criteria: &mut Criteria) {
        for field in F::fields().iter().filter(|f| !f.synthetic) {
            let value = match filters.read(field) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(field = %field.name, error = %e, "Skipping unreadable filter field");
                    criteria.diagnostics.push(FilterDiagnostic::FieldAccess(e));
                    continue;
                }
            };

            let classification = classify(field);
            if classification.is_excluded() {
                tracing::trace!(field = %field.name, "Identifier field excluded from filters");
                continue;
            }

            let value = match value.coerce_to(&field.semantic_type) {
                Ok(value) => value,
                Err(original) => {
                    let e = FieldAccessError::TypeMismatch {
                        field: field.name.to_string(),
                        expected: field.semantic_type.name(),
                        found: original.kind(),
                    };
                    tracing::warn!(field = %field.name, error = %e, "Skipping mistyped filter field");
                    criteria.diagnostics.push(FilterDiagnostic::FieldAccess(e));
                    continue;
                }
            };

            let predicate = if classification.is_filterable_identifier {
                AtomicPredicate::Equals { field, value }
            } else if value.is_blank() {
                continue;
            } else {
                match value {
                    FilterValue::Text(needle) => AtomicPredicate::Contains { field, needle },
                    value => AtomicPredicate::Equals { field, value },
                }
            };
            criteria.predicates.push(predicate);
        }
    }

    fn push_ranges(&self, ranges: &RangeTable, criteria: &mut Criteria) {
        for (name, range) in ranges.iter() {
            let Some(field) = find_field(self.target, name).filter(|f| !f.synthetic) else {
                tracing::debug!(field = %name, "Skipping range filter for unknown field");
                criteria.diagnostics.push(FilterDiagnostic::UnknownRangeField {
                    field: name.to_string(),
                });
                continue;
            };

            if classify(field).is_identifier {
                tracing::debug!(field = %name, "Skipping range filter for ID field");
                criteria.diagnostics.push(FilterDiagnostic::IdentifierRange {
                    field: name.to_string(),
                });
                continue;
            }

            if let Some(predicate) = range_predicate(field, range, &mut criteria.diagnostics) {
                criteria.predicates.push(predicate);
            }
        }
    }
}

fn range_predicate(
    field: &'static FieldDescriptor,
    range: &Range,
    diagnostics: &mut Vec<FilterDiagnostic>,
) -> Option<AtomicPredicate> {
    let lower = coerce_bound(field, range.lower.as_ref(), Bound::Lower, diagnostics);
    let upper = coerce_bound(field, range.upper.as_ref(), Bound::Upper, diagnostics);

    match (lower, upper) {
        (Some(lower), Some(upper)) => {
            if is_inverted(&lower, &upper) {
                // Passed through as-is; the store returns no rows for it
                tracing::debug!(field = %field.name, "Range lower bound exceeds upper bound");
                diagnostics.push(FilterDiagnostic::InvertedRange {
                    field: field.name.to_string(),
                });
            }
            Some(AtomicPredicate::Between {
                field,
                lower,
                upper,
            })
        }
        (Some(lower), None) => Some(AtomicPredicate::GreaterOrEqual { field, lower }),
        (None, Some(upper)) => Some(AtomicPredicate::LessOrEqual { field, upper }),
        (None, None) => None,
    }
}

fn coerce_bound(
    field: &FieldDescriptor,
    bound: Option<&FilterValue>,
    which: Bound,
    diagnostics: &mut Vec<FilterDiagnostic>,
) -> Option<FilterValue> {
    let value = bound?.clone();
    match value.coerce_to(&field.semantic_type) {
        Ok(FilterValue::List(_)) | Err(_) => {
            let found = bound.map(FilterValue::kind).unwrap_or("none");
            tracing::warn!(field = %field.name, bound = %which, found, "Dropping incompatible range bound");
            diagnostics.push(FilterDiagnostic::InvalidRangeBound {
                field: field.name.to_string(),
                bound: which,
                found,
            });
            None
        }
        Ok(value) => Some(value),
    }
}

fn is_inverted(lower: &FilterValue, upper: &FilterValue) -> bool {
    match (lower, upper) {
        (FilterValue::Integer(a), FilterValue::Integer(b)) => a > b,
        (FilterValue::Decimal(a), FilterValue::Decimal(b)) => a > b,
        (FilterValue::Timestamp(a), FilterValue::Timestamp(b)) => a > b,
        (FilterValue::Text(a), FilterValue::Text(b)) => a > b,
        _ => false,
    }
}
