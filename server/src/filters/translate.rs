//! Predicate translation
//!
//! Maps atomic predicates onto dialect-specific SQL conditions. The output is
//! a plain value with no connection attached, so one `Condition` can back both
//! the count and the fetch statement of a request.

use super::criteria::AtomicPredicate;
use super::descriptor::FilterValue;
use crate::data::sql::{SqlDialect, SqlValue};
use crate::utils::sql::escape_like_pattern;

const ALWAYS_TRUE: &str = "1=1";
const ALWAYS_FALSE: &str = "1=0";

/// A WHERE-clause body and its bind values
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Condition {
    /// Matches every row
    pub fn always_true() -> Self {
        Self {
            sql: ALWAYS_TRUE.to_string(),
            params: Vec::new(),
        }
    }

    pub fn is_always_true(&self) -> bool {
        self.sql == ALWAYS_TRUE && self.params.is_empty()
    }
}

pub struct PredicateTranslator {
    dialect: &'static dyn SqlDialect,
}

impl PredicateTranslator {
    pub fn new(dialect: &'static dyn SqlDialect) -> Self {
        Self { dialect }
    }

    /// Translate and AND together. Empty input yields [`Condition::always_true`].
    pub fn translate(&self, predicates: &[AtomicPredicate]) -> Condition {
        if predicates.is_empty() {
            return Condition::always_true();
        }

        let mut params = Vec::new();
        let clauses: Vec<String> = predicates
            .iter()
            .map(|p| self.clause(p, &mut params))
            .collect();

        Condition {
            sql: clauses.join(" AND "),
            params,
        }
    }

    fn clause(&self, predicate: &AtomicPredicate, params: &mut Vec<SqlValue>) -> String {
        let col = predicate.field().column;
        match predicate {
            AtomicPredicate::Equals {
                value: FilterValue::List(items),
                ..
            } => {
                if items.is_empty() {
                    return ALWAYS_TRUE.to_string();
                }
                let placeholders: Vec<String> =
                    items.iter().map(|v| self.bind(v, params)).collect();
                format!("{} IN ({})", col, placeholders.join(", "))
            }
            AtomicPredicate::Equals { value, .. } => {
                format!("{} = {}", col, self.bind(value, params))
            }
            AtomicPredicate::Contains { needle, .. } => {
                let pattern = format!("%{}%", escape_like_pattern(needle));
                let ph = self.push(SqlValue::Text(pattern), params);
                self.dialect.contains(col, &ph)
            }
            AtomicPredicate::Between { lower, upper, .. } => {
                if !is_scalar(lower) || !is_scalar(upper) {
                    return self.unsupported_range(col);
                }
                let lo = self.bind(lower, params);
                let hi = self.bind(upper, params);
                format!("{} BETWEEN {} AND {}", col, lo, hi)
            }
            AtomicPredicate::GreaterOrEqual { lower, .. } => {
                if !is_scalar(lower) {
                    return self.unsupported_range(col);
                }
                format!("{} >= {}", col, self.bind(lower, params))
            }
            AtomicPredicate::LessOrEqual { upper, .. } => {
                if !is_scalar(upper) {
                    return self.unsupported_range(col);
                }
                format!("{} <= {}", col, self.bind(upper, params))
            }
        }
    }

    fn unsupported_range(&self, col: &str) -> String {
        tracing::warn!(column = %col, "List value in range predicate; matching nothing");
        ALWAYS_FALSE.to_string()
    }

    /// Bind a scalar; nested lists are flattened into their first level
    fn bind(&self, value: &FilterValue, params: &mut Vec<SqlValue>) -> String {
        let sql_value = match value {
            FilterValue::Text(s) | FilterValue::Enum(s) => SqlValue::Text(s.clone()),
            FilterValue::Integer(i) => SqlValue::Integer(*i),
            FilterValue::Decimal(d) => SqlValue::Real(*d),
            FilterValue::Boolean(b) => SqlValue::Bool(*b),
            FilterValue::Timestamp(ts) => self.dialect.timestamp_value(ts),
            FilterValue::List(items) => {
                let placeholders: Vec<String> =
                    items.iter().map(|v| self.bind(v, params)).collect();
                return placeholders.join(", ");
            }
        };
        self.push(sql_value, params)
    }

    fn push(&self, value: SqlValue, params: &mut Vec<SqlValue>) -> String {
        params.push(value);
        self.dialect.placeholder(params.len())
    }
}

fn is_scalar(value: &FilterValue) -> bool {
    !matches!(value, FilterValue::List(_))
}
