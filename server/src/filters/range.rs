//! Range filters
//!
//! A [`RangeTable`] maps field names to optional lower/upper bounds. Bounds are
//! inclusive. Entries with neither bound are meaningless and never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use super::descriptor::FilterValue;

/// Inclusive bounds for one field
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Range {
    #[serde(default, rename = "from")]
    pub lower: Option<FilterValue>,
    #[serde(default, rename = "to")]
    pub upper: Option<FilterValue>,
}

impl Range {
    pub fn new(lower: Option<FilterValue>, upper: Option<FilterValue>) -> Self {
        Self { lower, upper }
    }

    pub fn at_least(lower: impl Into<FilterValue>) -> Self {
        Self::new(Some(lower.into()), None)
    }

    pub fn at_most(upper: impl Into<FilterValue>) -> Self {
        Self::new(None, Some(upper.into()))
    }

    pub fn between(lower: impl Into<FilterValue>, upper: impl Into<FilterValue>) -> Self {
        Self::new(Some(lower.into()), Some(upper.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

/// Field name → range. Iterates in field-name order.
///
/// On the wire it is a plain object, `{"<field>": {"from": .., "to": ..}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeTable {
    ranges: BTreeMap<String, Range>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range, replacing any previous one. Empty ranges are dropped.
    pub fn insert(&mut self, field: impl Into<String>, range: Range) {
        let field = field.into();
        if range.is_empty() {
            self.ranges.remove(&field);
        } else {
            self.ranges.insert(field, range);
        }
    }

    /// Builder form of [`RangeTable::insert`]
    pub fn with(mut self, field: impl Into<String>, range: Range) -> Self {
        self.insert(field, range);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Range> {
        self.ranges.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.ranges.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl<'de> Deserialize<'de> for RangeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut ranges = BTreeMap::<String, Range>::deserialize(deserializer)?;
        ranges.retain(|_, range| !range.is_empty());
        Ok(Self { ranges })
    }
}
