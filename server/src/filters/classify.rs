//! Field classification
//!
//! Decides, from a field descriptor alone, whether a field is an identifier,
//! whether it was opted back into equality filtering, and whether it accepts
//! range bounds. Shared by the criteria builder and the parameter metadata so
//! the documented parameters always match what the engine accepts.

use super::descriptor::FieldDescriptor;

/// Suffix that marks a foreign-key style field by naming convention
const ID_SUFFIX: &str = "Id";
/// Exact name of the conventional primary key
const ID_NAME: &str = "id";

/// Derived classification of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldClassification {
    /// Primary key, `id`, `*Id`, or explicitly marked filterable identifier
    pub is_identifier: bool,
    /// Identifier opted back into equality filtering
    pub is_filterable_identifier: bool,
    /// Non-identifier numeric or temporal field
    pub is_rangeable: bool,
}

impl FieldClassification {
    /// Identifier without the filterable marker: contributes no predicates at all
    pub fn is_excluded(&self) -> bool {
        self.is_identifier && !self.is_filterable_identifier
    }
}

/// Classify a field. Pure; safe to call from any thread.
pub fn classify(field: &FieldDescriptor) -> FieldClassification {
    let by_convention = field.name == ID_NAME || field.name.ends_with(ID_SUFFIX);
    let is_identifier = field.primary_key || by_convention || field.filterable_id;
    let is_filterable_identifier = is_identifier && field.filterable_id;
    let is_rangeable = !is_identifier
        && (field.semantic_type.is_numeric() || field.semantic_type.is_temporal());

    FieldClassification {
        is_identifier,
        is_filterable_identifier,
        is_rangeable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::descriptor::SemanticType;

    fn field(name: &'static str, ty: SemanticType) -> FieldDescriptor {
        FieldDescriptor::new(name, name, ty)
    }

    #[test]
    fn test_id_by_exact_name() {
        let c = classify(&field("id", SemanticType::Integer));
        assert!(c.is_identifier);
        assert!(c.is_excluded());
        assert!(!c.is_rangeable);
    }

    #[test]
    fn test_id_by_suffix() {
        let c = classify(&field("accountId", SemanticType::Integer));
        assert!(c.is_identifier);
        assert!(c.is_excluded());
        assert!(!c.is_rangeable);
    }

    #[test]
    fn test_id_by_primary_key_marker() {
        let c = classify(&field("code", SemanticType::String).primary_key());
        assert!(c.is_identifier);
        assert!(c.is_excluded());
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        let c = classify(&field("valid", SemanticType::Boolean));
        assert!(!c.is_identifier);
        let c = classify(&field("grid", SemanticType::Integer));
        assert!(!c.is_identifier);
        assert!(c.is_rangeable);
    }

    #[test]
    fn test_filterable_identifier_is_equality_only() {
        let c = classify(&field("filterableId", SemanticType::Integer).filterable_id());
        assert!(c.is_identifier);
        assert!(c.is_filterable_identifier);
        assert!(!c.is_excluded());
        assert!(!c.is_rangeable);
    }

    #[test]
    fn test_filterable_marker_overrides_primary_key_exclusion() {
        let c = classify(
            &field("id", SemanticType::Integer)
                .primary_key()
                .filterable_id(),
        );
        assert!(!c.is_excluded());
        assert!(!c.is_rangeable);
    }

    #[test]
    fn test_filterable_marker_without_id_name_still_never_ranges() {
        let c = classify(&field("reference", SemanticType::Integer).filterable_id());
        assert!(c.is_filterable_identifier);
        assert!(!c.is_rangeable);
    }

    #[test]
    fn test_rangeable_only_for_numeric_and_temporal() {
        assert!(classify(&field("count", SemanticType::Integer)).is_rangeable);
        assert!(classify(&field("balance", SemanticType::Decimal)).is_rangeable);
        assert!(classify(&field("createdDate", SemanticType::Timestamp)).is_rangeable);
        assert!(!classify(&field("name", SemanticType::String)).is_rangeable);
        assert!(!classify(&field("active", SemanticType::Boolean)).is_rangeable);
        assert!(!classify(&field("tier", SemanticType::Enum(&["a"]))).is_rangeable);
        assert!(!classify(&field("tags", SemanticType::Collection)).is_rangeable);
    }
}
