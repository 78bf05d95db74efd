use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// OperationKind
///
/// The database operation a stored procedure stands in for. Also the
/// lookup key for stored-procedure records, so an entity type carries
/// at most one record per kind.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    pub const ALL: [Self; 3] = [Self::Insert, Self::Update, Self::Delete];

    /// Prefix used when deriving a default procedure name from the
    /// entity's table name, e.g. `"_Insert"` + `"Orders"`.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Insert => "_Insert",
            Self::Update => "_Update",
            Self::Delete => "_Delete",
        }
    }
}

///
/// ConfigurationSource
///
/// Ranked provenance of a configured value. Arbitrates conflicting
/// writers: explicit developer code beats declarative annotations,
/// which beat automatic conventions. Variant order is the rank order.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ConfigurationSource {
    Convention,
    DataAnnotation,
    Explicit,
}

impl ConfigurationSource {
    /// Returns `true` if a writer at this rank may overwrite a value
    /// recorded at `existing`. An unset value is always writable.
    #[must_use]
    pub fn overrides(self, existing: Option<Self>) -> bool {
        existing.is_none_or(|source| self >= source)
    }

    /// Merge with a previously recorded source, keeping the higher rank.
    #[must_use]
    pub fn max_with(self, other: Option<Self>) -> Self {
        other.map_or(self, |source| self.max(source))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_matches_operation_kind() {
        assert_eq!(OperationKind::Insert.suffix(), "_Insert");
        assert_eq!(OperationKind::Update.suffix(), "_Update");
        assert_eq!(OperationKind::Delete.suffix(), "_Delete");
    }

    #[test]
    fn source_rank_order() {
        assert!(ConfigurationSource::Convention < ConfigurationSource::DataAnnotation);
        assert!(ConfigurationSource::DataAnnotation < ConfigurationSource::Explicit);
    }

    #[test]
    fn overrides_is_reflexive_and_respects_rank() {
        use ConfigurationSource::{Convention, Explicit};

        assert!(Convention.overrides(None));
        assert!(Convention.overrides(Some(Convention)));
        assert!(Explicit.overrides(Some(Convention)));
        assert!(!Convention.overrides(Some(Explicit)));
    }

    #[test]
    fn max_with_keeps_higher_rank() {
        use ConfigurationSource::{Convention, DataAnnotation, Explicit};

        assert_eq!(Convention.max_with(Some(Explicit)), Explicit);
        assert_eq!(Explicit.max_with(Some(Convention)), Explicit);
        assert_eq!(DataAnnotation.max_with(None), DataAnnotation);
    }
}
