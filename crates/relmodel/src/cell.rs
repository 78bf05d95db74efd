use crate::types::ConfigurationSource;
use serde::Serialize;
use std::borrow::Borrow;

///
/// SourcedCell
///
/// A value slot paired with the provenance of its last write. A write
/// is accepted when the incoming source outranks the recorded one, or
/// when the payload is unchanged; accepted writes upgrade the recorded
/// source via `max`, never downgrade it. Clearing the payload still
/// records provenance, so a deliberate "unset" by explicit code blocks
/// later convention writes.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SourcedCell<T> {
    value: Option<T>,
    source: Option<ConfigurationSource>,
}

impl<T> SourcedCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: None,
            source: None,
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn source(&self) -> Option<ConfigurationSource> {
        self.source
    }
}

impl<T: PartialEq> SourcedCell<T> {
    /// Pure acceptance predicate for [`set`](Self::set).
    pub fn can_set<Q>(&self, value: Option<&Q>, source: ConfigurationSource) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        source.overrides(self.source) || self.value.as_ref().map(Borrow::borrow) == value
    }

    /// Store `value` and upgrade the recorded source. Callers are
    /// expected to gate on [`can_set`](Self::can_set) first.
    pub fn set(&mut self, value: Option<T>, source: ConfigurationSource) {
        self.value = value;
        self.source = Some(source.max_with(self.source));
    }
}

impl<T> Default for SourcedCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigurationSource::{Convention, DataAnnotation, Explicit};

    #[test]
    fn unset_cell_accepts_any_source() {
        let cell: SourcedCell<String> = SourcedCell::new();

        assert!(cell.can_set(Some("a"), Convention));
        assert!(cell.can_set(None::<&str>, Convention));
        assert_eq!(cell.get(), None);
        assert_eq!(cell.source(), None);
    }

    #[test]
    fn lower_rank_cannot_overwrite_higher() {
        let mut cell = SourcedCell::new();
        cell.set(Some("explicit".to_string()), Explicit);

        assert!(!cell.can_set(Some("conv"), Convention));
        assert!(!cell.can_set(Some("anno"), DataAnnotation));
        assert!(cell.can_set(Some("other"), Explicit));
    }

    #[test]
    fn equal_payload_is_always_settable() {
        let mut cell = SourcedCell::new();
        cell.set(Some("same".to_string()), Explicit);

        assert!(cell.can_set(Some("same"), Convention));
    }

    #[test]
    fn set_upgrades_source_monotonically() {
        let mut cell = SourcedCell::new();
        cell.set(Some("a".to_string()), Explicit);
        cell.set(Some("a".to_string()), Convention);

        // Equal payload write went through, but provenance stays Explicit.
        assert_eq!(cell.source(), Some(Explicit));
    }

    #[test]
    fn clearing_records_provenance() {
        let mut cell: SourcedCell<String> = SourcedCell::new();
        cell.set(None, Explicit);

        assert_eq!(cell.get(), None);
        assert_eq!(cell.source(), Some(Explicit));
        assert!(!cell.can_set(Some("conv"), Convention));
    }
}
