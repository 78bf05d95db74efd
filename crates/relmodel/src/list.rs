use derive_more::Deref;
use serde::{Deserialize, Deserializer, Serialize};

///
/// NameList
///
/// Ordered list of property names that enforces uniqueness on insert.
/// Order is first-seen insertion order and is significant: for
/// stored-procedure parameters it is the binding order the database
/// caller must supply. Serializes identically to `Vec<String>`.
///

#[repr(transparent)]
#[derive(Clone, Debug, Default, Deref, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NameList(Vec<String>);

impl NameList {
    /// Create an empty name list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a name list, discarding later duplicates.
    #[must_use]
    pub fn from_vec(names: Vec<String>) -> Self {
        let mut list = Self::new();
        for name in names {
            list.insert(name);
        }

        list
    }

    /// Return the number of names in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return an iterator over the names in order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Returns `true` if the list already contains the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    /// Append a name, returning `true` if it was newly added. A
    /// duplicate is a silent no-op that leaves order untouched.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }

        self.0.push(name);

        true
    }

    /// Clear both the order and the membership entirely, so a fresh
    /// insertion sequence can re-establish full order.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl IntoIterator for NameList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NameList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for NameList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;

        Ok(Self::from_vec(names))
    }
}

///
/// TESTS
///
