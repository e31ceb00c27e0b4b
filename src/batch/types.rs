use std::collections::BTreeMap;

use super::FieldArray;

/// One synchronized set of named arrays to be serialized into one container.
///
/// A field may be present with data or explicitly absent. Absent fields are
/// legal and are simply left out of the container written for the batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    fields: BTreeMap<String, Option<FieldArray>>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with data
    pub fn with_field(mut self, name: impl Into<String>, array: impl Into<FieldArray>) -> Self {
        self.fields.insert(name.into(), Some(array.into()));
        self
    }

    /// Add a field that has no data in this batch
    pub fn with_absent(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    /// Insert or replace a field, returning the previous entry
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        array: Option<FieldArray>,
    ) -> Option<Option<FieldArray>> {
        self.fields.insert(name.into(), array)
    }

    /// Data of a present field
    pub fn get(&self, name: &str) -> Option<&FieldArray> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    /// Whether the batch has an entry (present or absent) for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether `name` is in the batch but carries no data
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(None))
    }

    /// All field names, present or absent
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// All entries, present or absent
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldArray>)> {
        self.fields
            .iter()
            .map(|(name, array)| (name.as_str(), array.as_ref()))
    }

    /// Entries that carry data
    pub fn present(&self) -> impl Iterator<Item = (&str, &FieldArray)> {
        self.fields
            .iter()
            .filter_map(|(name, array)| array.as_ref().map(|array| (name.as_str(), array)))
    }

    /// Number of entries, present or absent
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the batch has no entries at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Option<FieldArray>)> for Batch {
    fn from_iter<I: IntoIterator<Item = (String, Option<FieldArray>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
