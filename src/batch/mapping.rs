use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::writer::ConfigurationError;

/// Association between logical field names and output dataset names.
///
/// Entries keep the order in which they were given; containers list their
/// datasets in this order. Built once from configuration and never changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    /// Build a mapping from `(field, dataset)` pairs.
    ///
    /// Rejects an empty mapping, empty names, a field listed twice and two
    /// fields targeting the same dataset.
    pub fn new<I, F, D>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (F, D)>,
        F: Into<String>,
        D: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(field, dataset)| (field.into(), dataset.into()))
            .collect();

        if entries.is_empty() {
            return Err(ConfigurationError::EmptyFieldMapping);
        }

        let mut datasets: HashMap<&str, &str> = HashMap::with_capacity(entries.len());
        for (index, (field, dataset)) in entries.iter().enumerate() {
            if field.is_empty() || dataset.is_empty() {
                return Err(ConfigurationError::EmptyName(field.clone()));
            }
            if entries[..index].iter().any(|(seen, _)| seen == field) {
                return Err(ConfigurationError::DuplicateField(field.clone()));
            }
            if let Some(first) = datasets.insert(dataset.as_str(), field.as_str()) {
                return Err(ConfigurationError::DuplicateDataset {
                    dataset: dataset.clone(),
                    first: first.to_string(),
                    second: field.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Output dataset name for a logical field
    pub fn dataset_name(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, dataset)| dataset.as_str())
    }

    /// Whether a logical field is mapped
    pub fn contains(&self, field: &str) -> bool {
        self.dataset_name(field).is_some()
    }

    /// `(field, dataset)` pairs in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, dataset)| (field.as_str(), dataset.as_str()))
    }

    /// Logical field names in configuration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    /// Number of mapped fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed mapping; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, dataset)) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", field, dataset)?;
        }
        Ok(())
    }
}

impl Serialize for FieldMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, dataset) in &self.entries {
            map.serialize_entry(field, dataset)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMappingVisitor)
    }
}

struct FieldMappingVisitor;

impl<'de> Visitor<'de> for FieldMappingVisitor {
    type Value = FieldMapping;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table of field names to dataset names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        // Collected as pairs so the document order survives
        let mut entries: Vec<(String, String)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((field, dataset)) = access.next_entry::<String, String>()? {
            entries.push((field, dataset));
        }
        FieldMapping::new(entries).map_err(serde::de::Error::custom)
    }
}
