//! Multi-field entity index.
//!
//! An Index keeps a homogeneous collection in insertion order and maintains
//! value buckets for a fixed set of fields, so that equality filters on those
//! fields don't have to scan the whole collection. Filters on any other field
//! fall back to a linear scan over whatever the indexed fields left over.

use std::collections::HashMap;
use std::fmt;

/// A field value as seen by the index.
///
/// `Null` is a defined value (e.g. an external package's `workspace`),
/// which is different from the field being absent altogether.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Null,
    Str(String),
}

impl FieldValue {
    /// Get the string value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Null => None,
            FieldValue::Str(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Str(s.clone())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// An entity that exposes named fields to the index.
pub trait Indexable {
    /// Get the value of a field, or `None` if the entity has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// A conjunction of field constraints.
///
/// Each condition is either "field equals value" or "field is absent".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Option<FieldValue>)>,
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to be present and equal to `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.conditions.push((field.into(), Some(value.into())));
        self
    }

    /// Require `field` to be absent.
    pub fn absent(mut self, field: impl Into<String>) -> Self {
        self.conditions.push((field.into(), None));
        self
    }

    /// Check if the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Get the conditions in the order they were added.
    pub fn conditions(&self) -> &[(String, Option<FieldValue>)] {
        &self.conditions
    }

    fn matches<T: Indexable>(&self, item: &T, skip: &[&str]) -> bool {
        self.conditions
            .iter()
            .filter(|(field, value)| value.is_none() || !skip.contains(&field.as_str()))
            .all(|(field, expected)| match expected {
                None => item.field(field).is_none(),
                Some(expected) => item.field(field).as_ref() == Some(expected),
            })
    }
}

/// Insertion-ordered collection with per-field value buckets.
#[derive(Debug, Clone)]
pub struct Index<T> {
    /// All entities, in insertion order
    items: Vec<T>,

    /// Indexed field names
    fields: Vec<&'static str>,

    /// field -> value -> positions (ascending)
    buckets: HashMap<&'static str, HashMap<FieldValue, Vec<usize>>>,
}

impl<T: Indexable> Index<T> {
    /// Create an index over the given fields.
    pub fn new(fields: &[&'static str]) -> Self {
        Index {
            items: Vec::new(),
            fields: fields.to_vec(),
            buckets: fields.iter().map(|f| (*f, HashMap::new())).collect(),
        }
    }

    /// Insert an entity, returning its position.
    pub fn insert(&mut self, item: T) -> usize {
        let position = self.items.len();

        for field in &self.fields {
            if let Some(value) = item.field(field) {
                self.buckets
                    .entry(*field)
                    .or_default()
                    .entry(value)
                    .or_default()
                    .push(position);
            }
        }

        self.items.push(item);
        position
    }

    /// Get the indexed field names.
    pub fn indexed_fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an entity by position.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    /// Iterate over all entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Find all entities matching a filter, in insertion order.
    pub fn find(&self, filter: &Filter) -> Vec<&T> {
        if filter.is_empty() {
            return self.items.iter().collect();
        }

        let mut candidates: Option<Vec<usize>> = None;
        let mut used = Vec::new();

        for (field, value) in filter.conditions() {
            let Some(value) = value else { continue };
            let Some(buckets) = self.buckets.get(field.as_str()) else {
                continue;
            };

            let bucket = match buckets.get(value) {
                Some(bucket) if !bucket.is_empty() => bucket,
                _ => return Vec::new(),
            };

            candidates = Some(match candidates {
                None => bucket.clone(),
                Some(current) => current
                    .into_iter()
                    .filter(|pos| bucket.binary_search(pos).is_ok())
                    .collect(),
            });
            used.push(field.as_str());

            if candidates.as_ref().is_some_and(Vec::is_empty) {
                return Vec::new();
            }
        }

        match candidates {
            Some(positions) => positions
                .into_iter()
                .map(|pos| &self.items[pos])
                .filter(|item| filter.matches(*item, &used))
                .collect(),
            None => self
                .items
                .iter()
                .filter(|item| filter.matches(*item, &used))
                .collect(),
        }
    }

    /// Find the first entity matching a filter.
    pub fn find_first(&self, filter: &Filter) -> Option<&T> {
        self.find(filter).into_iter().next()
    }
}
