use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single configuration value.
///
/// This is the full value grammar of the text format: numbers, keyword
/// literals, strings, flat lists, and nested field mappings. Decoding
/// normalizes numerics: a whole-valued float becomes [`Value::Int`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float with a non-whole value.
    Float(f64),
    /// The `true` / `false` keyword literals.
    Bool(bool),
    /// The `null` keyword literal.
    Null,
    /// A bare or quoted string.
    Str(String),
    /// A comma-separated list of scalars.
    List(Vec<Value>),
    /// A nested field mapping, one indentation level deeper.
    Map(Fields),
}

impl Value {
    /// Build a numeric value, demoting whole-valued floats to `Int`.
    pub fn from_f64(n: f64) -> Self {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Numeric view of the value, if it is `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean view of the value, if it is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String view of the value, if it is `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::from_f64(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::scalar::to_text(self))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
            Value::Map(fields) => fields.serialize(serializer),
        }
    }
}

/// An ordered field-name → [`Value`] mapping.
///
/// Insertion order is preserved because it drives both the application
/// order of entity attributes and the byte layout of the encoded text.
/// Inserting an existing key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    /// Create an empty field mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Return `true` if the field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// An ordered item-name → [`Fields`] mapping: one section of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    items: Vec<(String, Fields)>,
}

impl Section {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, replacing any existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, fields: Fields) {
        let name = name.into();
        match self.items.iter_mut().find(|(n, _)| *n == name) {
            Some(item) => item.1 = fields,
            None => self.items.push((name, fields)),
        }
    }

    /// Look up an item by name.
    pub fn get(&self, name: &str) -> Option<&Fields> {
        self.items.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Iterate over items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fields)> {
        self.items.iter().map(|(n, f)| (n.as_str(), f))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (n, f) in self.iter() {
            map.serialize_entry(n, f)?;
        }
        map.end()
    }
}

/// The structured result of decoding the text configuration format:
/// an ordered section-name → [`Section`] mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sections: Vec<(String, Section)>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section, replacing any existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, section: Section) {
        let name = name.into();
        match self.sections.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = section,
            None => self.sections.push((name, section)),
        }
    }

    /// Look up a section by name.
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Iterate over sections in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Return `true` if there are no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (n, s) in self.iter() {
            map.serialize_entry(n, s)?;
        }
        map.end()
    }
}
