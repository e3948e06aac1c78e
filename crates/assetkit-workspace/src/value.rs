//! Object value trees.
//!
//! Every object's data is a tree of [`ValueField`]s. Struct fields keep
//! their on-disk order, which matters both for dumps and for component
//! lists. Fields are addressed with dotted paths such as
//! `m_Component.Array` or `m_Children.Array.0`.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use assetkit_types::ObjectReference;

use crate::error::{WorkspaceError, WorkspaceResult};

/// Field name of the file index inside a serialized object reference.
pub const FILE_ID_FIELD: &str = "m_FileID";
/// Field name of the path id inside a serialized object reference.
pub const PATH_ID_FIELD: &str = "m_PathID";
/// Name of the wrapper field that holds an array's elements.
pub const ARRAY_FIELD: &str = "Array";

/// A node of an object's value tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueField {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Array(Vec<ValueField>),
    Struct(Fields),
}

impl ValueField {
    /// Build a struct value from `(name, value)` pairs, keeping their order.
    pub fn structure<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ValueField)>,
    {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build the serialized form of an object reference.
    pub fn reference(reference: ObjectReference) -> Self {
        Self::structure([
            (FILE_ID_FIELD, ValueField::Int(reference.file_id.into())),
            (PATH_ID_FIELD, ValueField::Int(reference.path_id.0)),
        ])
    }

    /// Build an array wrapped the way container data wraps arrays
    /// (`{"Array": [...]}`).
    pub fn wrapped_array(items: Vec<ValueField>) -> Self {
        Self::structure([(ARRAY_FIELD, ValueField::Array(items))])
    }

    /// Direct child field of a struct.
    pub fn get(&self, name: &str) -> Option<&ValueField> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Field at a dotted path.
    ///
    /// A numeric segment indexes an array. An `Array` segment applied to a
    /// bare array is a no-op, so `m_Children.Array` works whether or not the
    /// array is wrapped.
    pub fn get_path(&self, path: &str) -> Option<&ValueField> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Self::Array(items) => {
                    if segment == ARRAY_FIELD {
                        current
                    } else {
                        items.get(segment.parse::<usize>().ok()?)?
                    }
                }
                Self::Struct(fields) => fields.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Field at a dotted path, or [`WorkspaceError::MissingField`].
    pub fn require(&self, path: &str) -> WorkspaceResult<&ValueField> {
        self.get_path(path)
            .ok_or_else(|| WorkspaceError::MissingField(path.to_string()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Elements of an array, looking through an `{"Array": [...]}` wrapper.
    pub fn as_array(&self) -> Option<&[ValueField]> {
        match self {
            Self::Array(items) => Some(items),
            Self::Struct(fields) => match fields.get(ARRAY_FIELD) {
                Some(Self::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        }
    }

    /// Read this value as a serialized object reference.
    pub fn as_reference(&self) -> Option<ObjectReference> {
        let file_id = self.get(FILE_ID_FIELD)?.as_i64()?;
        let path_id = self.get(PATH_ID_FIELD)?.as_i64()?;
        Some(ObjectReference::new(i32::try_from(file_id).ok()?, path_id))
    }
}

impl From<&str> for ValueField {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ValueField {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ValueField {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ValueField {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<ObjectReference> for ValueField {
    fn from(value: ObjectReference) -> Self {
        Self::reference(value)
    }
}

/// Ordered struct fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields(Vec<(String, ValueField)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: ValueField) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ValueField> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueField)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ValueField)> for Fields {
    fn from_iter<T: IntoIterator<Item = (String, ValueField)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Fields::new();
                while let Some((name, value)) = access.next_entry::<String, ValueField>()? {
                    fields.insert(name, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
