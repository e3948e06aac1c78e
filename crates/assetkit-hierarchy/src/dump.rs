//! Value-tree serializers used for exported artifacts.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use assetkit_workspace::{ObjectHandle, ValueField};

use crate::error::{HierarchyError, HierarchyResult};

/// Turns an object's value tree into artifact bytes.
pub trait ValueSerializer: Send + Sync {
    /// File extension of produced artifacts, without the dot.
    fn extension(&self) -> &str;

    fn serialize(&self, object: &ObjectHandle, field: &ValueField) -> HierarchyResult<Vec<u8>>;
}

/// Pretty-printed JSON of the value tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonDump;

impl ValueSerializer for JsonDump {
    fn extension(&self) -> &str {
        "json"
    }

    fn serialize(&self, _object: &ObjectHandle, field: &ValueField) -> HierarchyResult<Vec<u8>> {
        serde_json::to_vec_pretty(field).map_err(|e| HierarchyError::Serialization(e.to_string()))
    }
}

/// Indented `name: value` lines under a `{class} Base` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDump;

impl TextDump {
    fn write_value(out: &mut String, depth: usize, name: &str, value: &ValueField) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match value {
            ValueField::Struct(fields) => {
                writeln!(out, "{indent}{name}")?;
                for (child, v) in fields.iter() {
                    Self::write_value(out, depth + 1, child, v)?;
                }
            }
            ValueField::Array(items) => {
                writeln!(out, "{indent}{name} (size {})", items.len())?;
                for (i, v) in items.iter().enumerate() {
                    Self::write_value(out, depth + 1, &format!("[{i}]"), v)?;
                }
            }
            ValueField::Null => writeln!(out, "{indent}{name}: null")?,
            ValueField::Bool(b) => writeln!(out, "{indent}{name}: {b}")?,
            ValueField::Int(v) => writeln!(out, "{indent}{name}: {v}")?,
            ValueField::UInt(v) => writeln!(out, "{indent}{name}: {v}")?,
            ValueField::Float(v) => writeln!(out, "{indent}{name}: {v}")?,
            ValueField::String(s) => writeln!(out, "{indent}{name}: {s:?}")?,
        }
        Ok(())
    }
}

impl ValueSerializer for TextDump {
    fn extension(&self) -> &str {
        "txt"
    }

    fn serialize(&self, object: &ObjectHandle, field: &ValueField) -> HierarchyResult<Vec<u8>> {
        let mut out = String::new();
        let header = format!("{} Base", object.class_id);
        let written = match field {
            ValueField::Struct(fields) => writeln!(out, "{header}").and_then(|_| {
                fields
                    .iter()
                    .try_for_each(|(name, v)| Self::write_value(&mut out, 1, name, v))
            }),
            other => Self::write_value(&mut out, 0, &header, other),
        };
        written.map_err(|e| HierarchyError::Serialization(e.to_string()))?;
        Ok(out.into_bytes())
    }
}

/// Built-in artifact formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    #[default]
    Json,
    Txt,
}

impl DumpFormat {
    pub fn serializer(&self) -> Box<dyn ValueSerializer> {
        match self {
            Self::Json => Box::new(JsonDump),
            Self::Txt => Box::new(TextDump),
        }
    }
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Txt => f.write_str("txt"),
        }
    }
}

impl FromStr for DumpFormat {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            other => Err(HierarchyError::Serialization(format!(
                "unknown dump format: {other}"
            ))),
        }
    }
}
