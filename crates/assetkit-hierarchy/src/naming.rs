//! Artifact naming and file name sanitizing.

use tracing::debug;

use assetkit_types::{ClassId, PathId};
use assetkit_workspace::{ObjectHandle, ValueField, Workspace};

const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace every character that is illegal in a file name on common
/// filesystems with `_`.
///
/// Names that would still be unusable (empty, `.` or `..`) become `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if ILLEGAL.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    match sanitized.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => sanitized,
    }
}

/// File name of an exported component:
/// `{display name}-{container file name}-{path id}.{ext}`.
pub fn artifact_file_name(name: &str, file: &str, path_id: PathId, ext: &str) -> String {
    format!(
        "{}-{}-{}.{}",
        sanitize_file_name(name),
        sanitize_file_name(file),
        path_id,
        ext
    )
}

/// Chooses the display name of an exported object.
pub trait AssetNamer: Send + Sync {
    /// Name for `object`, whose value tree is `field`.
    ///
    /// The result is sanitized by the caller.
    fn display_name(
        &self,
        workspace: &dyn Workspace,
        object: &ObjectHandle,
        field: &ValueField,
    ) -> String;
}

/// `m_Name` when present, otherwise the class name.
///
/// Unnamed script components fall back to their script's class name.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNamer;

impl AssetNamer for DefaultNamer {
    fn display_name(
        &self,
        workspace: &dyn Workspace,
        object: &ObjectHandle,
        field: &ValueField,
    ) -> String {
        if let Some(name) = field.get("m_Name").and_then(ValueField::as_str) {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        if object.class_id == ClassId::MONO_BEHAVIOUR {
            if let Some(script) = field.get("m_Script").and_then(ValueField::as_reference) {
                match workspace.resolve_field(object.container(), &script) {
                    Ok((_, script_field)) => {
                        if let Some(class_name) =
                            script_field.get("m_ClassName").and_then(ValueField::as_str)
                        {
                            if !class_name.is_empty() {
                                return class_name.to_string();
                            }
                        }
                    }
                    Err(e) => debug!(object = %object.key, error = %e, "script not resolved"),
                }
            }
        }

        object.class_id.to_string()
    }
}
