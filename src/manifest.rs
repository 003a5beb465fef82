use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ProjectError, Result};

/// File name of the project descriptor inside a project root.
pub const MANIFEST_FILE: &str = "project.json";

/// `projectType` value that marks a library project.
pub const LIBRARY_PROJECT_TYPE: &str = "Library";

/// Parsed `project.json`.
///
/// The raw JSON object is retained as loaded so unknown fields survive a
/// round trip through [`Manifest::to_value`]. The fields this crate
/// understands are extracted once, when the manifest is built, and any value
/// of the wrong shape is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    raw: Map<String, Value>,
    fields: ManifestFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ManifestFields {
    name: Option<String>,
    description: Option<String>,
    project_version: Option<String>,
    project_type: Option<String>,
    private_workflows: Vec<String>,
    dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Build a manifest from already-parsed JSON. Anything other than an
    /// object yields an empty manifest.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(raw) => Self::from_object(raw),
            other => {
                tracing::warn!(kind = json_kind(&other), "manifest root is not an object; ignoring");
                Self::default()
            }
        }
    }

    fn from_object(raw: Map<String, Value>) -> Self {
        let fields = ManifestFields {
            name: string_field(&raw, "name"),
            description: string_field(&raw, "description"),
            project_version: string_field(&raw, "projectVersion"),
            project_type: string_field(&raw, "projectType"),
            private_workflows: private_workflows_field(&raw),
            dependencies: dependencies_field(&raw),
        };
        Self { raw, fields }
    }

    pub fn name(&self) -> &str {
        self.fields.name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.fields.description.as_deref().unwrap_or_default()
    }

    /// `projectVersion`, verbatim.
    pub fn version(&self) -> &str {
        self.fields.project_version.as_deref().unwrap_or_default()
    }

    pub fn project_type(&self) -> Option<&str> {
        self.fields.project_type.as_deref()
    }

    /// Exact, case-sensitive match against [`LIBRARY_PROJECT_TYPE`].
    pub fn is_library(&self) -> bool {
        self.project_type() == Some(LIBRARY_PROJECT_TYPE)
    }

    /// `libraryOptions.privateWorkflows` as written in the manifest.
    pub fn private_workflows(&self) -> &[String] {
        &self.fields.private_workflows
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.fields.dependencies
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Read and parse `project.json` directly inside `root`.
pub fn load_manifest_from_dir(root: &Path) -> Result<Manifest> {
    let path = manifest_path(root);
    tracing::debug!(path = %path.display(), "reading project manifest");
    let content = fs::read_to_string(&path).map_err(|source| ProjectError::ManifestRead {
        path: path.clone(),
        source,
    })?;
    parse_manifest_str(&content, &path)
}

pub(crate) fn parse_manifest_str(content: &str, path: &Path) -> Result<Manifest> {
    // leading UTF-8 BOM is tolerated
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let value: Value =
        serde_json::from_str(content).map_err(|source| ProjectError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
    match value {
        Value::Object(raw) => Ok(Manifest::from_object(raw)),
        _ => Err(ProjectError::ManifestNotObject {
            path: path.to_path_buf(),
        }),
    }
}

fn string_field(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn private_workflows_field(raw: &Map<String, Value>) -> Vec<String> {
    let Some(entries) = raw
        .get("libraryOptions")
        .and_then(|options| options.get("privateWorkflows"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn dependencies_field(raw: &Map<String, Value>) -> BTreeMap<String, String> {
    let Some(entries) = raw.get("dependencies").and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(name, version)| {
            let Some(version) = version.as_str() else {
                tracing::trace!(dependency = %name, "skipping dependency with non-string version");
                return None;
            };
            Some((name.clone(), version.to_string()))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
