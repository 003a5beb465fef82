use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{ProjectError, Result};
use crate::manifest::{Manifest, load_manifest_from_dir};
use crate::utils::paths::resolve_absolute;
use crate::workflows::{WorkflowQuery, list_workflows};

/// A UiPath project rooted at a directory containing `project.json`.
///
/// The manifest is read once, at construction. Workflow listings read the
/// directory tree again on every call.
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    root: PathBuf,
    manifest: Manifest,
}

impl ProjectDescriptor {
    /// Resolve `path` to an absolute directory and load its `project.json`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = resolve_root(path.as_ref())?;
        let manifest = load_manifest_from_dir(&root)?;
        tracing::debug!(
            root = %root.display(),
            name = manifest.name(),
            "opened project"
        );
        Ok(Self { root, manifest })
    }

    /// Build a descriptor over `path` from an already-parsed manifest,
    /// without touching the file system beyond resolving the path.
    pub fn from_manifest(path: impl AsRef<Path>, manifest: Value) -> Result<Self> {
        let root = resolve_root(path.as_ref())?;
        Ok(Self {
            root,
            manifest: Manifest::from_value(manifest),
        })
    }

    /// Swap in a different manifest. Meant for tooling and tests that need
    /// to look at a project through an edited descriptor; nothing is written
    /// back to disk.
    pub fn replace_manifest(&mut self, manifest: Value) {
        self.manifest = Manifest::from_value(manifest);
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        self.manifest.name()
    }

    pub fn description(&self) -> &str {
        self.manifest.description()
    }

    pub fn version(&self) -> &str {
        self.manifest.version()
    }

    pub fn is_library(&self) -> bool {
        self.manifest.is_library()
    }

    pub fn private_workflows(&self) -> &[String] {
        self.manifest.private_workflows()
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        self.manifest.dependencies()
    }

    /// Absolute project root.
    pub fn project_path(&self) -> &Path {
        &self.root
    }

    /// Workflow files under the project root.
    ///
    /// `recursive` descends into subdirectories (hidden ones excepted);
    /// `exclude_private` drops files listed under
    /// `libraryOptions.privateWorkflows`.
    pub fn xaml_files(&self, recursive: bool, exclude_private: bool) -> Result<Vec<PathBuf>> {
        self.xaml_files_with(WorkflowQuery::new(recursive, exclude_private))
    }

    pub fn xaml_files_with(&self, query: WorkflowQuery) -> Result<Vec<PathBuf>> {
        list_workflows(&self.root, query, self.private_workflows())
    }

    /// Every workflow in the tree that is not marked private.
    pub fn public_workflows(&self) -> Result<Vec<PathBuf>> {
        self.xaml_files(true, true)
    }

    pub fn summary(&self) -> ProjectSummary<'_> {
        ProjectSummary {
            name: self.name(),
            description: self.description(),
            version: self.version(),
            library: self.is_library(),
            path: self.project_path(),
            dependencies: self.dependencies(),
            private_workflows: self.private_workflows(),
        }
    }
}

/// Serializable snapshot of a project's metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub version: &'a str,
    pub library: bool,
    pub path: &'a Path,
    pub dependencies: &'a BTreeMap<String, String>,
    pub private_workflows: &'a [String],
}

fn resolve_root(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ProjectError::InvalidPath);
    }
    resolve_absolute(path).map_err(|source| ProjectError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}
