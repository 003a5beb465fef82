//! Read-only view of a UiPath project: `project.json` metadata plus the
//! workflow (`.xaml`) files found under the project root.

pub mod error;
pub mod manifest;
pub mod project;
pub mod utils;
pub mod workflows;

pub use error::{ProjectError, Result};
pub use manifest::{LIBRARY_PROJECT_TYPE, MANIFEST_FILE, Manifest};
pub use project::{ProjectDescriptor, ProjectSummary};
pub use workflows::{WORKFLOW_EXTENSION, WorkflowQuery};
