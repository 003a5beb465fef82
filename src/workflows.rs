use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{ProjectError, Result};
use crate::utils::paths::{relative_path_key, workflow_key};

/// Extension of workflow source files, compared ASCII case-insensitively.
pub const WORKFLOW_EXTENSION: &str = "xaml";

/// Options for a workflow listing. The default lists only top-level files
/// and keeps private ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowQuery {
    pub recursive: bool,
    pub exclude_private: bool,
}

impl WorkflowQuery {
    pub fn new(recursive: bool, exclude_private: bool) -> Self {
        Self {
            recursive,
            exclude_private,
        }
    }
}

/// List workflow files under `root`, reading the directory fresh each call.
///
/// Paths are returned joined onto `root` and sorted by their path relative
/// to it. When `query.exclude_private` is set, any file whose relative path
/// matches an entry of `private` is dropped.
pub fn list_workflows<S>(root: &Path, query: WorkflowQuery, private: &[S]) -> Result<Vec<PathBuf>>
where
    S: AsRef<str>,
{
    let max_depth = if query.recursive { usize::MAX } else { 1 };
    tracing::debug!(
        root = %root.display(),
        recursive = query.recursive,
        exclude_private = query.exclude_private,
        "listing workflow files"
    );

    let private_keys: HashSet<Vec<String>> = if query.exclude_private {
        private
            .iter()
            .filter_map(|entry| {
                let raw: &str = entry.as_ref();
                let key = workflow_key(raw);
                if key.is_none() {
                    tracing::debug!(entry = raw, "private entry escapes project root; ignoring");
                }
                key
            })
            .collect()
    } else {
        HashSet::new()
    };

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden_dir(entry));

    let mut found = Vec::new();
    let mut excluded = 0usize;
    for entry in walker {
        let entry = entry.map_err(|source| ProjectError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !is_workflow(entry.path()) || !is_file_target(&entry) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if !private_keys.is_empty() && private_keys.contains(&relative_path_key(relative)) {
            tracing::trace!(path = %relative.display(), "excluding private workflow");
            excluded += 1;
            continue;
        }
        found.push(relative.to_path_buf());
    }

    found.sort();
    tracing::debug!(found = found.len(), excluded, "workflow listing complete");
    Ok(found.into_iter().map(|relative| root.join(relative)).collect())
}

pub fn is_workflow(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WORKFLOW_EXTENSION))
}

/// Dot-prefixed directories below the root. Dot-prefixed files are kept.
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Regular files, plus symlinks whose target is a regular file. Linked
/// directories are never descended into.
fn is_file_target(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink() && fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, "<Activity />").expect("write file");
    }

    fn layout() -> TempDir {
        let tmp = tempdir().expect("temp dir");
        touch(tmp.path(), "Main.xaml");
        touch(tmp.path(), "Process.XAML");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "Framework/InitAllSettings.xaml");
        touch(tmp.path(), "Framework/Deep/GetTransactionData.xaml");
        touch(tmp.path(), ".local/cache.xaml");
        touch(tmp.path(), "Framework/.screenshots/shot.xaml");
        tmp
    }

    fn relative_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|file| {
                file.strip_prefix(root)
                    .expect("under root")
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }

    #[test]
    fn top_level_only_by_default() {
        let tmp = layout();
        let none: [&str; 0] = [];
        let files = list_workflows(tmp.path(), WorkflowQuery::default(), &none).expect("list");

        assert_eq!(relative_names(tmp.path(), &files), vec!["Main.xaml", "Process.XAML"]);
        assert!(files.iter().all(|file| file.starts_with(tmp.path())));
    }

    #[test]
    fn recursive_walks_subdirectories_but_skips_hidden() {
        let tmp = layout();
        let none: [&str; 0] = [];
        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(true, false), &none).expect("list");

        assert_eq!(
            relative_names(tmp.path(), &files),
            vec![
                "Framework/Deep/GetTransactionData.xaml",
                "Framework/InitAllSettings.xaml",
                "Main.xaml",
                "Process.XAML",
            ]
        );
    }

    #[test]
    fn exclude_private_matches_either_separator() {
        let tmp = layout();
        let private = ["Framework\\InitAllSettings.xaml", "./Main.xaml"];
        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(true, true), &private).expect("list");

        assert_eq!(
            relative_names(tmp.path(), &files),
            vec!["Framework/Deep/GetTransactionData.xaml", "Process.XAML"]
        );
    }

    #[test]
    fn private_list_is_ignored_unless_requested() {
        let tmp = layout();
        let private = ["Main.xaml"];
        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(false, false), &private).expect("list");

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn private_entry_for_nested_file_does_not_hide_same_name_at_top() {
        let tmp = tempdir().expect("temp dir");
        touch(tmp.path(), "Helper.xaml");
        touch(tmp.path(), "Internal/Helper.xaml");
        let private = ["Internal/Helper.xaml"];

        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(true, true), &private).expect("list");
        assert_eq!(relative_names(tmp.path(), &files), vec!["Helper.xaml"]);
    }

    #[test]
    fn directories_named_like_workflows_are_not_listed() {
        let tmp = tempdir().expect("temp dir");
        fs::create_dir_all(tmp.path().join("Odd.xaml")).expect("create dir");
        let none: [&str; 0] = [];

        let files = list_workflows(tmp.path(), WorkflowQuery::default(), &none).expect("list");
        assert!(files.is_empty());
    }

    #[test]
    fn listing_observes_changes_between_calls() {
        let tmp = tempdir().expect("temp dir");
        let none: [&str; 0] = [];
        assert!(list_workflows(tmp.path(), WorkflowQuery::default(), &none)
            .expect("list")
            .is_empty());

        touch(tmp.path(), "Late.xaml");
        let files = list_workflows(tmp.path(), WorkflowQuery::default(), &none).expect("list");
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn dot_prefixed_top_level_file_is_listed() {
        let tmp = tempdir().expect("temp dir");
        touch(tmp.path(), ".Hidden.xaml");
        let none: [&str; 0] = [];

        let files = list_workflows(tmp.path(), WorkflowQuery::default(), &none).expect("list");
        assert_eq!(relative_names(tmp.path(), &files), vec![".Hidden.xaml"]);
    }

    #[test]
    fn dot_prefixed_nested_file_is_listed_but_hidden_dirs_are_not() {
        let tmp = layout();
        touch(tmp.path(), "Framework/.Draft.xaml");
        let none: [&str; 0] = [];

        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(true, false), &none).expect("list");
        let names = relative_names(tmp.path(), &files);
        assert!(names.contains(&"Framework/.Draft.xaml".to_string()), "{names:?}");
        assert!(!names.iter().any(|name| name.contains(".local")), "{names:?}");
        assert!(!names.iter().any(|name| name.contains(".screenshots")), "{names:?}");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_workflow_file_is_listed() {
        let outside = tempdir().expect("temp dir");
        touch(outside.path(), "Shared.xaml");
        let tmp = tempdir().expect("temp dir");
        touch(tmp.path(), "Main.xaml");
        std::os::unix::fs::symlink(outside.path().join("Shared.xaml"), tmp.path().join("Linked.xaml"))
            .expect("symlink file");
        std::os::unix::fs::symlink(outside.path().join("Missing.xaml"), tmp.path().join("Dangling.xaml"))
            .expect("symlink dangling");
        let none: [&str; 0] = [];

        let files = list_workflows(tmp.path(), WorkflowQuery::default(), &none).expect("list");
        assert_eq!(relative_names(tmp.path(), &files), vec!["Linked.xaml", "Main.xaml"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_not_descended() {
        let outside = tempdir().expect("temp dir");
        touch(outside.path(), "Elsewhere/Remote.xaml");
        let tmp = tempdir().expect("temp dir");
        touch(tmp.path(), "Main.xaml");
        std::os::unix::fs::symlink(outside.path().join("Elsewhere"), tmp.path().join("Linked"))
            .expect("symlink dir");
        let none: [&str; 0] = [];

        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(true, false), &none).expect("list");
        assert_eq!(relative_names(tmp.path(), &files), vec!["Main.xaml"]);
    }

    #[test]
    fn private_entry_escaping_root_hides_nothing() {
        let tmp = tempdir().expect("temp dir");
        touch(tmp.path(), "uno.xaml");
        let private = ["../uno.xaml"];

        let files =
            list_workflows(tmp.path(), WorkflowQuery::new(false, true), &private).expect("list");
        assert_eq!(relative_names(tmp.path(), &files), vec!["uno.xaml"]);
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let tmp = tempdir().expect("temp dir");
        let none: [&str; 0] = [];
        let err = list_workflows(&tmp.path().join("gone"), WorkflowQuery::default(), &none)
            .expect_err("missing root");
        assert!(matches!(err, ProjectError::Walk { .. }));
    }
}
