use std::io;
use std::path::{Component, Path, PathBuf};

/// Absolute form of `path` against the current directory, with `.` and `..`
/// folded away lexically. Symlinks are left alone.
pub fn resolve_absolute(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(normalize_lexically(&absolute))
}

pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Comparable form of a project-relative workflow path as written in
/// `project.json`. Both `/` and `\` separate segments. `None` when a `..`
/// climbs above the project root.
pub fn workflow_key(raw: &str) -> Option<Vec<String>> {
    let mut segments: Vec<String> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other.to_string()),
        }
    }
    Some(segments)
}

/// Comparable form of a path already relative to the project root.
pub fn relative_path_key(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}
