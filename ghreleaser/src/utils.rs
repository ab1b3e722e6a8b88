use std::path::{Component, Path};

/// Render `path` relative to `root` with `/` separators.
///
/// Paths outside `root` are rendered as given.
pub fn relative_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();

    parts.join("/")
}

/// Base filename of a path, if it has one
pub fn base_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
