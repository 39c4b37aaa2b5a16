use std::path::{Component, Path};

use crate::error::{FsError, InvalidPathKind};

/// Split a path into its name components, ignoring the root and `.`.
///  An empty result denotes the node the path is resolved against.
pub fn split(path: &Path) -> Result<Vec<String>, FsError> {
    let display = || path.to_string_lossy().to_string();
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(FsError::invalid_path(
                    display(),
                    InvalidPathKind::Unsupported,
                ))
            }
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| FsError::invalid_path(display(), InvalidPathKind::Unsupported))?;
                parts.push(part.to_string());
            }
        }
    }
    Ok(parts)
}

/// Split a path that must name something below the root
pub fn split_non_empty(path: &Path) -> Result<(Vec<String>, String), FsError> {
    let mut parts = split(path)?;
    let last = parts
        .pop()
        .ok_or_else(|| FsError::invalid_path(path.to_string_lossy(), InvalidPathKind::Root))?;
    Ok((parts, last))
}
