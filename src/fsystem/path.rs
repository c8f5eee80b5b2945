use crate::fsystem::{FileSystem, NodeId};

/// Resolve a `/` separated path starting from `start`. `.` and empty parts are
/// skipped, `..` goes up (staying put at a directory with no parent), and a
/// part naming the current directory itself is skipped too. A leading `/`
/// starts from the root. Returns `None` as soon as a part cannot be found.
pub fn resolve(fs: &FileSystem, start: NodeId, path: &str) -> Option<NodeId> {
    let mut cursor = if path.starts_with('/') { fs.root() } else { start };
    for part in path.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            if let Some(parent) = fs.parent(cursor) {
                cursor = parent;
            }
            continue;
        }
        if fs.name(cursor) == part {
            continue;
        }
        cursor = fs.child(cursor, part)?;
    }
    Some(cursor)
}

/// Last component of a `/` separated path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
