//! Path normalization and splitting.
//!
//! Paths are absolute, slash-delimited, and matched against child names
//! exactly (no case folding, no `.`/`..`). Normalization collapses slash
//! runs and strips a single trailing slash unless the path is the root.

/// Normalize a path: collapse runs of `/` and drop one trailing slash
/// unless the result is exactly `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !last_was_slash {
                out.push(c);
            }
            last_was_slash = true;
        } else {
            out.push(c);
            last_was_slash = false;
        }
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

/// Path segments of a normalized path, leading empty segment skipped.
pub fn segments(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split('/').filter(|s| !s.is_empty())
}

/// Split a normalized absolute path into parent path and final name.
///
/// The parent of a top-level entry is `/`. Returns `None` for relative
/// paths and for the root itself (which has no name).
pub fn split_parent(normalized: &str) -> Option<(&str, &str)> {
    let idx = normalized.rfind('/')?;
    if !normalized.starts_with('/') {
        return None;
    }
    let name = &normalized[idx + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if idx == 0 { "/" } else { &normalized[..idx] };
    Some((parent, name))
}
