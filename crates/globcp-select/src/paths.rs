//! Slash-separated path helpers
//!
//! Glob expressions and remote targets are plain strings with `/` separators,
//! independent of the local platform. These helpers convert local paths into
//! that form and join/normalize segments the way a POSIX path library does.

use std::path::Path;

/// Render a local path with forward-slash separators
pub fn to_slash(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if cfg!(windows) {
        rendered.replace('\\', "/")
    } else {
        rendered.into_owned()
    }
}

/// Normalize a slash-separated path.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment where
/// possible, and a leading or trailing `/` is preserved. An empty relative
/// result becomes `.`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if normalized.is_empty() {
        normalized.push('.');
    }
    if trailing && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Join slash-separated parts and normalize the result
pub fn join(base: &str, rest: &str) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => normalize(rest),
        (false, true) => normalize(base),
        (false, false) => normalize(&format!("{}/{}", base, rest)),
    }
}
