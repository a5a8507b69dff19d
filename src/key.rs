//! Storage key construction.
//!
//! Keys are always `/`-separated regardless of platform. The destination
//! prefix is normalised; the relative part may not climb out of it or be
//! rooted. Only `/` separates segments of the relative part, so a `\` in a
//! file name stays literal, the same way glob matching sees it.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("relative path `{0}` escapes the destination prefix")]
    Traversal(String),
    #[error("relative path `{0}` is rooted")]
    Rooted(String),
    #[error("relative path is empty")]
    Empty,
}

/// Normalised prefix segments: empty and `.` segments dropped, `..` resolved
/// against what precedes it and never above the bucket root.
fn prefix_segments(prefix: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in prefix.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

/// Leading separator or a drive prefix such as `C:`.
fn is_rooted(relative: &str) -> bool {
    match relative.as_bytes() {
        [b'/' | b'\\', ..] => true,
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// `prefix` joined with `relative`, e.g. `("site/", "css/app.css")` gives
/// `site/css/app.css`.
pub fn object_key(prefix: &str, relative: &str) -> Result<String, KeyError> {
    if is_rooted(relative) {
        return Err(KeyError::Rooted(relative.to_string()));
    }
    let mut segments = prefix_segments(prefix);
    let base_len = segments.len();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(KeyError::Traversal(relative.to_string())),
            s => segments.push(s),
        }
    }
    if segments.len() == base_len {
        return Err(KeyError::Empty);
    }
    Ok(segments.join("/"))
}

/// Listing prefix covering everything under `prefix`: the normalised prefix
/// with a trailing `/`, or empty for the bucket root.
pub fn listing_prefix(prefix: &str) -> String {
    let segments = prefix_segments(prefix);
    if segments.is_empty() {
        String::new()
    } else {
        format!("{}/", segments.join("/"))
    }
}
