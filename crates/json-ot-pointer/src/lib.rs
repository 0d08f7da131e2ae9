//! Document paths for json-ot.
//!
//! A [`Path`] locates one value inside a JSON document, starting from the
//! root. Paths can be written and read as [JSON Pointers (RFC 6901)](https://tools.ietf.org/html/rfc6901);
//! numeric pointer tokens become [`PathStep::Index`], everything else a
//! [`PathStep::Key`].
//!
//! # Example
//!
//! ```
//! use json_ot_pointer::{format_json_pointer, get, parse_json_pointer, PathStep};
//!
//! let path = parse_json_pointer("/items/1/title").unwrap();
//! assert_eq!(path, vec![PathStep::from("items"), PathStep::from(1usize), PathStep::from("title")]);
//! assert_eq!(format_json_pointer(&path), "/items/1/title");
//!
//! let doc = serde_json::json!({"items": [{"title": "a"}, {"title": "b"}]});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!("b")));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

mod get;
pub use get::{get, get_mut};

/// Maximum allowed path depth.
pub const MAX_PATH_LENGTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonPointerError {
    #[error("POINTER_INVALID")]
    PointerInvalid,
    #[error("NO_PARENT")]
    NoParent,
    #[error("Path too long")]
    PathTooLong,
}

/// Unescapes a JSON Pointer path component.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// ```
/// use json_ot_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 first, otherwise "~01" would turn into "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use json_ot_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Check if a pointer token is a canonical non-negative array index.
///
/// Leading zeros are rejected so `"01"` stays an object key.
pub fn is_valid_index(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let bytes = token.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Parse a JSON Pointer string into a typed path.
///
/// The empty string is the root. Tokens that are canonical array indices
/// become [`PathStep::Index`].
///
/// # Errors
///
/// - `PointerInvalid` if a non-empty pointer does not start with `/`
/// - `PathTooLong` if the pointer has more than [`MAX_PATH_LENGTH`] steps
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let rest = pointer
        .strip_prefix('/')
        .ok_or(JsonPointerError::PointerInvalid)?;
    let mut path = Vec::new();
    for token in rest.split('/') {
        if path.len() == MAX_PATH_LENGTH {
            return Err(JsonPointerError::PathTooLong);
        }
        let step = if is_valid_index(token) {
            match token.parse::<usize>() {
                Ok(idx) => PathStep::Index(idx),
                Err(_) => PathStep::Key(token.to_string()),
            }
        } else {
            PathStep::Key(unescape_component(token))
        };
        path.push(step);
    }
    Ok(path)
}

/// Format a path as a JSON Pointer string. The root formats as `""`.
pub fn format_json_pointer(path: &[PathStep]) -> String {
    let mut out = String::new();
    for step in path {
        out.push('/');
        match step {
            PathStep::Key(k) => out.push_str(&escape_component(k)),
            PathStep::Index(i) => out.push_str(&i.to_string()),
        }
    }
    out
}

/// Check if a path points to the root value.
pub fn is_root(path: &[PathStep]) -> bool {
    path.is_empty()
}

/// Check if `child` lies strictly below `parent`.
///
/// ```
/// use json_ot_pointer::{is_child, PathStep};
///
/// let parent = vec![PathStep::from("doc")];
/// let child = vec![PathStep::from("doc"), PathStep::from(0usize)];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// assert!(!is_child(&parent, &parent));
/// ```
pub fn is_child(parent: &[PathStep], child: &[PathStep]) -> bool {
    child.len() > parent.len() && child.starts_with(parent)
}

/// Check if `prefix` equals `path` or lies above it.
pub fn is_prefix(prefix: &[PathStep], path: &[PathStep]) -> bool {
    path.starts_with(prefix)
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns `NoParent` for the root path.
pub fn parent(path: &[PathStep]) -> Result<Path, JsonPointerError> {
    split_parent(path).map(|(p, _)| p.to_vec())
}

/// Split a path into its parent path and final step.
///
/// # Errors
///
/// Returns `NoParent` for the root path.
pub fn split_parent(path: &[PathStep]) -> Result<(&[PathStep], &PathStep), JsonPointerError> {
    match path.split_last() {
        Some((last, parent)) => Ok((parent, last)),
        None => Err(JsonPointerError::NoParent),
    }
}
