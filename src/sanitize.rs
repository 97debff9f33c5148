// src/sanitize.rs
//! Name sanitization for collection directories and uploaded files.
//!
//! Collection names come from arbitrary URLs or user input and end up as
//! directory names directly under the storage root, so the output alphabet
//! is restricted to `[A-Za-z0-9_-]`.

use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static RESERVED_CHARS_RE: OnceLock<Regex> = OnceLock::new();
static UNSAFE_CHARS_RE: OnceLock<Regex> = OnceLock::new();
static UNDERSCORE_RUN_RE: OnceLock<Regex> = OnceLock::new();
static FILENAME_STRIP_RE: OnceLock<Regex> = OnceLock::new();

/// Device names Windows refuses as file stems.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

// ---------------------------------------------------------------------------
// Directory names
// ---------------------------------------------------------------------------

/// Turn arbitrary text into a directory-safe collection name.
///
/// Steps, in order:
/// 1. drop the characters `<>:"/\|?*`
/// 2. replace every other character outside `[A-Za-z0-9_-]` with `_`
/// 3. collapse runs of `_` into one
/// 4. trim `_` from both ends
///
/// The result may be empty. Distinct inputs can map to the same name.
pub fn sanitize_directory_name(input: &str) -> String {
    let reserved = RESERVED_CHARS_RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
    let unsafe_chars = UNSAFE_CHARS_RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_-]").unwrap());
    let runs = UNDERSCORE_RUN_RE.get_or_init(|| Regex::new(r"_+").unwrap());

    let stripped = reserved.replace_all(input, "");
    let replaced = unsafe_chars.replace_all(&stripped, "_");
    let collapsed = runs.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

/// Missing input sanitizes like the empty string.
pub fn sanitize_optional(input: Option<&str>) -> String {
    sanitize_directory_name(input.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Upload file names
// ---------------------------------------------------------------------------

/// Reduce a client-supplied upload name to a safe single path component.
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` (including non-ASCII) is dropped and leading or
/// trailing `.`/`_` are trimmed. An empty return value means nothing usable
/// was left.
pub fn secure_filename(name: &str) -> String {
    let strip = FILENAME_STRIP_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

    let ascii: String = name
        .chars()
        .filter(|c| c.is_ascii())
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = strip.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return String::new();
    }

    let stem = trimmed.split('.').next().unwrap_or_default().to_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    }
}
