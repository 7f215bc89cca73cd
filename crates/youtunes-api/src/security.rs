//! Request validation helpers.

use youtunes_models::is_safe_object_name;

/// Check an `Authorization` header value against the trigger secret.
///
/// Comparison runs over the full length regardless of where the first
/// mismatch is.
pub fn bearer_matches(header: Option<&str>, secret: &str) -> bool {
    let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
        return false;
    };

    let (a, b) = (token.as_bytes(), secret.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Validate a requested audio file name.
///
/// One flat segment of `[A-Za-z0-9_.-]`, no traversal.
pub fn is_valid_track_file(name: &str) -> bool {
    is_safe_object_name(name)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}
