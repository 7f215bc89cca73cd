//! Small helpers shared by the pipeline and the API.

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts chars rather than bytes so multi-byte titles never split.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &input[..cut]),
        None => input.to_string(),
    }
}

/// Format a count with thousands separators (`1234567` -> `1,234,567`).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Object key for a generated track: `{unix_millis}-{video_id}.mp3`.
///
/// Characters outside `[A-Za-z0-9_-]` in the external id are replaced so
/// the key is always a single safe path segment.
pub fn track_object_key(unix_millis: i64, video_id: &str) -> String {
    let safe: String = video_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-{}.mp3", unix_millis, safe)
}

/// Check that a requested object name is a single, non-traversing segment.
pub fn is_safe_object_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.starts_with('.')
        && name.chars().all(|c| !c.is_control())
}

/// Check that an audio location is an absolute http(s) URL.
pub fn is_valid_audio_url(location: &str) -> bool {
    match url::Url::parse(location) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
