//! Secret handling for logs.

/// Redact sensitive values for safe logging. Shows first 4 chars + "***" suffix.
pub fn redact(value: &str) -> String {
    match value.char_indices().nth(4) {
        Some((end, _)) => format!("{}***", &value[..end]),
        None => "***".to_string(),
    }
}
