//! Printable-string scavenging from binary asset files.
//!
//! Model and material files have no published schema. Rather than decode
//! geometry or shader graphs, the toolkit treats them as a bag of
//! NUL-terminated byte runs and keeps whatever decodes as printable ASCII.
//! This picks up unrelated embedded strings too, so every consumer applies
//! its own filtering on top (see the classification filters in
//! [`crate::xmodel`] and [`crate::material`]).

/// Extract the printable ASCII runs of a byte buffer.
///
/// The buffer is split on NUL bytes; within each run, non-ASCII bytes are
/// dropped and the result is whitespace-trimmed. Empty runs are skipped.
/// A buffer with no NULs yields a single string; an all-NUL buffer yields
/// nothing.
pub fn printable_strings(data: &[u8]) -> Vec<String> {
    data.split(|&b| b == 0)
        .filter_map(|run| {
            if run.is_empty() {
                return None;
            }
            let decoded: String = run
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| b as char)
                .collect();
            let trimmed = decoded.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
