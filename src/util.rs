use std::io::Write;
use std::path::Path;

/// Normalize a pipeline or stage identifier for tolerant comparison.
///
/// Trims, lowercases, and collapses internal whitespace runs to single
/// hyphens. Existing hyphens and other punctuation pass through, so
/// "Contract Signed" and "contract-signed" compare equal.
///
/// Example: "  Prospect " → "prospect"
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Turn a slug into a human-readable label.
///
/// Example: "contract-signed" → "Contract Signed"
pub fn format_label(value: &str) -> String {
    value
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write a file atomically: write to a temp file in the same directory,
/// then rename over the destination. A crash mid-write never leaves a
/// half-written entry behind.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
