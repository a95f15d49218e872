use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `text` to `path` through a tempfile rename in the target
/// directory, creating parent directories as needed. An interrupted run
/// never leaves a half-written command or config file behind.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Replace the region from `start_marker` through `end_marker` (inclusive)
/// with `replacement`. Returns `None` when either marker is missing so the
/// caller can leave the original content untouched.
pub fn splice_between_markers(
    content: &str,
    start_marker: &str,
    end_marker: &str,
    replacement: &str,
) -> Option<String> {
    let start_pos = content.find(start_marker)?;
    let search_from = start_pos + start_marker.len();
    let end_pos = search_from + content[search_from..].find(end_marker)? + end_marker.len();

    let mut updated = String::with_capacity(content.len() + replacement.len());
    updated.push_str(&content[..start_pos]);
    updated.push_str(replacement);
    updated.push_str(&content[end_pos..]);
    Some(updated)
}
