//! Per-directory ignore files listing exclude patterns

use std::path::Path;

use crate::{Error, Result};

/// Name of the ignore file looked up in each task's source directory.
pub const DEFAULT_IGNORE_FILE: &str = ".jackupignore";

/// Read exclude patterns from `<dir>/<file_name>`, one per line.
///
/// A missing file yields no patterns. Surrounding whitespace is trimmed;
/// blank lines and lines starting with `#` are skipped.
pub fn read_ignore_file(dir: &Path, file_name: &str) -> Result<Vec<String>> {
    let path = dir.join(file_name);
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let patterns = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect::<Vec<_>>();

    tracing::debug!(path = %path.display(), count = patterns.len(), "Read ignore file");
    Ok(patterns)
}
