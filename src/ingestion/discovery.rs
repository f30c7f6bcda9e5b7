//! Input file enumeration.

use std::path::{Path, PathBuf};

use crate::error::ImportResult;

/// Default glob for input files.
pub const DEFAULT_INPUT_PATTERN: &str = "*.csv";

/// List the files in `dir` matching `pattern` (a glob relative to `dir`).
///
/// Directories are skipped; entries that cannot be read are logged and skipped. Callers must
/// not rely on the order beyond every matching file appearing exactly once.
pub fn discover_input_files(dir: impl AsRef<Path>, pattern: &str) -> ImportResult<Vec<PathBuf>> {
    let full = dir.as_ref().join(pattern);
    let full = full.to_string_lossy();

    let mut files = Vec::new();
    for entry in glob::glob(&full)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable input entry"),
        }
    }
    Ok(files)
}

/// Worksheet name for an input file: its base name without extension.
pub fn sheet_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::sheet_name_for;

    #[test]
    fn sheet_name_is_file_stem() {
        assert_eq!(sheet_name_for(Path::new("/data/2025/Fall Fair.csv")), "Fall Fair");
        assert_eq!(sheet_name_for(Path::new("people.csv")), "people");
    }
}
