//! Input file discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::warn;

use crate::error::{IngestError, Result};

/// Default file-name pattern for catalog exports.
pub const DEFAULT_PATTERN: &str = "*.csv";

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Compiles a shell-style file-name pattern (`*`, `?`) into a matcher.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|source| IngestError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Files in `dir` whose name matches `matcher`, optionally descending into
/// subdirectories. Sorted by path.
fn scan_dir(dir: &Path, matcher: &Regex, recursive: bool) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                files.extend(scan_dir(&path, matcher, true)?);
            }
            continue;
        }
        let name_matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| matcher.is_match(name));
        if name_matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Resolves CLI inputs into the ordered list of CSV files to load.
///
/// Explicit files are taken as given, directories are scanned with
/// `pattern`. With no inputs, `base_dir` is scanned instead. Only existing
/// `.csv` files survive, each at most once (compared by canonical path).
/// Missing inputs are reported and skipped.
pub fn discover_inputs(
    inputs: &[PathBuf],
    base_dir: &Path,
    pattern: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let matcher = compile_pattern(pattern)?;
    let mut candidates = Vec::new();
    if inputs.is_empty() {
        if base_dir.is_dir() {
            candidates.extend(scan_dir(base_dir, &matcher, recursive)?);
        } else {
            warn!(path = %base_dir.display(), "input directory not found");
        }
    }
    for input in inputs {
        if input.is_file() {
            if is_csv(input) {
                candidates.push(input.clone());
            } else {
                warn!(path = %input.display(), "skipping non-CSV input");
            }
        } else if input.is_dir() {
            candidates.extend(scan_dir(input, &matcher, recursive)?);
        } else {
            warn!(path = %input.display(), "input not found");
        }
    }

    let mut seen = BTreeSet::new();
    let mut files = Vec::new();
    for path in candidates {
        if !is_csv(&path) || !path.is_file() {
            continue;
        }
        let resolved = path.canonicalize().unwrap_or_else(|_| path.clone());
        if seen.insert(resolved) {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        let matcher = compile_pattern("JAPAN_*.csv").unwrap();
        assert!(matcher.is_match("JAPAN_USGS.csv"));
        assert!(!matcher.is_match("japan_usgs.csv"));
        assert!(!matcher.is_match("JAPAN_USGS.csv.bak"));

        let single = compile_pattern("eq?.csv").unwrap();
        assert!(single.is_match("eq1.csv"));
        assert!(!single.is_match("eq12.csv"));

        let dotted = compile_pattern("a.b").unwrap();
        assert!(!dotted.is_match("axb"));
    }
}
