//! Locating a project's brand file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{BrandError, Result};

/// Environment variable naming the brand file when no path is given.
pub const BRAND_YML_PATH_ENV: &str = "BRAND_YML_PATH";

/// Brand file locations relative to a project directory, in priority order.
///
/// When several exist in the same directory, the one appearing earlier in
/// this list wins.
pub const BRAND_FILE_CANDIDATES: &[&str] = &[
    "_brand.yml",
    "_brand.yaml",
    "brand/_brand.yml",
    "brand/_brand.yaml",
    "_brand/_brand.yml",
    "_brand/_brand.yaml",
];

/// Finds the brand file for the project containing `start`.
///
/// `start` may be a directory or a file inside the project. Each directory
/// from there up to the filesystem root is checked against
/// [`BRAND_FILE_CANDIDATES`]; the nearest directory with a match wins.
pub fn find_project_brand_yml(start: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start.as_ref();
    let dir = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

    for candidate_dir in dir.ancestors() {
        debug!(dir = %candidate_dir.display(), "looking for brand file");
        for candidate in BRAND_FILE_CANDIDATES {
            let path = candidate_dir.join(candidate);
            if path.is_file() {
                info!(path = %path.display(), "found project brand file");
                return Ok(path);
            }
        }
    }

    Err(BrandError::BrandFileNotFound {
        start: start.to_path_buf(),
    })
}
