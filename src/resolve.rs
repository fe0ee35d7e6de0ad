//! File-name resolution for store and backup files.

use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Suffix appended to names that don't already carry it.
pub const JSON_SUFFIX: &str = ".json";

/// Names that belong to common build and tooling configs. Opening a store
/// under one of these would overwrite project metadata, so they are refused.
pub const RESERVED_FILE_NAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "tsconfig.json",
    "eslint.json",
    ".eslintrc.json",
    "babel.config.json",
    "webpack.config.json",
    "nodemon.json",
    "prettierrc.json",
    "jest.config.json",
    "tslint.json",
    "composer.json",
];

/// Append `.json` when missing and reject empty or reserved names. The
/// reserved-name check is case-sensitive and compares the whole name.
pub fn normalize_file_name(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::new(
            "the file name must not be empty",
            ErrorCode::InvalidFileName,
        ));
    }
    let name = if name.ends_with(JSON_SUFFIX) {
        name.to_owned()
    } else {
        format!("{name}{JSON_SUFFIX}")
    };
    if RESERVED_FILE_NAMES.contains(&name.as_str()) {
        return Err(Error::new(
            format!("invalid file name: {name} is reserved"),
            ErrorCode::InvalidFileName,
        ));
    }
    Ok(name)
}

/// Normalize `name` and join it onto `dir`.
pub fn resolve_in(dir: &Path, name: &str) -> Result<PathBuf> {
    Ok(dir.join(normalize_file_name(name)?))
}
