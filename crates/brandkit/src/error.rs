//! Error types for brand validation and resolution.
//!
//! Resolution failures abort the enclosing load: a brand is either fully
//! valid or rejected. Every error names the offending key path, and cycle
//! errors carry the full reference chain.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A cycle was found among named definitions.
///
/// `chain` lists the definition keys in the order they were followed
/// (`a -> b -> a`), `path` lists the field names traversed while discovering
/// the cycle, and `context` names the definition bank (`palette`, `color`,
/// `logo`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularReferenceError {
    pub chain: Vec<String>,
    pub path: Vec<String>,
    pub context: Option<String>,
}

impl std::fmt::Display for CircularReferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "circular reference detected")?;
        if let Some(context) = &self.context {
            write!(f, " in '{}'", context)?;
        }
        write!(
            f,
            ": {} (via path {})",
            self.chain.join(" -> "),
            self.path.join(" -> ")
        )
    }
}

impl std::error::Error for CircularReferenceError {}

/// Errors raised while loading, validating or querying a brand.
#[derive(Debug, Error)]
pub enum BrandError {
    /// Definitions refer to each other in a loop.
    #[error(transparent)]
    CircularReference(#[from] CircularReferenceError),

    /// A typography color names a semantic color that the brand leaves unset.
    #[error("`typography.{section}.{field}` referred to `color.{name}` which is not defined")]
    UndefinedColorReference {
        section: String,
        field: String,
        name: String,
    },

    /// A file location without an extension.
    #[error("invalid file reference '{value}' at `{key_path}`: must be a path to a single file including an extension")]
    InvalidFileReference { key_path: String, value: String },

    /// A local file given as an absolute path.
    #[error("local path '{value}' at `{key_path}` must be relative to the brand file; use 'file://{value}' to refer to an absolute local file")]
    AbsolutePathNotAllowed { key_path: String, value: String },

    /// A required logo could not be satisfied.
    ///
    /// `name` is the requested logo; `requirement` says what was missing.
    #[error("{requirement}{}", reason_suffix(.reason))]
    LogoResourceMissing {
        name: String,
        requirement: String,
        reason: Option<String>,
    },

    /// A value has the wrong shape or type.
    #[error("invalid value at `{key_path}`: {message}")]
    InvalidDocument { key_path: String, message: String },

    /// A local file does not exist on disk.
    #[error("file '{path}' not found at '{}'", .absolute.display())]
    FileNotFound { path: String, absolute: PathBuf },

    /// Project discovery found no brand file.
    #[error("no _brand.yml found in '{}' or any parent directory", .start.display())]
    BrandFileNotFound { start: PathBuf },

    /// No path was given and `BRAND_YML_PATH` is unset.
    #[error("no brand path given and the BRAND_YML_PATH environment variable is not set")]
    MissingBrandPath,

    /// The YAML text could not be parsed.
    #[error("failed to parse brand YAML{}: {source}", location(.path))]
    Yaml {
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading a file failed.
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BrandError {
    /// Creates an [`InvalidDocument`](BrandError::InvalidDocument) error.
    pub fn invalid(key_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            key_path: key_path.into(),
            message: message.into(),
        }
    }

    /// Creates a [`LogoResourceMissing`](BrandError::LogoResourceMissing) error.
    pub fn logo_missing(
        name: impl Into<String>,
        requirement: impl Into<String>,
        reason: Option<&str>,
    ) -> Self {
        Self::LogoResourceMissing {
            name: name.into(),
            requirement: requirement.into(),
            reason: reason.map(|r| r.trim().to_string()),
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.is_empty() => format!(" {}", r),
        _ => String::new(),
    }
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p: &Path| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Result type for brand operations.
pub type Result<T> = std::result::Result<T, BrandError>;
