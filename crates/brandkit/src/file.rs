//! File references: local paths relative to the brand file, or URLs.
//!
//! Local paths must be relative so that a brand directory can be moved as a
//! unit. Use a `file://` URL to point at an absolute location on purpose.
//!
//! ```rust
//! use std::path::Path;
//! use brandkit::FileReference;
//!
//! let mut logo = FileReference::parse("logo.small", "images/logo.png").unwrap();
//! if let FileReference::Local(local) = &mut logo {
//!     local.set_root_dir("/srv/brand");
//!     assert_eq!(local.absolute(), Path::new("/srv/brand/images/logo.png"));
//!     assert_eq!(local.relative(), Path::new("images/logo.png"));
//! }
//!
//! let remote = FileReference::parse("logo.large", "https://example.com/logo.svg").unwrap();
//! assert!(!remote.is_local());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use url::Url;

use crate::error::{BrandError, Result};

/// URL schemes accepted as remote references.
pub const REMOTE_SCHEMES: &[&str] = &["http", "https", "file"];

/// A reference to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReference {
    Local(LocalFile),
    Remote(RemoteFile),
}

impl FileReference {
    /// Parses a file reference found at `key_path`.
    ///
    /// The value must name a single file with an extension. URLs with an
    /// `http`, `https` or `file` scheme become [`Remote`](FileReference::Remote);
    /// anything else is a relative local path.
    pub fn parse(key_path: &str, value: &str) -> Result<Self> {
        let value = value.trim();

        if let Some(url) = parse_remote(value) {
            let has_extension = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(|last| Path::new(last).extension().is_some())
                .unwrap_or(false);
            if !has_extension {
                return Err(invalid_reference(key_path, value));
            }
            return Ok(FileReference::Remote(RemoteFile {
                raw: value.to_string(),
                url,
            }));
        }

        if Path::new(value).extension().is_none() {
            return Err(invalid_reference(key_path, value));
        }
        if is_absolute(value) {
            return Err(BrandError::AbsolutePathNotAllowed {
                key_path: key_path.to_string(),
                value: value.to_string(),
            });
        }

        Ok(FileReference::Local(LocalFile::new(value)))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, FileReference::Local(_))
    }

    pub fn as_local(&self) -> Option<&LocalFile> {
        match self {
            FileReference::Local(local) => Some(local),
            FileReference::Remote(_) => None,
        }
    }

    pub fn as_local_mut(&mut self) -> Option<&mut LocalFile> {
        match self {
            FileReference::Local(local) => Some(local),
            FileReference::Remote(_) => None,
        }
    }

    /// The file extension, lowercased, without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            FileReference::Local(local) => local.path.file_name()?.to_str()?.to_string(),
            FileReference::Remote(remote) => remote.url.path_segments()?.next_back()?.to_string(),
        };
        Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileReference::Local(local) => local.fmt(f),
            FileReference::Remote(remote) => remote.fmt(f),
        }
    }
}

impl Serialize for FileReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_remote(value: &str) -> Option<Url> {
    let (scheme, _) = value.split_once("://")?;
    if !REMOTE_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return None;
    }
    Url::parse(value).ok()
}

fn is_absolute(value: &str) -> bool {
    value.starts_with('/')
        || value.starts_with('\\')
        || value.starts_with("~/")
        || Path::new(value).is_absolute()
}

fn invalid_reference(key_path: &str, value: &str) -> BrandError {
    BrandError::InvalidFileReference {
        key_path: key_path.to_string(),
        value: value.to_string(),
    }
}

/// A local file, relative to the brand file's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: PathBuf,
    root_dir: Option<PathBuf>,
}

impl LocalFile {
    /// Unchecked; public construction goes through [`FileReference::parse`].
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root_dir: None,
        }
    }

    /// Binds the directory that the relative path is resolved against.
    pub fn set_root_dir(&mut self, root_dir: impl Into<PathBuf>) {
        self.root_dir = Some(root_dir.into());
    }

    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    /// The path relative to the root directory.
    ///
    /// An absolute path under the bound root has the root stripped; any other
    /// path is returned as written.
    pub fn relative(&self) -> &Path {
        match &self.root_dir {
            Some(root) if self.path.is_absolute() => {
                self.path.strip_prefix(root).unwrap_or(&self.path)
            }
            _ => &self.path,
        }
    }

    /// The path joined onto the root directory, or onto the current
    /// directory when no root is bound.
    pub fn absolute(&self) -> PathBuf {
        match &self.root_dir {
            Some(root) => root.join(&self.path),
            None => std::env::current_dir()
                .map(|cwd| cwd.join(&self.path))
                .unwrap_or_else(|_| self.path.clone()),
        }
    }

    pub fn exists(&self) -> bool {
        self.absolute().exists()
    }

    /// Fails with [`BrandError::FileNotFound`] if the file is missing.
    pub fn validate_exists(&self) -> Result<()> {
        let absolute = self.absolute();
        if absolute.exists() {
            return Ok(());
        }
        Err(BrandError::FileNotFound {
            path: self.path.display().to_string(),
            absolute,
        })
    }
}

impl fmt::Display for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A file addressed by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    raw: String,
    url: Url,
}

impl RemoteFile {
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Types that hold local file references.
///
/// Used to rebind every local file of a brand to a new root directory in a
/// single walk, or to list them.
pub trait VisitLocalFiles {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile));

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile));
}

impl VisitLocalFiles for FileReference {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        if let FileReference::Local(local) = self {
            visit(local);
        }
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        if let FileReference::Local(local) = self {
            visit(local);
        }
    }
}

impl<T: VisitLocalFiles> VisitLocalFiles for Option<T> {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        if let Some(inner) = self {
            inner.visit_local_files(visit);
        }
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        if let Some(inner) = self {
            inner.for_each_local_file(visit);
        }
    }
}

impl<T: VisitLocalFiles> VisitLocalFiles for Vec<T> {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        for item in self {
            item.visit_local_files(visit);
        }
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        for item in self {
            item.for_each_local_file(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_relative_local() {
        let reference = FileReference::parse("logo.small", "logos/icon.png").unwrap();
        let local = reference.as_local().unwrap();
        assert_eq!(local.relative(), Path::new("logos/icon.png"));
        assert!(local.root_dir().is_none());
        assert_eq!(reference.to_string(), "logos/icon.png");
    }

    #[test]
    fn test_parse_requires_extension() {
        let err = FileReference::parse("logo.small", "logos/icon").unwrap_err();
        assert!(matches!(
            err,
            BrandError::InvalidFileReference { ref key_path, ref value }
                if key_path == "logo.small" && value == "logos/icon"
        ));

        let err = FileReference::parse("logo.small", "https://example.com/logo").unwrap_err();
        assert!(matches!(err, BrandError::InvalidFileReference { .. }));
    }

    #[test]
    fn test_parse_rejects_absolute_local() {
        for value in ["/tmp/logo.png", "~/logo.png"] {
            let err = FileReference::parse("logo.images.cat", value).unwrap_err();
            assert!(
                matches!(err, BrandError::AbsolutePathNotAllowed { .. }),
                "{value} should be rejected"
            );
            assert!(err.to_string().contains("file://"));
        }
    }

    #[test]
    fn test_parse_remote_schemes() {
        for value in [
            "http://example.com/a.svg",
            "https://example.com/assets/logo.png?v=2",
            "file:///opt/brand/logo.png",
        ] {
            let reference = FileReference::parse("logo.large", value).unwrap();
            assert!(!reference.is_local(), "{value} should be remote");
            assert_eq!(reference.to_string(), value);
        }
    }

    #[test]
    fn test_extension_is_lowercased() {
        let reference = FileReference::parse("f", "fonts/Inter.WOFF2").unwrap();
        assert_eq!(reference.extension().as_deref(), Some("woff2"));

        let reference = FileReference::parse("f", "https://cdn.example.com/x/font.ttf").unwrap();
        assert_eq!(reference.extension().as_deref(), Some("ttf"));
    }

    #[test]
    fn test_absolute_with_root() {
        let mut local = LocalFile::new("img/logo.svg");
        local.set_root_dir("/brand");
        assert_eq!(local.absolute(), PathBuf::from("/brand/img/logo.svg"));
        assert_eq!(local.relative(), Path::new("img/logo.svg"));
    }

    #[test]
    fn test_relative_strips_bound_root() {
        let mut local = LocalFile::new("/proj/icons/a.png");
        assert_eq!(local.relative(), Path::new("/proj/icons/a.png"));

        local.set_root_dir("/proj");
        assert_eq!(local.relative(), Path::new("icons/a.png"));
        assert_eq!(local.absolute(), PathBuf::from("/proj/icons/a.png"));

        local.set_root_dir("/other");
        assert_eq!(local.relative(), Path::new("/proj/icons/a.png"));
    }

    #[test]
    fn test_absolute_without_root_uses_cwd() {
        let local = LocalFile::new("logo.svg");
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(local.absolute(), cwd.join("logo.svg"));
    }

    #[test]
    fn test_exists_and_validate_exists() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"png").unwrap();

        let mut present = LocalFile::new("logo.png");
        present.set_root_dir(dir.path());
        assert!(present.exists());
        assert!(present.validate_exists().is_ok());

        let mut missing = LocalFile::new("missing.png");
        missing.set_root_dir(dir.path());
        assert!(!missing.exists());
        match missing.validate_exists() {
            Err(BrandError::FileNotFound { path, absolute }) => {
                assert_eq!(path, "missing.png");
                assert_eq!(absolute, dir.path().join("missing.png"));
            }
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_serialize_writes_stored_form() {
        let mut reference = FileReference::parse("f", "a/b.png").unwrap();
        reference.as_local_mut().unwrap().set_root_dir("/elsewhere");
        assert_eq!(serde_json::to_string(&reference).unwrap(), "\"a/b.png\"");
    }

    #[test]
    fn test_visit_local_files_skips_remote() {
        let mut files = vec![
            FileReference::parse("a", "a.png").unwrap(),
            FileReference::parse("b", "https://example.com/b.png").unwrap(),
            FileReference::parse("c", "c/c.png").unwrap(),
        ];
        let mut count = 0;
        files.visit_local_files(&mut |local| {
            local.set_root_dir("/root");
            count += 1;
        });
        assert_eq!(count, 2);
        assert_eq!(
            files[2].as_local().unwrap().absolute(),
            PathBuf::from("/root/c/c.png")
        );
    }

    #[test]
    fn test_for_each_local_file_reads_without_mutation() {
        let files = vec![
            Some(FileReference::parse("a", "a.png").unwrap()),
            None,
            Some(FileReference::parse("b", "https://example.com/b.png").unwrap()),
            Some(FileReference::parse("c", "c/c.png").unwrap()),
        ];
        let mut names = Vec::new();
        files.for_each_local_file(&mut |local| names.push(local.to_string()));
        assert_eq!(names, ["a.png", "c/c.png"]);
    }
}
