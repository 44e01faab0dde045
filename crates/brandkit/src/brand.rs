//! The brand document.
//!
//! Loading runs the whole resolution pipeline: colors are resolved first,
//! typography colors are bound to them, logo sizes are resolved against the
//! logo images, and every local file is bound to the brand file's directory.
//! A document that fails any step is rejected as a whole.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::info;
use url::Url;

use crate::color::{BrandColor, ResolvedColorSet};
use crate::discover::{find_project_brand_yml, BRAND_YML_PATH_ENV};
use crate::error::{BrandError, Result};
use crate::file::{LocalFile, VisitLocalFiles};
use crate::logo::{self, Logo, LogoRequest, LogoSlot};
use crate::node::{deny_unknown_fields, join_key, Node, Record};
use crate::typography::BrandTypography;

/// Top-level fields of a brand document.
pub const BRAND_FIELDS: [&str; 5] = ["meta", "logo", "color", "typography", "defaults"];

// =============================================================================
// Meta
// =============================================================================

/// The brand's name, either one string or full and short forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BrandName {
    Simple(String),
    Full {
        #[serde(skip_serializing_if = "Option::is_none")]
        full: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        short: Option<String>,
    },
}

impl BrandName {
    pub fn full(&self) -> Option<&str> {
        match self {
            BrandName::Simple(name) => Some(name),
            BrandName::Full { full, short } => full.as_deref().or(short.as_deref()),
        }
    }

    pub fn short(&self) -> Option<&str> {
        match self {
            BrandName::Simple(name) => Some(name),
            BrandName::Full { full, short } => short.as_deref().or(full.as_deref()),
        }
    }
}

/// The brand's web presence: one URL, or URLs by name (`home`, `github`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandLink {
    Single(Url),
    Named(IndexMap<String, Url>),
}

impl BrandLink {
    /// The home page: the single URL, or the `home` entry.
    pub fn home(&self) -> Option<&Url> {
        match self {
            BrandLink::Single(url) => Some(url),
            BrandLink::Named(links) => links.get("home"),
        }
    }
}

impl Serialize for BrandLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BrandLink::Single(url) => serializer.serialize_str(url.as_str()),
            BrandLink::Named(links) => {
                let mut map = serializer.serialize_map(Some(links.len()))?;
                for (name, url) in links {
                    map.serialize_entry(name, url.as_str())?;
                }
                map.end()
            }
        }
    }
}

/// Brand metadata. Fields other than `name` and `link` are kept as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<BrandName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<BrandLink>,
    #[serde(flatten)]
    pub extra: Record,
}

impl BrandMeta {
    pub fn from_node(node: &Node) -> Result<Self> {
        let record = node.expect_record("meta")?;
        let mut meta = BrandMeta::default();

        for (key, value) in record {
            let key_path = join_key("meta", key);
            match key.as_str() {
                "name" if !value.is_null() => meta.name = Some(parse_name(value, &key_path)?),
                "link" if !value.is_null() => meta.link = Some(parse_link(value, &key_path)?),
                "name" | "link" => {}
                _ => {
                    meta.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(meta)
    }
}

fn parse_name(node: &Node, key_path: &str) -> Result<BrandName> {
    if let Some(name) = node.as_str() {
        return Ok(BrandName::Simple(name.to_string()));
    }
    let record = node.expect_record(key_path)?;
    deny_unknown_fields(record, key_path, &["full", "short"])?;

    let field = |name: &str| -> Result<Option<String>> {
        match record.get(name).filter(|n| !n.is_null()) {
            Some(value) => Ok(Some(value.expect_str(&join_key(key_path, name))?.to_string())),
            None => Ok(None),
        }
    };
    Ok(BrandName::Full {
        full: field("full")?,
        short: field("short")?,
    })
}

fn parse_link(node: &Node, key_path: &str) -> Result<BrandLink> {
    if let Some(url) = node.as_str() {
        return parse_url(url, key_path).map(BrandLink::Single);
    }
    let mut links = IndexMap::new();
    for (name, value) in node.expect_record(key_path)? {
        let link_path = join_key(key_path, name);
        let url = parse_url(value.expect_str(&link_path)?, &link_path)?;
        links.insert(name.clone(), url);
    }
    Ok(BrandLink::Named(links))
}

fn parse_url(value: &str, key_path: &str) -> Result<Url> {
    Url::parse(value.trim())
        .map_err(|e| BrandError::invalid(key_path, format!("invalid URL '{}': {}", value, e)))
}

// =============================================================================
// Brand
// =============================================================================

/// A validated, fully resolved brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Brand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<BrandMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<BrandColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<BrandTypography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Record>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Brand {
    /// Validates and resolves a parsed brand document.
    ///
    /// Local files are left unbound; see [`set_root_dir`](Self::set_root_dir).
    pub fn from_node(node: &Node) -> Result<Self> {
        let record = node.expect_record("brand")?;
        deny_unknown_fields(record, "", &BRAND_FIELDS)?;

        let section = |name: &str| record.get(name).filter(|n| !n.is_null());

        let meta = section("meta").map(BrandMeta::from_node).transpose()?;
        let color = section("color").map(BrandColor::from_node).transpose()?;
        let typography = match section("typography") {
            Some(node) => {
                let empty = ResolvedColorSet::new();
                let colors = color.as_ref().map(BrandColor::colors).unwrap_or(&empty);
                Some(BrandTypography::from_node(node)?.bind_colors(colors)?)
            }
            None => None,
        };
        let logo = section("logo").map(Logo::from_node).transpose()?;
        let defaults = section("defaults")
            .map(|node| node.expect_record("defaults").cloned())
            .transpose()?;

        Ok(Self {
            meta,
            logo,
            color,
            typography,
            defaults,
            path: None,
        })
    }

    /// Parses brand YAML.
    ///
    /// With a `path`, the brand remembers it and binds local files to its
    /// parent directory.
    pub fn from_yaml_str(text: &str, path: Option<&Path>) -> Result<Self> {
        let node = Node::from_yaml_str(text).map_err(|source| BrandError::Yaml {
            path: path.map(Path::to_path_buf),
            source,
        })?;
        let mut brand = Self::from_node(&node)?;

        if let Some(path) = path {
            brand.path = Some(path.to_path_buf());
            if let Some(dir) = path.parent() {
                brand.set_root_dir(dir);
            }
        }
        Ok(brand)
    }

    /// Loads a brand file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let io_error = |source| BrandError::Io {
            path: path.to_path_buf(),
            source,
        };
        let path = path.canonicalize().map_err(io_error)?;
        let text = std::fs::read_to_string(&path).map_err(io_error)?;

        let brand = Self::from_yaml_str(&text, Some(&path))?;
        info!(path = %path.display(), "loaded brand");
        Ok(brand)
    }

    /// Loads a brand file, or discovers one when `path` is a directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_project(path)
        } else {
            Self::from_file(path)
        }
    }

    /// Loads the brand named by the `BRAND_YML_PATH` environment variable.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(BRAND_YML_PATH_ENV).ok_or(BrandError::MissingBrandPath)?;
        info!(env = BRAND_YML_PATH_ENV, "using brand path from environment");
        Self::from_path(PathBuf::from(path))
    }

    /// Loads the brand file of the project containing `start`.
    pub fn from_project(start: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(find_project_brand_yml(start)?)
    }

    /// Re-reads the brand from the file it was loaded from.
    pub fn refresh(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(BrandError::MissingBrandPath)?;
        *self = Self::from_file(path)?;
        Ok(())
    }

    /// The brand file this brand was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Binds every local file of the brand to `dir`.
    pub fn set_root_dir(&mut self, dir: impl AsRef<Path>) {
        let dir = dir.as_ref();
        self.visit_local_files(&mut |file| file.set_root_dir(dir));
    }

    /// All local files referenced by the brand.
    pub fn local_files(&self) -> Vec<LocalFile> {
        let mut files = Vec::new();
        self.for_each_local_file(&mut |file| files.push(file.clone()));
        files
    }

    /// The resolved semantic colors, if the brand has a color section.
    pub fn colors(&self) -> Option<&ResolvedColorSet> {
        self.color.as_ref().map(BrandColor::colors)
    }

    /// Looks up a logo; see [`use_logo`](crate::use_logo).
    pub fn use_logo(&self, request: &LogoRequest) -> Result<Option<LogoSlot>> {
        logo::use_logo(self.logo.as_ref(), request)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|source| BrandError::Yaml { path: None, source })
    }
}

impl VisitLocalFiles for Brand {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        self.logo.visit_local_files(visit);
        self.typography.visit_local_files(visit);
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        self.logo.for_each_local_file(visit);
        self.typography.for_each_local_file(visit);
    }
}
