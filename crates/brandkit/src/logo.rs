//! Brand logos and logo lookup.
//!
//! A brand's `logo` is either a single resource or a set: named `images`
//! plus up to three sizes (`small`, `medium`, `large`), each of which may
//! come in light and dark variants.
//!
//! Size entries may name an image instead of spelling out a path:
//!
//! ```yaml
//! logo:
//!   images:
//!     mark: logos/mark.svg
//!     mark-dark: {path: logos/mark-dark.svg, alt: Brand mark}
//!   small: mark
//!   medium:
//!     light: mark
//!     dark: mark-dark
//! ```
//!
//! Lookups go through [`LogoRequest`]:
//!
//! ```rust
//! use brandkit::{Logo, LogoRequest, LogoSlot, LogoVariant, Node};
//!
//! let node = Node::from_yaml_str(
//!     "images:\n  mark: mark.svg\n  night: night.svg\nmedium:\n  light: mark\n  dark: night\n",
//! )
//! .unwrap();
//! let logo = Logo::from_node(&node).unwrap();
//!
//! let dark = logo
//!     .use_logo(&LogoRequest::new("medium").variant(LogoVariant::Dark))
//!     .unwrap();
//! match dark {
//!     Some(LogoSlot::Single(resource)) => assert_eq!(resource.path.to_string(), "night.svg"),
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! // Sizes are optional unless asked for.
//! assert!(logo.use_logo(&LogoRequest::new("large")).unwrap().is_none());
//! assert!(logo.use_logo(&LogoRequest::new("large").required(true)).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::defs::{DefinitionStore, ReferenceResolver};
use crate::error::{BrandError, Result};
use crate::file::{FileReference, LocalFile, VisitLocalFiles};
use crate::node::{deny_unknown_fields, join_key, Node, Record};

/// A logo file with optional alternative text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoResource {
    pub path: FileReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Rendering attributes attached at lookup time.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, String>,
}

impl LogoResource {
    pub fn new(path: FileReference) -> Self {
        Self {
            path,
            alt: None,
            attrs: IndexMap::new(),
        }
    }

    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Merges attributes into this resource; the given values win.
    pub fn with_attrs(mut self, attrs: &IndexMap<String, String>) -> Self {
        for (key, value) in attrs {
            self.attrs.insert(key.clone(), value.clone());
        }
        self
    }

    fn from_node(node: &Node, key_path: &str) -> Result<Self> {
        if let Some(path) = node.as_str() {
            return Ok(Self::new(FileReference::parse(&join_key(key_path, "path"), path)?));
        }

        let record = node.expect_record(key_path)?;
        deny_unknown_fields(record, key_path, &["path", "alt"])?;

        let path_key = join_key(key_path, "path");
        let path = record
            .get("path")
            .ok_or_else(|| BrandError::invalid(&path_key, "missing required field"))?
            .expect_str(&path_key)?;

        let alt = match record.get("alt").filter(|n| !n.is_null()) {
            Some(alt) => Some(alt.expect_str(&join_key(key_path, "alt"))?.to_string()),
            None => None,
        };

        Ok(Self {
            path: FileReference::parse(&path_key, path)?,
            alt,
            attrs: IndexMap::new(),
        })
    }
}

impl VisitLocalFiles for LogoResource {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        self.path.visit_local_files(visit);
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        self.path.for_each_local_file(visit);
    }
}

/// A pair of color-scheme variants, either of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LightDark<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark: Option<T>,
}

impl<T> LightDark<T> {
    pub fn new(light: Option<T>, dark: Option<T>) -> Self {
        Self { light, dark }
    }

    pub fn get(&self, variant: LogoVariant) -> Option<&T> {
        match variant {
            LogoVariant::Light => self.light.as_ref(),
            LogoVariant::Dark => self.dark.as_ref(),
            LogoVariant::Auto | LogoVariant::LightDark => None,
        }
    }
}

impl<T: VisitLocalFiles> VisitLocalFiles for LightDark<T> {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        self.light.visit_local_files(visit);
        self.dark.visit_local_files(visit);
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        self.light.for_each_local_file(visit);
        self.dark.for_each_local_file(visit);
    }
}

/// The content of a logo size: one resource, or light/dark variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogoSlot {
    Single(LogoResource),
    LightDark(LightDark<LogoResource>),
}

impl LogoSlot {
    /// Merges attributes into every resource in the slot.
    pub fn with_attrs(self, attrs: &IndexMap<String, String>) -> Self {
        if attrs.is_empty() {
            return self;
        }
        match self {
            LogoSlot::Single(resource) => LogoSlot::Single(resource.with_attrs(attrs)),
            LogoSlot::LightDark(pair) => LogoSlot::LightDark(LightDark {
                light: pair.light.map(|r| r.with_attrs(attrs)),
                dark: pair.dark.map(|r| r.with_attrs(attrs)),
            }),
        }
    }

    pub fn as_single(&self) -> Option<&LogoResource> {
        match self {
            LogoSlot::Single(resource) => Some(resource),
            LogoSlot::LightDark(_) => None,
        }
    }

    pub fn as_light_dark(&self) -> Option<&LightDark<LogoResource>> {
        match self {
            LogoSlot::LightDark(pair) => Some(pair),
            LogoSlot::Single(_) => None,
        }
    }

    fn from_node(node: &Node, key_path: &str) -> Result<Self> {
        let Some(record) = node.as_record() else {
            return LogoResource::from_node(node, key_path).map(LogoSlot::Single);
        };
        if record.contains_key("path") {
            return LogoResource::from_node(node, key_path).map(LogoSlot::Single);
        }
        if !record.contains_key("light") && !record.contains_key("dark") {
            return Err(BrandError::invalid(
                key_path,
                "expected a logo resource with `path`, or `light`/`dark` variants",
            ));
        }
        deny_unknown_fields(record, key_path, &["light", "dark"])?;

        let side = |name: &str| -> Result<Option<LogoResource>> {
            match record.get(name).filter(|n| !n.is_null()) {
                Some(node) => LogoResource::from_node(node, &join_key(key_path, name)).map(Some),
                None => Ok(None),
            }
        };
        Ok(LogoSlot::LightDark(LightDark::new(side("light")?, side("dark")?)))
    }
}

impl VisitLocalFiles for LogoSlot {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        match self {
            LogoSlot::Single(resource) => resource.visit_local_files(visit),
            LogoSlot::LightDark(pair) => pair.visit_local_files(visit),
        }
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        match self {
            LogoSlot::Single(resource) => resource.for_each_local_file(visit),
            LogoSlot::LightDark(pair) => pair.for_each_local_file(visit),
        }
    }
}

/// A preset logo size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogoSize {
    Small,
    Medium,
    Large,
}

impl LogoSize {
    /// All sizes, smallest first.
    pub const ALL: [LogoSize; 3] = [LogoSize::Small, LogoSize::Medium, LogoSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogoSize::Small => "small",
            LogoSize::Medium => "medium",
            LogoSize::Large => "large",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.as_str() == name)
    }
}

impl fmt::Display for LogoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pseudo-sizes that pick the first or last populated size.
pub const SMALLEST: &str = "smallest";
pub const LARGEST: &str = "largest";

fn is_size_name(name: &str) -> bool {
    LogoSize::from_name(name).is_some() || name == SMALLEST || name == LARGEST
}

/// Which color-scheme variant of a logo to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LogoVariant {
    /// The pair when both exist, otherwise whichever exists.
    #[default]
    Auto,
    Light,
    Dark,
    /// Both variants together.
    LightDark,
}

impl LogoVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogoVariant::Auto => "auto",
            LogoVariant::Light => "light",
            LogoVariant::Dark => "dark",
            LogoVariant::LightDark => "light-dark",
        }
    }
}

impl fmt::Display for LogoVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogoVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(LogoVariant::Auto),
            "light" => Ok(LogoVariant::Light),
            "dark" => Ok(LogoVariant::Dark),
            "light-dark" | "light+dark" | "light_dark" => Ok(LogoVariant::LightDark),
            other => Err(format!(
                "invalid logo variant '{}', expected one of auto, light, dark, light-dark",
                other
            )),
        }
    }
}

/// Whether a missing logo is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Required {
    /// Required for named images, optional for sizes.
    #[default]
    Default,
    Always,
    Never,
    /// Required; the reason is appended to the error message.
    Reason(String),
}

impl Required {
    /// The error message suffix when a missing logo is an error, or `None`
    /// when it is not.
    fn reason_for(&self, name: &str) -> Option<String> {
        match self {
            Required::Always => Some(String::new()),
            Required::Never => None,
            Required::Reason(reason) => Some(reason.trim().to_string()),
            Required::Default if is_size_name(name) => None,
            Required::Default => Some(String::new()),
        }
    }
}

impl From<bool> for Required {
    fn from(required: bool) -> Self {
        if required {
            Required::Always
        } else {
            Required::Never
        }
    }
}

impl From<&str> for Required {
    fn from(reason: &str) -> Self {
        Required::Reason(reason.to_string())
    }
}

impl From<String> for Required {
    fn from(reason: String) -> Self {
        Required::Reason(reason)
    }
}

/// A logo lookup: a size (`small`, `medium`, `large`, `smallest`,
/// `largest`) or an image name, plus variant and requiredness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoRequest {
    pub name: String,
    pub variant: LogoVariant,
    pub required: Required,
    pub allow_fallback: bool,
    pub attrs: IndexMap<String, String>,
}

impl LogoRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variant: LogoVariant::Auto,
            required: Required::Default,
            allow_fallback: true,
            attrs: IndexMap::new(),
        }
    }

    pub fn variant(mut self, variant: LogoVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn required(mut self, required: impl Into<Required>) -> Self {
        self.required = required.into();
        self
    }

    /// Whether a single logo may stand in for a requested variant.
    pub fn allow_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = allow;
        self
    }

    /// Adds a rendering attribute to the returned resource(s).
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Picks the requested variant out of a logo slot.
///
/// | slot | variant | fallback | result |
/// |---|---|---|---|
/// | single | auto | any | the resource |
/// | pair | auto | any | the pair, or the one side present |
/// | pair | light-dark | any | the pair |
/// | single | light-dark | yes | a pair with the resource on both sides |
/// | pair | light / dark | any | that side, if present |
/// | single | light / dark | yes | the resource |
///
/// Every other combination is `None`.
pub fn select_variant(
    slot: &LogoSlot,
    variant: LogoVariant,
    allow_fallback: bool,
) -> Option<LogoSlot> {
    match (slot, variant) {
        (LogoSlot::Single(_), LogoVariant::Auto) => Some(slot.clone()),
        (LogoSlot::LightDark(pair), LogoVariant::Auto) => match (&pair.light, &pair.dark) {
            (Some(_), Some(_)) => Some(slot.clone()),
            (Some(light), None) => Some(LogoSlot::Single(light.clone())),
            (None, Some(dark)) => Some(LogoSlot::Single(dark.clone())),
            (None, None) => None,
        },
        (LogoSlot::LightDark(_), LogoVariant::LightDark) => Some(slot.clone()),
        (LogoSlot::Single(resource), LogoVariant::LightDark) => allow_fallback.then(|| {
            LogoSlot::LightDark(LightDark::new(Some(resource.clone()), Some(resource.clone())))
        }),
        (LogoSlot::LightDark(pair), side) => pair.get(side).cloned().map(LogoSlot::Single),
        (LogoSlot::Single(_), _) => allow_fallback.then(|| slot.clone()),
    }
}

/// A logo set: named images and preset sizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandLogo {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub images: IndexMap<String, LogoResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<LogoSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<LogoSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<LogoSlot>,
}

impl BrandLogo {
    pub fn size(&self, size: LogoSize) -> Option<&LogoSlot> {
        match size {
            LogoSize::Small => self.small.as_ref(),
            LogoSize::Medium => self.medium.as_ref(),
            LogoSize::Large => self.large.as_ref(),
        }
    }

    /// Populated sizes, smallest first.
    pub fn available_sizes(&self) -> Vec<LogoSize> {
        LogoSize::ALL
            .into_iter()
            .filter(|size| self.size(*size).is_some())
            .collect()
    }

    fn from_record(record: &Record) -> Result<Self> {
        deny_unknown_fields(record, "logo", &["images", "small", "medium", "large"])?;

        let mut images = Record::new();
        if let Some(node) = record.get("images").filter(|n| !n.is_null()) {
            for (name, value) in node.expect_record("logo.images")? {
                let promoted = match value {
                    Node::Record(_) => value.clone(),
                    Node::Scalar(_) if value.as_str().is_some() => promote_path(value),
                    _ => {
                        return Err(BrandError::invalid(
                            join_key("logo.images", name),
                            format!("expected a file location, found {}", value.kind()),
                        ))
                    }
                };
                images.insert(name.clone(), promoted);
            }
        }

        let mut sizes = Record::new();
        for size in LogoSize::ALL {
            if let Some(node) = record.get(size.as_str()).filter(|n| !n.is_null()) {
                sizes.insert(size.as_str().to_string(), node.clone());
            }
        }

        let store = DefinitionStore::from(images);
        let sizes = ReferenceResolver::new(&store)
            .context("logo")
            .skip_field("path")
            .skip_field("alt")
            .resolve_record(&sizes)?;

        let mut logo = BrandLogo::default();
        for (name, node) in store.as_record() {
            let key_path = format!("logo.images.{}", name);
            logo.images
                .insert(name.clone(), LogoResource::from_node(node, &key_path)?);
        }
        for (name, node) in &sizes {
            let key_path = join_key("logo", name);
            let slot = Some(LogoSlot::from_node(node, &key_path)?);
            match LogoSize::from_name(name) {
                Some(LogoSize::Small) => logo.small = slot,
                Some(LogoSize::Medium) => logo.medium = slot,
                Some(LogoSize::Large) => logo.large = slot,
                None => {}
            }
        }

        debug!(
            images = logo.images.len(),
            sizes = logo.available_sizes().len(),
            "parsed logo set"
        );
        Ok(logo)
    }
}

fn promote_path(value: &Node) -> Node {
    let mut record = Record::new();
    record.insert("path".to_string(), value.clone());
    Node::Record(record)
}

impl VisitLocalFiles for BrandLogo {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        for resource in self.images.values_mut() {
            resource.visit_local_files(visit);
        }
        self.small.visit_local_files(visit);
        self.medium.visit_local_files(visit);
        self.large.visit_local_files(visit);
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        for resource in self.images.values() {
            resource.for_each_local_file(visit);
        }
        self.small.for_each_local_file(visit);
        self.medium.for_each_local_file(visit);
        self.large.for_each_local_file(visit);
    }
}

/// The `logo` section of a brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Logo {
    /// One resource used for every size.
    Single(LogoResource),
    Set(BrandLogo),
}

impl Logo {
    /// Parses a `logo` section.
    ///
    /// A bare path or a record with `path` is a single logo; anything else
    /// is a logo set.
    pub fn from_node(node: &Node) -> Result<Self> {
        match node {
            Node::Record(record) if !record.contains_key("path") => {
                BrandLogo::from_record(record).map(Logo::Set)
            }
            _ => LogoResource::from_node(node, "logo").map(Logo::Single),
        }
    }

    pub fn use_logo(&self, request: &LogoRequest) -> Result<Option<LogoSlot>> {
        use_logo(Some(self), request)
    }
}

impl VisitLocalFiles for Logo {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        match self {
            Logo::Single(resource) => resource.visit_local_files(visit),
            Logo::Set(set) => set.visit_local_files(visit),
        }
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        match self {
            Logo::Single(resource) => resource.for_each_local_file(visit),
            Logo::Set(set) => set.for_each_local_file(visit),
        }
    }
}

/// Looks up a logo by size or image name.
///
/// Named images win over sizes and are returned as stored. `smallest` and
/// `largest` pick the first or last populated size, unless an image has that
/// name. Whether a miss is `Ok(None)` or an error follows
/// [`LogoRequest::required`].
pub fn use_logo(logo: Option<&Logo>, request: &LogoRequest) -> Result<Option<LogoSlot>> {
    let requested = request.name.as_str();
    let reason = request.required.reason_for(requested);
    let missing = |requirement: String| -> Result<Option<LogoSlot>> {
        match &reason {
            Some(reason) => Err(BrandError::logo_missing(
                requested,
                requirement,
                Some(reason.as_str()),
            )),
            None => Ok(None),
        }
    };
    let found = |slot: LogoSlot| Ok(Some(slot.with_attrs(&request.attrs)));
    let select = |slot: &LogoSlot, name: &str| -> Result<Option<LogoSlot>> {
        match select_variant(slot, request.variant, request.allow_fallback) {
            Some(selected) => found(selected),
            None => missing(match request.variant {
                LogoVariant::Auto => format!("brand.logo.{} is required", name),
                LogoVariant::LightDark => {
                    format!("brand.logo.{} requires light/dark variants", name)
                }
                side => format!("brand.logo.{}.{} is required", name, side),
            }),
        }
    };

    let set = match logo {
        None => return missing(format!("brand.logo.{} is required", requested)),
        Some(Logo::Single(resource)) => {
            if is_size_name(requested) {
                return select(&LogoSlot::Single(resource.clone()), requested);
            }
            return missing(format!("brand.logo.images['{}'] is required", requested));
        }
        Some(Logo::Set(set)) => set,
    };

    let mut name = requested;
    if name == SMALLEST || name == LARGEST {
        if let Some(image) = set.images.get(name) {
            return found(LogoSlot::Single(image.clone()));
        }
        let available = set.available_sizes();
        let pick = if name == SMALLEST {
            available.first()
        } else {
            available.last()
        };
        match pick {
            Some(size) => name = size.as_str(),
            None => {
                return missing(format!(
                    "no logos are available to satisfy '{}' in brand.logo or brand.logo.images",
                    requested
                ))
            }
        }
    }

    if let Some(image) = set.images.get(name) {
        return found(LogoSlot::Single(image.clone()));
    }

    let Some(size) = LogoSize::from_name(name) else {
        return missing(format!("brand.logo.images['{}'] is required", name));
    };
    let Some(slot) = set.size(size) else {
        return missing(format!("brand.logo.{} is required", name));
    };

    select(slot, name)
}
