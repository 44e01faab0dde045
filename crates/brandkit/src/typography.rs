//! Brand typography: font sources and per-context text settings.
//!
//! Each section (`base`, `headings`, `monospace`, `monospace-inline`,
//! `monospace-block`, `link`) is a struct composed from shared option groups
//! ([`FontOptions`], [`ColorOptions`]) plus the fields specific to it.
//!
//! Color fields start out as whatever the document says. After the brand's
//! colors are resolved, [`BrandTypography::bind_colors`] replaces semantic
//! slot names (`primary`, `link`, ...) with concrete values.
//!
//! ```rust
//! use brandkit::{BrandTypography, ColorSlot, Node, ResolvedColorSet};
//!
//! let node = Node::from_yaml_str(
//!     "base: Open Sans\nheadings:\n  weight: semi-bold\n  color: primary\n",
//! )
//! .unwrap();
//! let typography = BrandTypography::from_node(&node).unwrap();
//! assert_eq!(typography.base.as_ref().unwrap().font.family.as_deref(), Some("Open Sans"));
//!
//! let colors = ResolvedColorSet::new().with(ColorSlot::Primary, "#447099");
//! let bound = typography.bind_colors(&colors).unwrap();
//! let headings = bound.headings.unwrap();
//! assert_eq!(headings.font.weight.unwrap().value(), 600);
//! assert_eq!(headings.colors.color.as_deref(), Some("#447099"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::color::{ColorSlot, ResolvedColorSet};
use crate::error::{BrandError, Result};
use crate::file::{FileReference, LocalFile, VisitLocalFiles};
use crate::node::{deny_unknown_fields, join_key, Node, Record};

// =============================================================================
// Font weight and style
// =============================================================================

/// CSS font weight names and their numeric values.
pub const FONT_WEIGHT_NAMES: &[(&str, u16)] = &[
    ("thin", 100),
    ("extra-light", 200),
    ("ultra-light", 200),
    ("light", 300),
    ("normal", 400),
    ("regular", 400),
    ("medium", 500),
    ("semi-bold", 600),
    ("demi-bold", 600),
    ("bold", 700),
    ("extra-bold", 800),
    ("ultra-bold", 800),
    ("black", 900),
];

/// A numeric font weight: a multiple of 100 between 100 and 900.
///
/// Weight names are accepted on input and normalized to their number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Returns `None` unless `value` is a multiple of 100 in `100..=900`.
    pub fn new(value: u16) -> Option<Self> {
        ((100..=900).contains(&value) && value % 100 == 0).then_some(FontWeight(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    fn from_number(value: f64) -> Option<Self> {
        if value.fract() != 0.0 || !(100.0..=900.0).contains(&value) {
            return None;
        }
        Self::new(value as u16)
    }
}

fn invalid_weight(value: impl fmt::Display) -> String {
    let names: Vec<&str> = FONT_WEIGHT_NAMES.iter().map(|(name, _)| *name).collect();
    format!(
        "invalid font weight '{}': expected a multiple of 100 between 100 and 900, or one of {}",
        value,
        names.join(", ")
    )
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, value)) = FONT_WEIGHT_NAMES.iter().find(|(name, _)| *name == s) {
            return Ok(FontWeight(*value));
        }
        s.parse::<f64>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| invalid_weight(s))
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FontWeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.0)
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct WeightVisitor;

        impl<'de> Visitor<'de> for WeightVisitor {
            type Value = FontWeight;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a font weight number or name")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FontWeight, E> {
                FontWeight::from_number(v as f64).ok_or_else(|| E::custom(invalid_weight(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<FontWeight, E> {
                FontWeight::from_number(v as f64).ok_or_else(|| E::custom(invalid_weight(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<FontWeight, E> {
                FontWeight::from_number(v).ok_or_else(|| E::custom(invalid_weight(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FontWeight, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(WeightVisitor)
    }
}

/// A weight offered by a font service: one weight, or the `start..end`
/// range of a variable font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeightSpec {
    Fixed(FontWeight),
    Range(FontWeight, FontWeight),
}

impl From<FontWeight> for FontWeightSpec {
    fn from(weight: FontWeight) -> Self {
        FontWeightSpec::Fixed(weight)
    }
}

impl FromStr for FontWeightSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let Some((start, end)) = s.split_once("..") else {
            return s.parse().map(FontWeightSpec::Fixed);
        };
        if end.contains("..") {
            return Err(format!(
                "invalid font weight range '{}': expected `start..end`",
                s
            ));
        }
        let start: FontWeight = start.parse()?;
        let end: FontWeight = end.parse()?;
        if start > end {
            return Err(format!(
                "invalid font weight range '{}': start is greater than end",
                s
            ));
        }
        Ok(FontWeightSpec::Range(start, end))
    }
}

impl fmt::Display for FontWeightSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeightSpec::Fixed(weight) => fmt::Display::fmt(weight, f),
            FontWeightSpec::Range(start, end) => write!(f, "{}..{}", start, end),
        }
    }
}

impl Serialize for FontWeightSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FontWeightSpec::Fixed(weight) => weight.serialize(serializer),
            FontWeightSpec::Range(..) => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for FontWeightSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = FontWeightSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a font weight, or a range such as 400..700")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FontWeightSpec, E> {
                FontWeight::from_number(v as f64)
                    .map(FontWeightSpec::Fixed)
                    .ok_or_else(|| E::custom(invalid_weight(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<FontWeightSpec, E> {
                FontWeight::from_number(v as f64)
                    .map(FontWeightSpec::Fixed)
                    .ok_or_else(|| E::custom(invalid_weight(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<FontWeightSpec, E> {
                FontWeight::from_number(v)
                    .map(FontWeightSpec::Fixed)
                    .ok_or_else(|| E::custom(invalid_weight(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FontWeightSpec, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(SpecVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// A CSS length or unitless number (`1rem`, `16px`, `1.25`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Number(n) => write!(f, "{}", n),
            CssValue::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Option groups and sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<FontStyle>,
}

/// Foreground and background colors of a typography section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        rename = "background-color",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseTypography {
    #[serde(flatten)]
    pub font: FontOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<CssValue>,
    #[serde(rename = "line-height", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<CssValue>,
    #[serde(flatten)]
    pub colors: ColorOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingsTypography {
    #[serde(flatten)]
    pub font: FontOptions,
    #[serde(rename = "line-height", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<CssValue>,
    #[serde(flatten)]
    pub colors: ColorOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonospaceTypography {
    #[serde(flatten)]
    pub font: FontOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<CssValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonospaceInlineTypography {
    #[serde(flatten)]
    pub font: FontOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<CssValue>,
    #[serde(flatten)]
    pub colors: ColorOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonospaceBlockTypography {
    #[serde(flatten)]
    pub font: FontOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<CssValue>,
    #[serde(rename = "line-height", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<CssValue>,
    #[serde(flatten)]
    pub colors: ColorOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTypography {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
    #[serde(flatten)]
    pub colors: ColorOptions,
}

const FONT_FIELDS: [&str; 3] = ["family", "weight", "style"];
const COLOR_FIELDS: [&str; 2] = ["color", "background-color"];

/// Section name, accepted fields beyond the font and color groups, and
/// whether the section has those groups.
struct SectionShape {
    name: &'static str,
    font: bool,
    colors: bool,
    extra: &'static [&'static str],
}

impl SectionShape {
    fn allowed(&self) -> Vec<&'static str> {
        let mut allowed = Vec::new();
        if self.font {
            allowed.extend(FONT_FIELDS);
        }
        allowed.extend(self.extra.iter().copied());
        if self.colors {
            allowed.extend(COLOR_FIELDS);
        }
        allowed
    }
}

const BASE: SectionShape = SectionShape {
    name: "base",
    font: true,
    colors: true,
    extra: &["size", "line-height"],
};
const HEADINGS: SectionShape = SectionShape {
    name: "headings",
    font: true,
    colors: true,
    extra: &["line-height"],
};
const MONOSPACE: SectionShape = SectionShape {
    name: "monospace",
    font: true,
    colors: false,
    extra: &["size"],
};
const MONOSPACE_INLINE: SectionShape = SectionShape {
    name: "monospace-inline",
    font: true,
    colors: true,
    extra: &["size"],
};
const MONOSPACE_BLOCK: SectionShape = SectionShape {
    name: "monospace-block",
    font: true,
    colors: true,
    extra: &["size", "line-height"],
};
const LINK: SectionShape = SectionShape {
    name: "link",
    font: false,
    colors: true,
    extra: &["weight", "decoration"],
};

/// Section names in document order.
pub const TYPOGRAPHY_SECTIONS: [&str; 6] = [
    "base",
    "headings",
    "monospace",
    "monospace-inline",
    "monospace-block",
    "link",
];

// =============================================================================
// Font sources
// =============================================================================

/// Where a font family is loaded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum FontSource {
    File(FontFiles),
    Google(FontService),
    Bunny(FontService),
}

impl FontSource {
    pub fn family(&self) -> &str {
        match self {
            FontSource::File(files) => &files.family,
            FontSource::Google(service) | FontSource::Bunny(service) => &service.family,
        }
    }
}

/// A font family served from files that ship with the brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontFiles {
    pub family: String,
    pub files: Vec<FontFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontFile {
    pub path: FileReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<FontStyle>,
    #[serde(skip)]
    format: FontFormat,
}

impl FontFile {
    pub fn format(&self) -> FontFormat {
        self.format
    }
}

/// Font file formats, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    Collection,
    EmbeddedOpentype,
    Opentype,
    Truetype,
    Svg,
    Woff,
    Woff2,
}

impl FontFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "otc" | "ttc" => Some(FontFormat::Collection),
            "eot" => Some(FontFormat::EmbeddedOpentype),
            "otf" => Some(FontFormat::Opentype),
            "ttf" => Some(FontFormat::Truetype),
            "svg" | "svgz" => Some(FontFormat::Svg),
            "woff" => Some(FontFormat::Woff),
            "woff2" => Some(FontFormat::Woff2),
            _ => None,
        }
    }

    /// The CSS `format()` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::Collection => "collection",
            FontFormat::EmbeddedOpentype => "embedded-opentype",
            FontFormat::Opentype => "opentype",
            FontFormat::Truetype => "truetype",
            FontFormat::Svg => "svg",
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
        }
    }

    /// Whether brand font files may use this format.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            FontFormat::Opentype | FontFormat::Truetype | FontFormat::Woff | FontFormat::Woff2
        )
    }
}

/// A font family served by a web font service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontService {
    pub family: String,
    #[serde(default = "default_service_weights", deserialize_with = "one_or_many")]
    pub weight: Vec<FontWeightSpec>,
    #[serde(default = "default_service_styles", deserialize_with = "one_or_many")]
    pub style: Vec<FontStyle>,
    #[serde(default)]
    pub display: FontDisplay,
}

fn default_service_weights() -> Vec<FontWeightSpec> {
    vec![FontWeight::NORMAL.into(), FontWeight::BOLD.into()]
}

fn default_service_styles() -> Vec<FontStyle> {
    vec![FontStyle::Normal, FontStyle::Italic]
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// The CSS `font-display` strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontDisplay {
    #[default]
    Auto,
    Block,
    Swap,
    Fallback,
    Optional,
}

// =============================================================================
// BrandTypography
// =============================================================================

/// The `typography` section of a brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandTypography {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<BaseTypography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headings: Option<HeadingsTypography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monospace: Option<MonospaceTypography>,
    #[serde(rename = "monospace-inline", skip_serializing_if = "Option::is_none")]
    pub monospace_inline: Option<MonospaceInlineTypography>,
    #[serde(rename = "monospace-block", skip_serializing_if = "Option::is_none")]
    pub monospace_block: Option<MonospaceBlockTypography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkTypography>,
}

impl BrandTypography {
    /// Parses a `typography` section.
    ///
    /// Color fields are kept as written; call [`bind_colors`](Self::bind_colors)
    /// once the brand colors are known.
    pub fn from_node(node: &Node) -> Result<Self> {
        let record = node.expect_record("typography")?;

        let mut allowed = vec!["fonts"];
        allowed.extend(TYPOGRAPHY_SECTIONS);
        deny_unknown_fields(record, "typography", &allowed)?;

        let fonts = match record.get("fonts").filter(|n| !n.is_null()) {
            Some(fonts) => parse_fonts(fonts)?,
            None => Vec::new(),
        };

        let mut typography = BrandTypography {
            fonts,
            base: parse_section(record, &BASE)?,
            headings: parse_section(record, &HEADINGS)?,
            monospace: parse_section(record, &MONOSPACE)?,
            monospace_inline: parse_section(record, &MONOSPACE_INLINE)?,
            monospace_block: parse_section(record, &MONOSPACE_BLOCK)?,
            link: parse_section(record, &LINK)?,
        };
        typography.forward_monospace();
        Ok(typography)
    }

    /// Copies `family`, `style`, `weight` and `size` from `monospace` into
    /// `monospace-inline` and `monospace-block` where those are unset.
    fn forward_monospace(&mut self) {
        let Some(mono) = &self.monospace else {
            return;
        };
        if let Some(inline) = self.monospace_inline.as_mut() {
            inherit(&mut inline.font, &mut inline.size, mono);
        }
        if let Some(block) = self.monospace_block.as_mut() {
            inherit(&mut block.font, &mut block.size, mono);
        }
    }

    /// Replaces semantic color names in `color` and `background-color` fields
    /// with their resolved values.
    ///
    /// Names that are not color slots (palette names, literal colors) are left
    /// as they are. A slot name the brand leaves undefined is an error.
    pub fn bind_colors(mut self, colors: &ResolvedColorSet) -> Result<Self> {
        for (section, options) in self.color_options_mut() {
            bind_color(section, "color", &mut options.color, colors)?;
            bind_color(
                section,
                "background-color",
                &mut options.background_color,
                colors,
            )?;
        }
        debug!("bound typography colors");
        Ok(self)
    }

    fn color_options_mut(&mut self) -> Vec<(&'static str, &mut ColorOptions)> {
        let mut options = Vec::new();
        if let Some(section) = self.base.as_mut() {
            options.push(("base", &mut section.colors));
        }
        if let Some(section) = self.headings.as_mut() {
            options.push(("headings", &mut section.colors));
        }
        if let Some(section) = self.monospace_inline.as_mut() {
            options.push(("monospace-inline", &mut section.colors));
        }
        if let Some(section) = self.monospace_block.as_mut() {
            options.push(("monospace-block", &mut section.colors));
        }
        if let Some(section) = self.link.as_mut() {
            options.push(("link", &mut section.colors));
        }
        options
    }
}

/// Binds typography colors to resolved semantic colors.
pub fn bind_typography_colors(
    typography: BrandTypography,
    colors: &ResolvedColorSet,
) -> Result<BrandTypography> {
    typography.bind_colors(colors)
}

impl VisitLocalFiles for BrandTypography {
    fn visit_local_files(&mut self, visit: &mut dyn FnMut(&mut LocalFile)) {
        for source in &mut self.fonts {
            if let FontSource::File(files) = source {
                for file in &mut files.files {
                    file.path.visit_local_files(visit);
                }
            }
        }
    }

    fn for_each_local_file(&self, visit: &mut dyn FnMut(&LocalFile)) {
        for source in &self.fonts {
            if let FontSource::File(files) = source {
                for file in &files.files {
                    file.path.for_each_local_file(visit);
                }
            }
        }
    }
}

fn inherit(font: &mut FontOptions, size: &mut Option<CssValue>, mono: &MonospaceTypography) {
    if font.family.is_none() {
        font.family = mono.font.family.clone();
    }
    if font.style.is_none() {
        font.style = mono.font.style;
    }
    if font.weight.is_none() {
        font.weight = mono.font.weight;
    }
    if size.is_none() {
        *size = mono.size.clone();
    }
}

fn bind_color(
    section: &str,
    field: &str,
    value: &mut Option<String>,
    colors: &ResolvedColorSet,
) -> Result<()> {
    let Some(slot) = value.as_deref().and_then(ColorSlot::from_name) else {
        return Ok(());
    };
    match colors.get(slot) {
        Some(concrete) => {
            *value = Some(concrete.to_string());
            Ok(())
        }
        None => Err(BrandError::UndefinedColorReference {
            section: section.to_string(),
            field: field.to_string(),
            name: slot.as_str().to_string(),
        }),
    }
}

fn parse_section<T: DeserializeOwned>(record: &Record, shape: &SectionShape) -> Result<Option<T>> {
    let Some(node) = record.get(shape.name).filter(|n| !n.is_null()) else {
        return Ok(None);
    };
    let key_path = join_key("typography", shape.name);

    let fields = match node {
        Node::Scalar(_) if shape.font => {
            let family = node.expect_str(&key_path)?;
            let mut fields = Record::new();
            fields.insert("family".to_string(), Node::from(family));
            fields
        }
        _ => {
            let fields = node.expect_record(&key_path)?;
            deny_unknown_fields(fields, &key_path, &shape.allowed())?;
            fields.clone()
        }
    };

    Node::Record(fields)
        .into_typed()
        .map(Some)
        .map_err(|e| BrandError::invalid(key_path, e.to_string()))
}

fn parse_fonts(node: &Node) -> Result<Vec<FontSource>> {
    let items = node.as_list().ok_or_else(|| {
        BrandError::invalid(
            "typography.fonts",
            format!("expected a sequence, found {}", node.kind()),
        )
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_font(item, &format!("typography.fonts.{}", index)))
        .collect()
}

fn parse_font(node: &Node, key_path: &str) -> Result<FontSource> {
    let record = node.expect_record(key_path)?;
    let source = match record.get("source") {
        Some(source) => source.expect_str(&join_key(key_path, "source"))?,
        None => "file",
    };

    let mut fields = record.clone();
    fields.shift_remove("source");

    match source {
        "file" => parse_font_files(&fields, key_path).map(FontSource::File),
        "google" => parse_font_service(fields, key_path).map(FontSource::Google),
        "bunny" => parse_font_service(fields, key_path).map(FontSource::Bunny),
        other => Err(BrandError::invalid(
            join_key(key_path, "source"),
            format!("unsupported font source '{}', expected file, google or bunny", other),
        )),
    }
}

fn parse_font_service(fields: Record, key_path: &str) -> Result<FontService> {
    Node::Record(fields)
        .into_typed()
        .map_err(|e| BrandError::invalid(key_path, e.to_string()))
}

fn parse_font_files(fields: &Record, key_path: &str) -> Result<FontFiles> {
    deny_unknown_fields(fields, key_path, &["family", "files"])?;

    let family_key = join_key(key_path, "family");
    let family = fields
        .get("family")
        .ok_or_else(|| BrandError::invalid(&family_key, "missing required field"))?
        .expect_str(&family_key)?
        .to_string();

    let files_key = join_key(key_path, "files");
    let files = match fields.get("files").filter(|n| !n.is_null()) {
        None => Vec::new(),
        Some(Node::List(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_font_file(item, &join_key(&files_key, &index.to_string())))
            .collect::<Result<Vec<_>>>()?,
        Some(single) => vec![parse_font_file(single, &join_key(&files_key, "0"))?],
    };

    Ok(FontFiles { family, files })
}

fn parse_font_file(node: &Node, key_path: &str) -> Result<FontFile> {
    let path_key = join_key(key_path, "path");
    let (path_node, weight, style) = match node {
        Node::Record(record) => {
            deny_unknown_fields(record, key_path, &["path", "weight", "style"])?;
            let path = record
                .get("path")
                .ok_or_else(|| BrandError::invalid(&path_key, "missing required field"))?;
            let weight = typed_field::<FontWeight>(record, key_path, "weight")?;
            let style = typed_field::<FontStyle>(record, key_path, "style")?;
            (path, weight, style)
        }
        _ => (node, None, None),
    };

    let raw = path_node.expect_str(&path_key)?;
    let path = FileReference::parse(&path_key, raw)?;
    let format = path
        .extension()
        .as_deref()
        .and_then(FontFormat::from_extension)
        .filter(FontFormat::is_supported)
        .ok_or_else(|| {
            BrandError::invalid(
                &path_key,
                format!(
                    "unsupported font file '{}', expected one of opentype, truetype, woff, woff2",
                    raw
                ),
            )
        })?;

    Ok(FontFile {
        path,
        weight,
        style,
        format,
    })
}

fn typed_field<T: DeserializeOwned>(record: &Record, key_path: &str, field: &str) -> Result<Option<T>> {
    match record.get(field).filter(|n| !n.is_null()) {
        Some(node) => node
            .clone()
            .into_typed()
            .map(Some)
            .map_err(|e| BrandError::invalid(join_key(key_path, field), e.to_string())),
        None => Ok(None),
    }
}
