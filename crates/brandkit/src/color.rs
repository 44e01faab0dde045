//! Brand colors: a palette of named colors plus semantic color slots.
//!
//! Semantic slots (`primary`, `foreground`, ...) may name a palette entry or
//! another slot. Resolution turns every defined slot into a concrete value.
//!
//! ```rust
//! use brandkit::{BrandColor, ColorSlot, Node};
//!
//! let node = Node::from_yaml_str(
//!     "palette:\n  blue: '#447099'\n  ocean: blue\nprimary: ocean\nlink: primary\n",
//! )
//! .unwrap();
//! let color = BrandColor::from_node(&node).unwrap();
//!
//! assert_eq!(color.palette_color("ocean"), Some("#447099"));
//! assert_eq!(color.get(ColorSlot::Primary), Some("#447099"));
//! assert_eq!(color.get(ColorSlot::Link), Some("#447099"));
//! assert_eq!(color.get(ColorSlot::Danger), None);
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::defs::{DefinitionStore, ReferenceResolver};
use crate::error::{BrandError, Result};
use crate::node::{deny_unknown_fields, join_key, Node, Record};

/// The `palette` field of the color section.
pub const PALETTE_FIELD: &str = "palette";

/// A semantic color slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSlot {
    Foreground,
    Background,
    Primary,
    Secondary,
    Tertiary,
    Success,
    Info,
    Warning,
    Danger,
    Light,
    Dark,
    Emphasis,
    Link,
}

impl ColorSlot {
    /// All slots in declaration order.
    pub const ALL: [ColorSlot; 13] = [
        ColorSlot::Foreground,
        ColorSlot::Background,
        ColorSlot::Primary,
        ColorSlot::Secondary,
        ColorSlot::Tertiary,
        ColorSlot::Success,
        ColorSlot::Info,
        ColorSlot::Warning,
        ColorSlot::Danger,
        ColorSlot::Light,
        ColorSlot::Dark,
        ColorSlot::Emphasis,
        ColorSlot::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorSlot::Foreground => "foreground",
            ColorSlot::Background => "background",
            ColorSlot::Primary => "primary",
            ColorSlot::Secondary => "secondary",
            ColorSlot::Tertiary => "tertiary",
            ColorSlot::Success => "success",
            ColorSlot::Info => "info",
            ColorSlot::Warning => "warning",
            ColorSlot::Danger => "danger",
            ColorSlot::Light => "light",
            ColorSlot::Dark => "dark",
            ColorSlot::Emphasis => "emphasis",
            ColorSlot::Link => "link",
        }
    }

    /// Looks up a slot by its field name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == name)
    }
}

impl fmt::Display for ColorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorSlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown color slot '{}'", s))
    }
}

/// Concrete values for the defined semantic slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedColorSet {
    colors: IndexMap<ColorSlot, String>,
}

impl ResolvedColorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a slot. Returns self for chaining.
    pub fn with(mut self, slot: ColorSlot, value: impl Into<String>) -> Self {
        self.colors.insert(slot, value.into());
        self
    }

    pub fn get(&self, slot: ColorSlot) -> Option<&str> {
        self.colors.get(&slot).map(String::as_str)
    }

    /// Looks up a slot by field name; non-slot names return `None`.
    pub fn get_name(&self, name: &str) -> Option<&str> {
        ColorSlot::from_name(name).and_then(|slot| self.get(slot))
    }

    pub fn contains(&self, slot: ColorSlot) -> bool {
        self.colors.contains_key(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorSlot, &str)> {
        self.colors.iter().map(|(slot, value)| (*slot, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Resolves semantic color assignments against a palette.
///
/// Semantic assignments may name palette entries or other semantic slots;
/// where a slot and a palette entry share a name, the slot wins. Null and
/// missing slots stay undefined.
pub fn resolve_colors(palette: &DefinitionStore, semantic: &Record) -> Result<ResolvedColorSet> {
    ReferenceResolver::new(palette).context("palette").validate()?;

    let mut combined = palette.clone();
    let mut assignments = Record::new();
    for slot in ColorSlot::ALL {
        if let Some(value) = semantic.get(slot.as_str()).filter(|v| !v.is_null()) {
            combined.insert(slot.as_str(), value.clone());
            assignments.insert(slot.as_str().to_string(), value.clone());
        }
    }

    let resolved = ReferenceResolver::new(&combined)
        .context("color")
        .skip_field(PALETTE_FIELD)
        .resolve_record(&assignments)?;

    let mut colors = ResolvedColorSet::new();
    for (name, value) in resolved {
        let key_path = join_key("color", &name);
        let value = value.expect_str(&key_path)?.to_string();
        if let Some(slot) = ColorSlot::from_name(&name) {
            colors.colors.insert(slot, value);
        }
    }

    debug!(defined = colors.len(), "resolved semantic colors");
    Ok(colors)
}

/// The `color` section of a brand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandColor {
    palette: IndexMap<String, String>,
    colors: ResolvedColorSet,
}

impl BrandColor {
    /// Parses and resolves a `color` section.
    pub fn from_node(node: &Node) -> Result<Self> {
        let record = node.expect_record("color")?;

        let mut allowed: Vec<&str> = vec![PALETTE_FIELD];
        allowed.extend(ColorSlot::ALL.iter().map(ColorSlot::as_str));
        deny_unknown_fields(record, "color", &allowed)?;

        let palette_store = match record.get(PALETTE_FIELD).filter(|p| !p.is_null()) {
            Some(palette) => {
                DefinitionStore::from(palette.expect_record("color.palette")?.clone())
            }
            None => DefinitionStore::new(),
        };

        let resolved_palette = ReferenceResolver::new(&palette_store)
            .context("palette")
            .resolve_store()?;
        let mut palette = IndexMap::new();
        for (name, value) in resolved_palette.as_record() {
            let key_path = join_key("color.palette", name);
            palette.insert(name.clone(), value.expect_str(&key_path)?.to_string());
        }

        let colors = resolve_colors(&palette_store, record)?;
        Ok(Self { palette, colors })
    }

    /// The resolved palette, in declaration order.
    pub fn palette(&self) -> &IndexMap<String, String> {
        &self.palette
    }

    pub fn palette_color(&self, name: &str) -> Option<&str> {
        self.palette.get(name).map(String::as_str)
    }

    pub fn colors(&self) -> &ResolvedColorSet {
        &self.colors
    }

    pub fn get(&self, slot: ColorSlot) -> Option<&str> {
        self.colors.get(slot)
    }
}

impl Serialize for BrandColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let palette_len = usize::from(!self.palette.is_empty());
        let mut map = serializer.serialize_map(Some(palette_len + self.colors.len()))?;
        if !self.palette.is_empty() {
            map.serialize_entry(PALETTE_FIELD, &self.palette)?;
        }
        for (slot, value) in self.colors.iter() {
            map.serialize_entry(slot.as_str(), value)?;
        }
        map.end()
    }
}

impl From<BrandColor> for ResolvedColorSet {
    fn from(color: BrandColor) -> Self {
        color.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(text: &str) -> Result<BrandColor> {
        BrandColor::from_node(&Node::from_yaml_str(text).unwrap())
    }

    fn palette(pairs: &[(&str, &str)]) -> DefinitionStore {
        pairs
            .iter()
            .fold(DefinitionStore::new(), |store, (name, value)| store.add(name, *value))
    }

    fn semantic(text: &str) -> Record {
        Node::from_yaml_str(text)
            .unwrap()
            .as_record()
            .cloned()
            .unwrap()
    }

    // =========================================================================
    // ColorSlot tests
    // =========================================================================

    #[test]
    fn test_slot_names_round_trip() {
        for slot in ColorSlot::ALL {
            assert_eq!(ColorSlot::from_name(slot.as_str()), Some(slot));
            assert_eq!(slot.as_str().parse::<ColorSlot>(), Ok(slot));
        }
        assert_eq!(ColorSlot::from_name("orange"), None);
    }

    // =========================================================================
    // resolve_colors tests
    // =========================================================================

    #[test]
    fn test_slot_references_palette() {
        let colors = resolve_colors(
            &palette(&[("red", "#FF0000")]),
            &semantic("primary: red\n"),
        )
        .unwrap();
        assert_eq!(colors.get(ColorSlot::Primary), Some("#FF0000"));
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn test_slot_references_other_slot() {
        let colors = resolve_colors(
            &palette(&[("blue", "#00f")]),
            &semantic("primary: blue\nlink: primary\nemphasis: link\n"),
        )
        .unwrap();
        assert_eq!(colors.get(ColorSlot::Link), Some("#00f"));
        assert_eq!(colors.get(ColorSlot::Emphasis), Some("#00f"));
    }

    #[test]
    fn test_slot_overrides_palette_name() {
        let colors = resolve_colors(
            &palette(&[("primary", "#111"), ("ink", "#222")]),
            &semantic("primary: '#333'\nforeground: primary\n"),
        )
        .unwrap();
        assert_eq!(colors.get(ColorSlot::Foreground), Some("#333"));
    }

    #[test]
    fn test_literal_values_pass_through() {
        let colors = resolve_colors(&DefinitionStore::new(), &semantic("danger: '#c00'\n")).unwrap();
        assert_eq!(colors.get(ColorSlot::Danger), Some("#c00"));
    }

    #[test]
    fn test_null_slots_are_undefined() {
        let colors = resolve_colors(&DefinitionStore::new(), &semantic("info: ~\n")).unwrap();
        assert!(colors.is_empty());
        assert_eq!(colors.get_name("info"), None);
    }

    #[test]
    fn test_palette_cycle_reported() {
        let err = resolve_colors(
            &palette(&[("a", "b"), ("b", "a")]),
            &semantic("primary: '#000'\n"),
        )
        .unwrap_err();
        match err {
            BrandError::CircularReference(cycle) => {
                assert_eq!(cycle.context.as_deref(), Some("palette"));
                assert_eq!(cycle.chain, ["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_slot_cycle_reported() {
        let err = resolve_colors(
            &DefinitionStore::new(),
            &semantic("foreground: background\nbackground: foreground\n"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BrandError::CircularReference(ref c) if c.context.as_deref() == Some("color")
        ));
    }

    #[test]
    fn test_non_string_slot_rejected() {
        let err = resolve_colors(&DefinitionStore::new(), &semantic("primary: [1, 2]\n")).unwrap_err();
        assert!(matches!(
            err,
            BrandError::InvalidDocument { ref key_path, .. } if key_path == "color.primary"
        ));
    }

    // =========================================================================
    // BrandColor tests
    // =========================================================================

    #[test]
    fn test_brand_color_resolves_palette_aliases() {
        let color = color("palette:\n  blue: '#00f'\n  navy: blue\nsecondary: navy\n").unwrap();
        assert_eq!(color.palette_color("navy"), Some("#00f"));
        assert_eq!(color.get(ColorSlot::Secondary), Some("#00f"));
        assert_eq!(color.palette().keys().collect::<Vec<_>>(), ["blue", "navy"]);
    }

    #[test]
    fn test_brand_color_rejects_unknown_field() {
        let err = color("primary: '#000'\naccent: '#fff'\n").unwrap_err();
        assert!(matches!(
            err,
            BrandError::InvalidDocument { ref key_path, .. } if key_path == "color.accent"
        ));
    }

    #[test]
    fn test_brand_color_palette_values_must_be_strings() {
        let err = color("palette:\n  red: {r: 255}\n").unwrap_err();
        assert!(matches!(
            err,
            BrandError::InvalidDocument { ref key_path, .. } if key_path == "color.palette.red"
        ));
    }

    #[test]
    fn test_brand_color_without_palette() {
        let color = color("foreground: '#222'\nbackground: '#fff'\n").unwrap();
        assert!(color.palette().is_empty());
        assert_eq!(color.colors().len(), 2);
    }

    #[test]
    fn test_brand_color_serializes_flat() {
        let color = color("palette:\n  red: '#f00'\nprimary: red\n").unwrap();
        let value = serde_json::to_value(&color).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"palette": {"red": "#f00"}, "primary": "#f00"})
        );
    }
}
