//! Brandkit - validation and reference resolution for brand.yml documents.
//!
//! A brand document describes colors, typography and logos. Values may refer
//! to each other by name: semantic colors point at palette entries,
//! typography colors point at semantic colors, and logo sizes point at named
//! images. Loading a brand resolves every reference and rejects the document
//! as a whole if anything is cyclic, undefined or malformed.
//!
//! - Named definitions with cycle detection ([`DefinitionStore`],
//!   [`ReferenceResolver`])
//! - The palette to semantic color to typography cascade ([`resolve_colors`],
//!   [`bind_typography_colors`])
//! - Local and remote file references with lazy root binding
//!   ([`FileReference`])
//! - Logo lookup by size, name and light/dark variant ([`use_logo`])
//!
//! # Quick Start
//!
//! ```rust
//! use brandkit::{Brand, ColorSlot, LogoRequest, LogoVariant};
//!
//! let yaml = r##"
//! meta:
//!   name: Acme
//! color:
//!   palette:
//!     navy: "#1b2a49"
//!     sky: "#8ecae6"
//!   primary: navy
//!   link: primary
//! typography:
//!   base: Inter
//!   link:
//!     color: link
//! logo:
//!   images:
//!     mark: logos/mark.svg
//!     mark-white: logos/mark-white.svg
//!   small:
//!     light: mark
//!     dark: mark-white
//! "##;
//!
//! let brand = Brand::from_yaml_str(yaml, None).unwrap();
//! assert_eq!(brand.colors().unwrap().get(ColorSlot::Link), Some("#1b2a49"));
//!
//! let link = brand.typography.as_ref().unwrap().link.as_ref().unwrap();
//! assert_eq!(link.colors.color.as_deref(), Some("#1b2a49"));
//!
//! let dark = brand
//!     .use_logo(&LogoRequest::new("small").variant(LogoVariant::Dark))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(dark.as_single().unwrap().path.to_string(), "logos/mark-white.svg");
//! ```
//!
//! # Loading
//!
//! [`Brand::from_file`] binds every local file to the brand file's directory.
//! [`Brand::from_project`] walks up from a directory looking for
//! `_brand.yml` (see [`BRAND_FILE_CANDIDATES`]), and [`Brand::from_env`]
//! reads the path from the `BRAND_YML_PATH` environment variable.

mod brand;
mod color;
mod defs;
mod discover;
mod error;
mod file;
mod logo;
mod node;
mod typography;

pub use brand::{Brand, BrandLink, BrandMeta, BrandName, BRAND_FIELDS};
pub use color::{resolve_colors, BrandColor, ColorSlot, ResolvedColorSet, PALETTE_FIELD};
pub use defs::{resolve, DefinitionStore, ReferenceResolver, MAX_DEPTH};
pub use discover::{find_project_brand_yml, BRAND_FILE_CANDIDATES, BRAND_YML_PATH_ENV};
pub use error::{BrandError, CircularReferenceError, Result};
pub use file::{FileReference, LocalFile, RemoteFile, VisitLocalFiles, REMOTE_SCHEMES};
pub use logo::{
    select_variant, use_logo, BrandLogo, LightDark, Logo, LogoRequest, LogoResource, LogoSize,
    LogoSlot, LogoVariant, Required, LARGEST, SMALLEST,
};
pub use node::{Node, Record, Scalar};
pub use typography::{
    bind_typography_colors, BaseTypography, BrandTypography, ColorOptions, CssValue, FontDisplay,
    FontFile, FontFiles, FontFormat, FontOptions, FontService, FontSource, FontStyle, FontWeight,
    FontWeightSpec, HeadingsTypography, LinkTypography, MonospaceBlockTypography,
    MonospaceInlineTypography, MonospaceTypography, FONT_WEIGHT_NAMES, TYPOGRAPHY_SECTIONS,
};
