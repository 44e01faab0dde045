//! Integration tests for loading brand documents from disk.
//!
//! These tests build small projects in temporary directories and check that
//! references resolve, local files bind to the brand file's directory, and
//! discovery finds the right file.

use std::fs;
use std::path::Path;

use brandkit::{
    Brand, BrandError, ColorSlot, FileReference, LogoRequest, LogoSlot, LogoVariant, Required,
    BRAND_YML_PATH_ENV,
};
use serial_test::serial;
use tempfile::TempDir;

const FULL_BRAND: &str = r##"
meta:
  name:
    full: Acme Corporation
    short: Acme
  link:
    home: https://acme.example
    github: https://github.com/acme
color:
  palette:
    navy: "#1b2a49"
    ocean: navy
    sand: "#f4e9d8"
  foreground: ocean
  background: sand
  primary: ocean
  link: primary
typography:
  fonts:
    - family: Acme Sans
      files:
        - path: fonts/acme-regular.woff2
          weight: 400
        - path: fonts/acme-bold.woff2
          weight: bold
    - family: Fira Code
      source: google
  base:
    family: Acme Sans
    size: 16px
    line-height: 1.5
  headings:
    family: Acme Sans
    weight: bold
    color: primary
  monospace: Fira Code
  link:
    color: link
    decoration: underline
logo:
  images:
    icon: logos/icon.png
    wordmark:
      path: logos/wordmark.svg
      alt: Acme wordmark
    wordmark-white: logos/wordmark-white.svg
  small: icon
  medium:
    light: wordmark
    dark: wordmark-white
  large: https://cdn.acme.example/logo-large.png
"##;

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn project(brand_location: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join(brand_location), FULL_BRAND);
    dir
}

// ============================================================================
// Loading a file
// ============================================================================

#[test]
fn loads_and_resolves_full_brand() {
    let dir = project("_brand.yml");
    let brand = Brand::from_file(dir.path().join("_brand.yml")).unwrap();

    let colors = brand.colors().unwrap();
    assert_eq!(colors.get(ColorSlot::Foreground), Some("#1b2a49"));
    assert_eq!(colors.get(ColorSlot::Background), Some("#f4e9d8"));
    assert_eq!(colors.get(ColorSlot::Link), Some("#1b2a49"));

    let color = brand.color.as_ref().unwrap();
    assert_eq!(color.palette_color("ocean"), Some("#1b2a49"));

    let typography = brand.typography.as_ref().unwrap();
    assert_eq!(
        typography.headings.as_ref().unwrap().colors.color.as_deref(),
        Some("#1b2a49")
    );
    assert_eq!(
        typography.link.as_ref().unwrap().colors.color.as_deref(),
        Some("#1b2a49")
    );
    assert_eq!(typography.fonts.len(), 2);

    let meta = brand.meta.as_ref().unwrap();
    assert_eq!(meta.name.as_ref().unwrap().short(), Some("Acme"));
    assert_eq!(
        meta.link.as_ref().unwrap().home().unwrap().as_str(),
        "https://acme.example/"
    );
}

#[test]
fn local_files_bind_to_brand_directory() {
    let dir = project("brand/_brand.yml");
    let brand = Brand::from_file(dir.path().join("brand/_brand.yml")).unwrap();
    let root = dir.path().canonicalize().unwrap().join("brand");

    let files = brand.local_files();
    assert!(!files.is_empty());
    for file in &files {
        assert_eq!(file.root_dir(), Some(root.as_path()));
        assert!(file.absolute().starts_with(&root));
    }

    let icon = brand.use_logo(&LogoRequest::new("small")).unwrap().unwrap();
    let LogoSlot::Single(resource) = icon else {
        panic!("expected a single logo");
    };
    let FileReference::Local(local) = &resource.path else {
        panic!("expected a local file");
    };
    assert_eq!(local.absolute(), root.join("logos/icon.png"));
}

#[test]
fn remote_logo_is_not_bound() {
    let dir = project("_brand.yml");
    let brand = Brand::from_file(dir.path().join("_brand.yml")).unwrap();

    let large = brand.use_logo(&LogoRequest::new("largest")).unwrap().unwrap();
    let resource = large.as_single().unwrap();
    assert!(!resource.path.is_local());
    assert_eq!(
        resource.path.to_string(),
        "https://cdn.acme.example/logo-large.png"
    );
}

#[test]
fn missing_local_files_are_reported_not_fatal() {
    let dir = project("_brand.yml");
    write(&dir.path().join("logos/icon.png"), "png");
    let brand = Brand::from_file(dir.path().join("_brand.yml")).unwrap();

    let missing: Vec<_> = brand
        .local_files()
        .into_iter()
        .filter(|file| file.validate_exists().is_err())
        .map(|file| file.relative().to_path_buf())
        .collect();
    assert!(missing.iter().all(|p| p != Path::new("logos/icon.png")));
    assert!(missing.contains(&Path::new("logos/wordmark.svg").to_path_buf()));
}

#[test]
fn logo_variants_from_loaded_brand() {
    let dir = project("_brand.yml");
    let brand = Brand::from_file(dir.path().join("_brand.yml")).unwrap();

    let dark = brand
        .use_logo(&LogoRequest::new("medium").variant(LogoVariant::Dark))
        .unwrap()
        .unwrap();
    assert_eq!(
        dark.as_single().unwrap().path.to_string(),
        "logos/wordmark-white.svg"
    );

    let light = brand
        .use_logo(&LogoRequest::new("medium").variant(LogoVariant::Light))
        .unwrap()
        .unwrap();
    assert_eq!(light.as_single().unwrap().alt.as_deref(), Some("Acme wordmark"));

    let err = brand
        .use_logo(&LogoRequest::new("poster").required(Required::Always))
        .unwrap_err();
    assert!(matches!(err, BrandError::LogoResourceMissing { .. }));
}

#[test]
fn invalid_document_fails_as_a_whole() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("_brand.yml");
    write(
        &path,
        "color:\n  palette:\n    a: b\n    b: a\n  primary: a\n",
    );

    let err = Brand::from_file(&path).unwrap_err();
    let BrandError::CircularReference(cycle) = &err else {
        panic!("expected a circular reference, got {err}");
    };
    assert_eq!(cycle.context.as_deref(), Some("palette"));
}

#[test]
fn unreadable_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Brand::from_file(dir.path().join("nope.yml")).unwrap_err();
    assert!(matches!(err, BrandError::Io { .. }));
}

#[test]
fn malformed_yaml_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("_brand.yml");
    write(&path, "color: [unclosed\n");

    let err = Brand::from_file(&path).unwrap_err();
    let BrandError::Yaml {
        path: Some(reported),
        ..
    } = &err
    else {
        panic!("expected a yaml error with a path");
    };
    assert!(reported.ends_with("_brand.yml"));
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn from_project_walks_up() {
    let dir = project("_brand/_brand.yml");
    let nested = dir.path().join("docs/guide");
    fs::create_dir_all(&nested).unwrap();

    let brand = Brand::from_project(&nested).unwrap();
    assert!(brand.path().unwrap().ends_with("_brand/_brand.yml"));
}

#[test]
fn from_path_accepts_directory_or_file() {
    let dir = project("_brand.yml");

    let from_dir = Brand::from_path(dir.path()).unwrap();
    let from_file = Brand::from_path(dir.path().join("_brand.yml")).unwrap();
    assert_eq!(from_dir.path(), from_file.path());
    assert_eq!(from_dir, from_file);
}

#[test]
fn refresh_picks_up_changes() {
    let dir = project("_brand.yml");
    let path = dir.path().join("_brand.yml");
    let mut brand = Brand::from_file(&path).unwrap();
    assert!(brand.colors().unwrap().contains(ColorSlot::Link));

    write(&path, "color:\n  primary: \"#000000\"\n");
    brand.refresh().unwrap();

    let colors = brand.colors().unwrap();
    assert_eq!(colors.get(ColorSlot::Primary), Some("#000000"));
    assert!(!colors.contains(ColorSlot::Link));
    assert!(brand.logo.is_none());
}

#[test]
fn refresh_without_path_fails() {
    let mut brand = Brand::from_yaml_str("{}", None).unwrap();
    assert!(matches!(
        brand.refresh().unwrap_err(),
        BrandError::MissingBrandPath
    ));
}

// ============================================================================
// Environment
// ============================================================================

#[test]
#[serial]
fn from_env_reads_brand_path() {
    let dir = project("_brand.yml");
    std::env::set_var(BRAND_YML_PATH_ENV, dir.path().join("_brand.yml"));

    let result = Brand::from_env();
    std::env::remove_var(BRAND_YML_PATH_ENV);

    let brand = result.unwrap();
    assert!(brand.path().unwrap().ends_with("_brand.yml"));
}

#[test]
#[serial]
fn from_env_accepts_project_directory() {
    let dir = project("brand/_brand.yaml");
    std::env::set_var(BRAND_YML_PATH_ENV, dir.path());

    let result = Brand::from_env();
    std::env::remove_var(BRAND_YML_PATH_ENV);

    assert!(result.unwrap().path().unwrap().ends_with("brand/_brand.yaml"));
}

#[test]
#[serial]
fn from_env_without_variable() {
    std::env::remove_var(BRAND_YML_PATH_ENV);
    assert!(matches!(
        Brand::from_env().unwrap_err(),
        BrandError::MissingBrandPath
    ));
}
