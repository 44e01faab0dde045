//! `brandkit` - check brand.yml files and query their resolved values.
//!
//! ```text
//! brandkit check [PATH] [--json]
//! brandkit colors [PATH]
//! brandkit logo <NAME> [PATH] [--variant auto|light|dark|light-dark] [--no-fallback] [--required]
//! ```
//!
//! PATH may be a brand file or a project directory. Without PATH the brand
//! named by `BRAND_YML_PATH` is used, falling back to discovery from the
//! current directory.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use brandkit::{
    Brand, FileReference, LogoRequest, LogoSlot, LogoVariant, Required, BRAND_YML_PATH_ENV,
};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "brandkit")]
#[command(version)]
#[command(about = "Validate brand.yml files and resolve their colors and logos")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a brand and print the resolved document
    Check(CheckArgs),

    /// Print each resolved semantic color
    Colors(PathArg),

    /// Print the location of a logo
    Logo(LogoArgs),
}

#[derive(Args)]
struct PathArg {
    /// Brand file or project directory
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    target: PathArg,

    /// Print JSON instead of YAML
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct LogoArgs {
    /// Size (small, medium, large, smallest, largest) or image name
    #[arg(value_name = "NAME")]
    name: String,

    #[command(flatten)]
    target: PathArg,

    /// Color-scheme variant
    #[arg(long, default_value = "auto")]
    variant: LogoVariant,

    /// Do not substitute a single logo for a missing variant
    #[arg(long)]
    no_fallback: bool,

    /// Fail when no logo matches
    #[arg(long)]
    required: bool,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_brand(path: Option<&Path>) -> Result<Brand> {
    match path {
        Some(path) => Brand::from_path(path)
            .with_context(|| format!("failed to load brand from {}", path.display())),
        None if std::env::var_os(BRAND_YML_PATH_ENV).is_some() => Brand::from_env()
            .with_context(|| format!("failed to load brand from ${BRAND_YML_PATH_ENV}")),
        None => {
            let cwd = std::env::current_dir().context("cannot read current directory")?;
            Brand::from_project(&cwd)
                .with_context(|| format!("no brand found for project at {}", cwd.display()))
        }
    }
}

fn check(brand: &Brand, json: bool) -> Result<String> {
    for file in brand.local_files() {
        if let Err(err) = file.validate_exists() {
            warn!("{}", err);
        }
    }

    if json {
        let mut out = serde_json::to_string_pretty(brand).context("failed to serialize brand")?;
        out.push('\n');
        Ok(out)
    } else {
        brand.to_yaml().context("failed to serialize brand")
    }
}

fn colors(brand: &Brand) -> String {
    let Some(colors) = brand.colors() else {
        debug!("brand has no color section");
        return String::new();
    };
    colors
        .iter()
        .map(|(slot, value)| format!("{slot}: {value}\n"))
        .collect()
}

fn location(reference: &FileReference) -> String {
    match reference {
        FileReference::Local(file) => file.absolute().display().to_string(),
        FileReference::Remote(remote) => remote.url().to_string(),
    }
}

fn logo(brand: &Brand, args: &LogoArgs) -> Result<String> {
    let request = LogoRequest::new(&args.name)
        .variant(args.variant)
        .allow_fallback(!args.no_fallback)
        .required(if args.required {
            Required::Always
        } else {
            Required::Default
        });

    let slot = brand.use_logo(&request)?;
    let out = match slot {
        None => String::new(),
        Some(LogoSlot::Single(resource)) => format!("{}\n", location(&resource.path)),
        Some(LogoSlot::LightDark(pair)) => {
            let mut out = String::new();
            for (side, resource) in [("light", &pair.light), ("dark", &pair.dark)] {
                if let Some(resource) = resource {
                    out.push_str(&format!("{side}: {}\n", location(&resource.path)));
                }
            }
            out
        }
    };
    Ok(out)
}

fn run(cli: Cli) -> Result<String> {
    match cli.command {
        Commands::Check(args) => {
            let brand = load_brand(args.target.path.as_deref())?;
            check(&brand, args.json)
        }
        Commands::Colors(target) => {
            let brand = load_brand(target.path.as_deref())?;
            Ok(colors(&brand))
        }
        Commands::Logo(args) => {
            let brand = load_brand(args.target.path.as_deref())?;
            logo(&brand, &args)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
