// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fir_scope_core::config::default_config_path;
use fir_scope_core::surface::OptionKind;
use fir_scope_core::{
    classify, matches_code, CatalogLoader, ScopeConfig, ScopeController, SurfaceStatus,
};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of the FIR catalog document
    #[arg(long, env = "FIR_SCOPE_CATALOG_URL", global = true)]
    catalog_url: Option<String>,

    /// Local FIR catalog document (wins over --catalog-url)
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    /// Path to scope_config.json
    #[arg(long = "config-path", global = true)]
    config_path: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test an ICAO code against prefix patterns
    Match { code: String, patterns: Vec<String> },
    /// Show the continental group of ICAO region prefixes
    Classify { prefixes: Vec<String> },
    /// Print the international selection surface
    Catalog,
    /// Resolve a selection to its label, token and patterns
    Scope {
        #[arg(short, long, num_args = 1..)]
        select: Vec<String>,
        /// Custom patterns, e.g. "EG*, LF*"
        #[arg(short, long)]
        manual: Option<String>,
    },
    /// Print the flights of a JSON feed that depart inside the selection
    Filter {
        #[arg(short, long)]
        feed: PathBuf,
        #[arg(short, long, num_args = 1..)]
        select: Vec<String>,
        #[arg(short, long)]
        manual: Option<String>,
    },
    /// Inspect or update the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Show,
    SetUrl { url: String },
    SetFile { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);

    let config_path = cli.config_path.clone().unwrap_or_else(default_config_path);
    let mut config = ScopeConfig::load_from(&config_path)?;

    match &cli.command {
        Commands::Match { code, patterns } => {
            let hit = matches_code(code, patterns);
            println!("{} {}", code.to_uppercase(), if hit { "IN SCOPE" } else { "OUT OF SCOPE" });
        }
        Commands::Classify { prefixes } => {
            for prefix in prefixes {
                println!("{:<4} {}", prefix.to_uppercase(), classify(prefix));
            }
        }
        Commands::Catalog => {
            let mut controller = build_controller(&cli, &config);
            let status = controller.enter_international();
            if status != SurfaceStatus::International {
                eprintln!("Catalog unavailable (status: {:?})", status);
            }
            let mut current_group = None;
            for option in controller.surface().options() {
                if option.kind == OptionKind::Placeholder {
                    println!("{}", option.label);
                    continue;
                }
                if current_group.as_deref() != Some(option.group.as_str()) {
                    println!("\n[{}]", option.group);
                    current_group = Some(option.group.clone());
                }
                println!("  {:<8} {}", option.key, option.label);
            }
        }
        Commands::Scope { select, manual } => {
            let mut controller = build_controller(&cli, &config);
            resolve(&mut controller, select, manual.as_deref());
            let scope = controller.active_scope();
            println!("label:    {}", scope.label());
            println!("token:    {}", scope.token());
            println!("patterns: {}", scope.patterns().join(" "));
        }
        Commands::Filter {
            feed,
            select,
            manual,
        } => {
            let content = std::fs::read_to_string(feed)
                .with_context(|| format!("Failed to read {}", feed.display()))?;
            let flights: Vec<serde_json::Value> =
                serde_json::from_str(&content).context("Flight feed must be a JSON array")?;

            let mut controller = build_controller(&cli, &config);
            resolve(&mut controller, select, manual.as_deref());
            let filter = controller.flight_filter();

            let kept = filter.retain(&flights);
            for flight in &kept {
                println!("{}", flight);
            }
            eprintln!("{} of {} flights in scope ({})", kept.len(), flights.len(), filter.scope().label());
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::SetUrl { url } => {
                config.catalog_url = Some(url.clone());
                config.save_to(&config_path)?;
                println!("Catalog URL saved to {}", config_path.display());
            }
            ConfigAction::SetFile { path } => {
                config.catalog_path = Some(path.clone());
                config.save_to(&config_path)?;
                println!("Catalog file saved to {}", config_path.display());
            }
        },
    }

    Ok(())
}

fn build_controller(cli: &Cli, stored: &ScopeConfig) -> ScopeController {
    let mut config = stored.clone();
    if let Some(url) = &cli.catalog_url {
        config.catalog_url = Some(url.clone());
        config.catalog_path = None;
    }
    if let Some(path) = &cli.catalog_file {
        config.catalog_path = Some(path.clone());
    }

    let mut builder = ScopeController::builder();
    if let Some(source) = config.catalog_source() {
        builder = builder.catalog_loader(Arc::new(CatalogLoader::new(source)));
    }
    builder.build()
}

fn resolve(controller: &mut ScopeController, select: &[String], manual: Option<&str>) {
    if controller.enter_international() != SurfaceStatus::International {
        eprintln!("Catalog unavailable; scope is unrestricted");
    }
    controller.select(select);
    if let Some(text) = manual {
        controller.set_manual_patterns(text);
    }
}
