//! # cogs CLI Entry Point
//!
//! Loads settings and the cost config snapshot, then dispatches one
//! resolution command and prints its result as JSON.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        cogs Startup                                     │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                             │
//! │  2. Load EngineSettings (defaults → cogs.toml → COGS_* env)            │
//! │  3. Initialize tracing (RUST_LOG, else settings.log_level) → stderr    │
//! │  4. Load cost config (--config, else settings.cost_config_path)        │
//! │  5. Run command, print pretty JSON → stdout                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use cogs_core::{
    detect_combos, resolve_combo, resolve_order, resolve_order_with_combos, resolve_product,
    validate, PricingContext, VariantId,
};
use cogs_store::{load_line_items, read_config, ConfigStore, EngineSettings};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Cost-of-goods-sold resolver.
///
/// Resolves product, combo and order costs against a cost config snapshot.
#[derive(Parser, Debug)]
#[command(name = "cogs", version, about)]
struct Cli {
    /// Engine settings file (default: platform config dir cogs.toml).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Cost config snapshot (JSON). Overrides the settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the cost config and print the report.
    Validate,
    /// Resolve the cost of one product variant.
    Product {
        variant_id: VariantId,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        qty: i64,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Resolve the cost of one combo.
    Combo {
        combo_id: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        qty: i64,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Resolve the cost of an order file.
    Order {
        order: PathBuf,
        /// Allocate combos before pricing the remaining lines.
        #[arg(long)]
        combos: bool,
        #[command(flatten)]
        context: ContextArgs,
    },
    /// Print the combos an order file qualifies for.
    Detect { order: PathBuf },
}

/// Pricing context flags; both fall back to the settings defaults.
#[derive(Args, Debug)]
struct ContextArgs {
    /// Destination country code.
    #[arg(long)]
    country: Option<String>,

    /// Shipping company.
    #[arg(long)]
    carrier: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = EngineSettings::load(cli.settings.clone()).context("loading engine settings")?;
    init_tracing(&settings);

    let config_path = cli
        .config
        .clone()
        .or_else(|| settings.cost_config_path.clone());
    let Some(config_path) = config_path else {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no cost config given: pass --config or set cost_config_path",
            )
            .exit();
    };

    match cli.command {
        Commands::Validate => run_validate(&config_path),
        Commands::Product {
            variant_id,
            qty,
            context,
        } => {
            let store = open_store(&config_path, &settings)?;
            let ctx = pricing_context(&settings, context);
            let result = resolve_product(&store.snapshot().config, variant_id, &ctx, qty)?;
            print_json(&result)
        }
        Commands::Combo {
            combo_id,
            qty,
            context,
        } => {
            let store = open_store(&config_path, &settings)?;
            let ctx = pricing_context(&settings, context);
            let result = resolve_combo(&store.snapshot().config, &combo_id, &ctx, qty)?;
            print_json(&result)
        }
        Commands::Order {
            order,
            combos,
            context,
        } => {
            let store = open_store(&config_path, &settings)?;
            let ctx = pricing_context(&settings, context);
            let lines = load_line_items(&order)?;
            let snapshot = store.snapshot();
            let cost = if combos {
                resolve_order_with_combos(&snapshot.config, &lines, &ctx)
            } else {
                resolve_order(&snapshot.config, &lines, &ctx)
            };
            info!(
                total = %cost.total_cost,
                errors = cost.errors.len(),
                "Order resolved"
            );
            print_json(&cost)
        }
        Commands::Detect { order } => {
            let store = open_store(&config_path, &settings)?;
            let lines = load_line_items(&order)?;
            print_json(&detect_combos(&store.snapshot().config, &lines))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing(settings: &EngineSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Validation always reads the file directly so that strict mode cannot hide
/// the report.
fn run_validate(path: &Path) -> Result<()> {
    let config = read_config(path)?;
    let report = validate(&config);
    print_json(&report)?;
    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn open_store(path: &Path, settings: &EngineSettings) -> Result<ConfigStore> {
    debug!(?path, strict = settings.strict, "Opening cost config");
    ConfigStore::from_path(path, settings.strict)
        .with_context(|| format!("loading cost config {}", path.display()))
}

fn pricing_context(settings: &EngineSettings, args: ContextArgs) -> PricingContext {
    match settings.context(args.country, args.carrier) {
        Some(ctx) => ctx,
        None => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no pricing context: pass --country and --carrier or set defaults",
            )
            .exit(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
