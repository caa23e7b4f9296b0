//! EVE Industry Calculator
//!
//! Command line front end for the recursive build calculator.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use industry_calculator::bonuses::SettingsRequest;
use industry_calculator::calculator::{format_build_steps, format_duration};
use industry_calculator::pricing::MarketPrice;
use industry_calculator::reference::ReferenceLookup;
use industry_calculator::{ItemTypeId, calculate_recursive_build, db, logging, price_result, resolve_settings, sample};

#[derive(Parser)]
#[command(name = "industry-calculator")]
#[command(about = "Recursive build calculator for EVE Online industry")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "industry_data.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the full build tree for a blueprint
    Calc {
        /// Blueprint id, blueprint name or product name
        blueprint: String,

        /// Material efficiency of the blueprint (0-10)
        #[arg(long)]
        me: Option<u32>,

        /// Time efficiency of the blueprint (0-20)
        #[arg(long)]
        te: Option<u32>,

        /// Runs per blueprint copy
        #[arg(short, long)]
        runs: Option<u64>,

        /// Number of blueprint copies
        #[arg(short, long)]
        batches: Option<u64>,

        /// Structure: station, raitaru, azbel, sotiyo, athanor, tatara
        #[arg(long)]
        structure: Option<String>,

        /// Rig: none, t1-me, t2-me, t1-te, t2-te
        #[arg(long)]
        rig: Option<String>,

        /// Security: highsec, lowsec, nullsec, wormhole
        #[arg(long)]
        security: Option<String>,

        /// Material efficiency assumed for built components
        #[arg(long)]
        component_me: Option<u32>,

        /// Time efficiency assumed for built components
        #[arg(long)]
        component_te: Option<u32>,

        /// System cost index as a fraction
        #[arg(long)]
        system_index: Option<f64>,

        /// Facility tax as a fraction
        #[arg(long)]
        tax: Option<f64>,

        /// Job cost scale factor
        #[arg(long)]
        job_cost_scale: Option<f64>,

        /// Show the build step tree
        #[arg(short, long)]
        verbose: bool,

        /// Price the result with stored market prices
        #[arg(short, long)]
        priced: bool,
    },

    /// List all blueprints in the database
    ListBlueprints,

    /// Show details for a specific blueprint
    Blueprint {
        /// Blueprint id, blueprint name or product name
        query: String,
    },

    /// Store market prices for a type
    SetPrice {
        type_id: u32,

        #[arg(long)]
        buy: f64,

        #[arg(long)]
        sell: f64,

        /// Adjusted price used for job cost estimates
        #[arg(long)]
        adjusted: Option<f64>,
    },

    /// Initialize empty database with schema
    Init,

    /// Load sample data for testing (without a full data import)
    LoadSample,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Calc {
            blueprint,
            me,
            te,
            runs,
            batches,
            structure,
            rig,
            security,
            component_me,
            component_te,
            system_index,
            tax,
            job_cost_scale,
            verbose,
            priced,
        } => {
            let request = SettingsRequest {
                blueprint_me: me,
                blueprint_te: te,
                runs_per_batch: runs,
                number_of_batches: batches,
                structure,
                rig,
                security,
                component_me,
                component_te,
                system_cost_index: system_index,
                facility_tax: tax,
                job_cost_scale,
            };
            let settings = resolve_settings(&request)?;

            let reference = db::load_reference_data(&conn)?;
            let target = reference
                .find_blueprint(&blueprint)
                .ok_or_else(|| anyhow!("Blueprint '{}' not found", blueprint))?;
            let adjusted_prices = db::load_adjusted_prices(&conn)?;

            let result = calculate_recursive_build(&reference, target.blueprint_id, &settings, &adjusted_prices)?;

            if verbose {
                println!("Build steps:\n");
                println!("{}", format_build_steps(&result));
            }
            println!("{}", result);

            if priced {
                let prices = db::load_market_prices(&conn)?;
                println!("{}", price_result(&result, &prices));
            }
        }

        Commands::ListBlueprints => {
            let reference = db::load_reference_data(&conn)?;
            let blueprints = reference.blueprints();
            if blueprints.is_empty() {
                println!("No blueprints in database. Run 'load-sample' first.");
            } else {
                println!("{:>8}  {:<45} {:<14} {:>10}", "ID", "Blueprint", "Activity", "Time");
                println!("{}", "-".repeat(80));
                for bp in blueprints {
                    println!(
                        "{:>8}  {:<45} {:<14} {:>10}",
                        bp.blueprint_id,
                        bp.blueprint_name,
                        bp.activity,
                        format_duration(bp.base_time_seconds)
                    );
                }
            }
        }

        Commands::Blueprint { query } => {
            let reference = db::load_reference_data(&conn)?;
            if let Some(bp) = reference.find_blueprint(&query) {
                println!("Blueprint: {}", bp.blueprint_name);
                println!("  ID: {}", bp.blueprint_id);
                println!("  Activity: {}", bp.activity);
                println!("  Produces: {} x {}", bp.produced_per_run, bp.product_name);
                println!("  Time per run: {}", format_duration(bp.base_time_seconds));
                println!("  Materials per run:");
                for material in &bp.materials {
                    let source = match reference.blueprint_by_product_id(material.type_id) {
                        Some(producer) => format!(" ({})", producer.activity),
                        None => String::new(),
                    };
                    println!(
                        "    {} x {}{}",
                        material.quantity_per_run,
                        reference.type_name(material.type_id),
                        source
                    );
                }
            } else {
                println!("Blueprint '{}' not found", query);
            }
        }

        Commands::SetPrice {
            type_id,
            buy,
            sell,
            adjusted,
        } => {
            db::upsert_price(&conn, ItemTypeId(type_id), MarketPrice { buy, sell }, adjusted)?;
            println!("Price stored for type {}", type_id);
        }

        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            let count = sample::load_sample_data(&conn)?;
            println!("Loaded {} sample blueprints", count);
        }
    }

    Ok(())
}
