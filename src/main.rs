//! LED CPQ command line
//!
//! Thin wrapper around the quoting engine: marshals a `ProjectInput` in
//! (JSON) and a `QuoteResult` out. Also manages the SQLite rate catalog.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use led_cpq::calculator::{self, compute_quote};
use led_cpq::models::{
    Access, Complexity, ControlSystem, ElectricalCapacity, InstallationType, LaborType,
    PowerDistance, ProductClass, ProjectInput, QuoteSnapshot, ServiceLevel, StructureCondition,
    Timeline, VenueType,
};
use led_cpq::rates::{CostConfig, RateCard};
use led_cpq::db;

#[derive(Parser)]
#[command(name = "led-cpq")]
#[command(about = "Installed-price quoting for LED display projects")]
struct Cli {
    /// Path to the SQLite rate catalog
    #[arg(short, long, default_value = "cpq_rates.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a quote from a ProjectInput JSON file
    Quote {
        /// Path to the input JSON
        input: PathBuf,

        /// Show per-line descriptions and calculation notes
        #[arg(short, long)]
        verbose: bool,

        /// Emit the full QuoteResult as JSON instead of the table
        #[arg(long)]
        json: bool,

        /// Write an input+result snapshot to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Quote a built-in demo project
    Sample,

    /// List the active rate card
    Rates,

    /// Write the default rate card into the catalog
    SeedRates {
        /// Clear existing rates first
        #[arg(long)]
        clear: bool,
    },

    /// Initialize an empty catalog with schema
    Init,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Quote {
            input,
            verbose,
            json,
            output,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let project: ProjectInput = serde_json::from_str(&text)
                .with_context(|| format!("invalid project input in {}", input.display()))?;

            run_quote(&conn, &project, verbose, json, output.as_deref())?;
        }

        Commands::Sample => {
            let project = sample_project();
            println!("Sample project: {}\n", project.client_name);
            run_quote(&conn, &project, true, false, None)?;
        }

        Commands::Rates => {
            let card = active_rate_card(&conn)?;
            println!("{:<8} {:<10} {:>12}", "Pitch", "Env", "$/sqft");
            println!("{}", "-".repeat(32));
            for (pitch, env, rate) in card.iter() {
                println!("{:<8} {:<10} {:>12.0}", format!("{pitch}mm"), env.as_str(), rate);
            }
        }

        Commands::SeedRates { clear } => {
            if clear {
                println!("Clearing existing rates...");
                db::clear_rates(&conn)?;
            }
            let count = db::seed_default_rates(&conn)?;
            println!("Seeded {count} rate cells");
        }

        Commands::Init => {
            println!("Catalog initialized at: {}", cli.database.display());
        }
    }

    Ok(())
}

fn active_rate_card(conn: &Connection) -> Result<RateCard> {
    let card = db::load_rate_card(conn)?;
    if card.is_empty() {
        log::debug!("rate catalog empty; using built-in defaults");
        Ok(RateCard::default())
    } else {
        Ok(card)
    }
}

fn run_quote(
    conn: &Connection,
    project: &ProjectInput,
    verbose: bool,
    json: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let rates = active_rate_card(conn)?;
    let config = CostConfig::default();
    let result = compute_quote(project, &rates, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", calculator::format_breakdown(&result, verbose));
        println!();
        print!("{}", result.summary);
    }

    if let Some(path) = output {
        let snapshot = QuoteSnapshot {
            input: project.clone(),
            result,
        };
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nSnapshot written to {}", path.display());
    }

    Ok(())
}

/// Demo project for trying the engine without writing a JSON file.
fn sample_project() -> ProjectInput {
    ProjectInput {
        client_name: "Riverside Arena".to_string(),
        product_class: ProductClass::Ribbon,
        venue_type: VenueType::Ncaa,
        width_ft: 40.0,
        height_ft: 6.0,
        pixel_pitch_mm: 10.0,
        is_outdoor: true,
        structure_condition: StructureCondition::Existing,
        installation_type: InstallationType::New,
        labor_type: LaborType::Union,
        access: Access::Front,
        power_distance: PowerDistance::Medium,
        electrical_capacity: ElectricalCapacity::Adequate,
        complexity: Complexity::Standard,
        control_system: ControlSystem::Include,
        num_displays: 2,
        team_size: 4,
        duration_days: 14,
        unit_cost_override: None,
        target_margin_pct: 0.0,
        contingency_pct: 5.0,
        bond_required: true,
        service_level: ServiceLevel::Silver,
        timeline: Timeline::Standard,
    }
}
