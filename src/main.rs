use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use paleo_seawater::config::Config;
use paleo_seawater::data::{load_mis_boundaries, load_reference_table};
use paleo_seawater::density::{compute_grid, isopycnal_levels, DensityGridResult};
use paleo_seawater::glacials::MisBoundaries;
use paleo_seawater::salinity::{AgeRounding, Estimator, SalinityReconstructionRequest};

#[derive(Parser)]
#[command(name = "paleo-seawater", version, about = "Seawater density and paleo-salinity calculations")]
struct Cli {
    /// TOML file with defaults for every subcommand.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// σ2 grid over a temperature/salinity box, as JSON.
    Density {
        #[arg(long, allow_negative_numbers = true)]
        min_temp: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        max_temp: Option<f64>,
        #[arg(long)]
        min_sal: Option<f64>,
        #[arg(long)]
        max_sal: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        water_depth: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        longitude: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        latitude: Option<f64>,
        #[arg(long)]
        num_isopycnals: Option<usize>,
        /// Only print the contour levels.
        #[arg(long)]
        levels_only: bool,
    },
    /// Reconstruct past salinity from δ18O_sw.
    Salinity {
        /// Sea-level reference table (.csv, .json or .parquet).
        #[arg(long)]
        table: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        d18o_sw: f64,
        /// Sample age (ka).
        #[arg(long)]
        age: f64,
        #[arg(long, allow_negative_numbers = true)]
        d18o_sw_modern: Option<f64>,
        #[arg(long)]
        salinity_modern: Option<f64>,
        /// Round ages half-to-even instead of half away from zero.
        #[arg(long)]
        half_even: bool,
    },
    /// Glacial stages inside an age window.
    Glacials {
        /// MIS boundary table (.csv, .json or .parquet).
        #[arg(long)]
        table: PathBuf,
        #[arg(long)]
        min_age: Option<f64>,
        #[arg(long)]
        max_age: Option<f64>,
    },
}

#[derive(Serialize)]
struct DensityOutput<'a> {
    #[serde(flatten)]
    grid: &'a DensityGridResult,
    isopycnals: &'a [f64],
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Density {
            min_temp,
            max_temp,
            min_sal,
            max_sal,
            water_depth,
            longitude,
            latitude,
            num_isopycnals,
            levels_only,
        } => {
            let mut req = config.density.clone();
            req.min_temp = min_temp.unwrap_or(req.min_temp);
            req.max_temp = max_temp.unwrap_or(req.max_temp);
            req.min_sal = min_sal.unwrap_or(req.min_sal);
            req.max_sal = max_sal.unwrap_or(req.max_sal);
            req.water_depth = water_depth.unwrap_or(req.water_depth);
            req.longitude = longitude.unwrap_or(req.longitude);
            req.latitude = latitude.unwrap_or(req.latitude);
            req.num_isopycnals = num_isopycnals.unwrap_or(req.num_isopycnals);

            let grid = compute_grid(&req, &config.equations)?;
            let levels = isopycnal_levels(&grid, req.num_isopycnals);
            info!(
                "σ2 range {:.3}–{:.3} kg/m³, {} isopycnals",
                grid.min_density(),
                grid.max_density(),
                levels.len()
            );
            if levels_only {
                print_json(&levels)
            } else {
                print_json(&DensityOutput {
                    grid: &grid,
                    isopycnals: &levels,
                })
            }
        }
        Command::Salinity {
            table,
            d18o_sw,
            age,
            d18o_sw_modern,
            salinity_modern,
            half_even,
        } => {
            let baseline = &config.reconstruction;
            let table = load_reference_table(&table)?;
            let rounding = if half_even {
                AgeRounding::HalfEven
            } else {
                baseline.rounding
            };
            let req = SalinityReconstructionRequest {
                d18o_sw,
                age,
                d18o_sw_modern: d18o_sw_modern.unwrap_or(baseline.d18o_sw_modern),
                salinity_modern: salinity_modern.unwrap_or(baseline.salinity_modern),
            };
            let result = Estimator::new(&table)
                .with_rounding(rounding)
                .reconstruct_detailed(&req)?;
            print_json(&result)
        }
        Command::Glacials {
            table,
            min_age,
            max_age,
        } => {
            let boundaries = MisBoundaries::new(load_mis_boundaries(&table)?)?;
            let spans = boundaries.glacial_spans(
                min_age.unwrap_or(f64::NEG_INFINITY),
                max_age.unwrap_or(f64::INFINITY),
            );
            print_json(&spans)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}
