use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;

use sumaria::data;
use sumaria::report::{self, Columns, Outcome, ReportConfig};

/// Aggregates a fiscal-year ledger workbook into CSV summary reports.
#[derive(Parser)]
struct Cli {
    /// Path to the source workbook (.xlsx)
    input: PathBuf,

    /// Fiscal year to analyze
    #[arg(long, default_value_t = 2025)]
    year: i32,

    /// Worksheet holding the ledger
    #[arg(long, default_value = "DataBase Combined")]
    sheet: String,

    /// Top-level category to filter on
    #[arg(long, default_value = "Income Statement")]
    category: String,

    /// Sub-category for the detail report
    #[arg(long, default_value = "2 COGS")]
    zoom: String,

    /// Directory the reports are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = ReportConfig::new(cli.year, cli.sheet, cli.category, cli.zoom, Columns::default());

    info!("loading workbook {}", cli.input.display());
    let table = data::load_sheet(&cli.input, &cfg)?;
    info!("loaded {} rows from sheet '{}'", table.len(), cfg.sheet_name());

    let run = report::run(&table, &cfg, &cli.out_dir)?;
    match run.general {
        Outcome::Written(path) => info!("general summary saved to {}", path.display()),
        Outcome::NoRows => info!("general summary not generated"),
    }
    match run.zoom {
        Outcome::Written(path) => info!("detail report saved to {}", path.display()),
        Outcome::NoRows => info!("detail report not generated"),
    }

    Ok(())
}
