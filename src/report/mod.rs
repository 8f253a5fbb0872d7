use std::path::{Path, PathBuf};

use anyhow::Result;
use getset::{CopyGetters, Getters};
use log::{info, warn};

pub mod pipeline;
pub mod table;


use crate::data;
use pipeline::{BuildSummary, GeneralSummary, Report, ZoomDetail};
use table::Table;

/// The column-role names of the source sheet. The first two key roles of
/// each report and the amount role also name the exported header columns.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct Columns {
    date: String,
    amount: String,
    main_category: String,
    sub_category: String,
    class: String,
    source: String,
}

impl Default for Columns {
    fn default() -> Columns {
        Columns {
            date: "Date".to_string(),
            amount: "Amount".to_string(),
            main_category: "Grandparent".to_string(),
            sub_category: "Parent".to_string(),
            class: "Class".to_string(),
            source: "Source".to_string(),
        }
    }
}

/// Immutable per-run configuration, supplied once and passed into every
/// pipeline step.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct ReportConfig {
    #[getset(get_copy = "pub")]
    target_year: i32,
    #[getset(get = "pub")]
    sheet_name: String,
    #[getset(get = "pub")]
    target_main_category: String,
    #[getset(get = "pub")]
    zoom_category: String,
    #[getset(get = "pub")]
    columns: Columns,
}

impl ReportConfig {
    pub fn new(
        target_year: i32,
        sheet_name: String,
        target_main_category: String,
        zoom_category: String,
        columns: Columns,
    ) -> ReportConfig {
        ReportConfig {
            target_year,
            sheet_name,
            target_main_category,
            zoom_category,
            columns,
        }
    }
}

/// What happened to one report: written to disk, or skipped because no rows
/// fed it. Skipping is a normal outcome, not a failure.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    NoRows,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RunReport {
    pub general: Outcome,
    pub zoom: Outcome,
}

/// Runs the whole pipeline over a loaded table: primary filter, then the
/// general summary followed by the zoom detail. An empty primary filter
/// skips all aggregation and exits cleanly with both outcomes `NoRows`.
pub fn run(table: &Table, cfg: &ReportConfig, out_dir: &Path) -> Result<RunReport> {
    info!(
        "filtering for year {} and category '{}'",
        cfg.target_year(),
        cfg.target_main_category()
    );

    let filtered = pipeline::primary_filter(table, cfg);
    if filtered.is_empty() {
        warn!(
            "no rows match year {} and category '{}', nothing to report",
            cfg.target_year(),
            cfg.target_main_category()
        );
        return Ok(RunReport {
            general: Outcome::NoRows,
            zoom: Outcome::NoRows,
        });
    }

    let general = write_report(Report::GeneralSummary(GeneralSummary), &filtered, cfg, out_dir)?;
    let zoom = write_report(Report::ZoomDetail(ZoomDetail), &filtered, cfg, out_dir)?;

    Ok(RunReport { general, zoom })
}

fn write_report(
    report: Report,
    filtered: &Table,
    cfg: &ReportConfig,
    out_dir: &Path,
) -> Result<Outcome> {
    match report.build(filtered, cfg) {
        Some(summary) => {
            let path = out_dir.join(report.file_name(cfg));
            data::export_summary(&summary, &path)?;
            info!("wrote {} rows to {}", summary.rows().len(), path.display());
            Ok(Outcome::Written(path))
        },
        None => {
            info!("no matching rows for {}, report skipped", report.file_name(cfg));
            Ok(Outcome::NoRows)
        },
    }
}
