use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Datelike;
use enum_dispatch::enum_dispatch;
use getset::Getters;
use rust_decimal::Decimal;

use super::table::{Record, Table};
use super::ReportConfig;

/// Retains exactly the records whose main category equals the configured one
/// (case-sensitive) and whose parsed date falls in the target year. Records
/// with an unparseable date cannot match any year and are dropped here.
///
/// An empty result is a valid outcome, not an error.
pub fn primary_filter(table: &Table, cfg: &ReportConfig) -> Table {
    table.filtered(|r| {
        r.main_category == *cfg.target_main_category()
            && r.date.map(|d| d.year()) == Some(cfg.target_year())
    })
}

/// One grouping key value. Absent values sort after every present value, so
/// rows with a missing key always land at the end of a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyPart(Option<String>);

impl Ord for KeyPart {
    fn cmp(&self, other: &KeyPart) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &KeyPart) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One aggregate row: the two grouping key values plus the summed amount.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub keys: [Option<String>; 2],
    pub amount: Decimal,
}

/// A fully aggregated, sorted table ready for export.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Summary {
    key_columns: [String; 2],
    amount_column: String,
    rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|r| r.amount).sum()
    }
}

/// Groups the table by the two key values extracted per record and sums
/// `amount` per group with full decimal precision. The map keeps the groups
/// in ascending key order, absent keys last, independent of input order.
fn group_sum<F>(table: &Table, key_of: F) -> Vec<SummaryRow>
where
    F: Fn(&Record) -> [Option<&String>; 2],
{
    let mut groups: BTreeMap<(KeyPart, KeyPart), Decimal> = BTreeMap::new();
    for record in table.iter() {
        let [first, second] = key_of(record);
        let key = (KeyPart(first.cloned()), KeyPart(second.cloned()));
        *groups.entry(key).or_insert(Decimal::ZERO) += record.amount;
    }

    groups
        .into_iter()
        .map(|((first, second), amount)| SummaryRow {
            keys: [first.0, second.0],
            amount,
        })
        .collect()
}

#[enum_dispatch]
pub trait BuildSummary {
    /// Aggregates the already year/category-filtered table. Returns `None`
    /// when no rows feed this report, in which case no file must be written.
    fn build(&self, filtered: &Table, cfg: &ReportConfig) -> Option<Summary>;

    fn file_name(&self, cfg: &ReportConfig) -> String;
}

#[enum_dispatch(BuildSummary)]
pub enum Report {
    GeneralSummary,
    ZoomDetail,
}

/// Per-(sub-category, class) totals over the whole filtered table.
pub struct GeneralSummary;

impl BuildSummary for GeneralSummary {
    fn build(&self, filtered: &Table, cfg: &ReportConfig) -> Option<Summary> {
        if filtered.is_empty() {
            return None;
        }

        let cols = cfg.columns();
        Some(Summary {
            key_columns: [cols.sub_category().clone(), cols.class().clone()],
            amount_column: cols.amount().clone(),
            rows: group_sum(filtered, |r| [r.sub_category.as_ref(), r.class.as_ref()]),
        })
    }

    fn file_name(&self, cfg: &ReportConfig) -> String {
        format!("report_{}_general_summary.csv", cfg.target_year())
    }
}

/// Per-(source, class) totals over the records of one sub-category.
pub struct ZoomDetail;

impl BuildSummary for ZoomDetail {
    fn build(&self, filtered: &Table, cfg: &ReportConfig) -> Option<Summary> {
        let zoomed =
            filtered.filtered(|r| r.sub_category.as_deref() == Some(cfg.zoom_category().as_str()));
        if zoomed.is_empty() {
            return None;
        }

        let cols = cfg.columns();
        Some(Summary {
            key_columns: [cols.source().clone(), cols.class().clone()],
            amount_column: cols.amount().clone(),
            rows: group_sum(&zoomed, |r| [r.source.as_ref(), r.class.as_ref()]),
        })
    }

    fn file_name(&self, cfg: &ReportConfig) -> String {
        format!(
            "report_{}_detail_{}.csv",
            cfg.target_year(),
            cfg.zoom_category().replace(' ', "_")
        )
    }
}
