//! Per-role, per-metric differences between two quarters.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::shift::counts::model::{Dataset, Quarter, ROLE_COLUMN};
use crate::shift::counts::table::{Cell, SheetTable};

/// Summary returned when either quarter has no data.
pub const QUARTERS_UNAVAILABLE: &str = "One or both quarters are not available.";
/// Summary returned when the quarters share no comparable metric.
pub const NO_COMMON_DATA: &str = "No common numeric data found.";

/// Difference of one metric of one role between two quarters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaRow {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Old Value")]
    pub old_value: u64,
    #[serde(rename = "New Value")]
    pub new_value: u64,
    #[serde(rename = "Difference")]
    pub difference: i64,
    #[serde(rename = "Percent Change")]
    pub percent_change: f64,
}

impl DeltaRow {
    fn new(role: &str, metric: &str, old_value: u64, new_value: u64) -> Self {
        // Records cap counts at MAX_COUNT, so both fit in i64.
        let difference = new_value as i64 - old_value as i64;
        let percent_change = if old_value == 0 {
            0.0
        } else {
            difference as f64 * 100.0 / old_value as f64
        };
        Self {
            role: role.to_string(),
            metric: metric.to_string(),
            old_value,
            new_value,
            difference,
            percent_change,
        }
    }

    /// One human-readable summary line.
    pub fn summary_line(&self) -> String {
        format!(
            "{} - {}: {} -> {} | Diff: {} | {:.1}%",
            self.role,
            self.metric,
            self.old_value,
            self.new_value,
            self.difference,
            self.percent_change
        )
    }
}

/// Result of comparing two quarters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaReport {
    pub summary: String,
    pub rows: Vec<DeltaRow>,
}

impl DeltaReport {
    fn unavailable() -> Self {
        Self {
            summary: QUARTERS_UNAVAILABLE.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct metrics of the report, in first-seen order.
    pub fn metrics(&self) -> Vec<&str> {
        let mut metrics: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !metrics.contains(&row.metric.as_str()) {
                metrics.push(&row.metric);
            }
        }
        metrics
    }

    /// Rows of one metric, one per role: the series a chart of the metric
    /// plots.
    pub fn rows_for_metric<'a>(&'a self, metric: &'a str) -> impl Iterator<Item = &'a DeltaRow> {
        self.rows.iter().filter(move |row| row.metric == metric)
    }

    /// Tabular form of the report.
    pub fn to_table(&self, sheet_name: &str) -> SheetTable {
        SheetTable::from_keyed_rows(
            sheet_name,
            self.rows.iter().map(|row| {
                vec![
                    (ROLE_COLUMN.to_string(), Cell::text(row.role.clone())),
                    ("Metric".to_string(), Cell::text(row.metric.clone())),
                    ("Old Value".to_string(), Cell::Number(row.old_value as f64)),
                    ("New Value".to_string(), Cell::Number(row.new_value as f64)),
                    ("Difference".to_string(), Cell::Number(row.difference as f64)),
                    ("Percent Change".to_string(), Cell::Number(row.percent_change)),
                ]
            }),
        )
    }
}

/// Compares every metric of the roles present in both `from` and `to`.
///
/// Roles are visited in lexicographic order and metrics in the order `from`'s
/// record declares them. Unreported values count as zero on both sides, and a
/// zero old value yields a percent change of exactly zero. A quarter missing
/// from the dataset is not an error: the report carries the
/// [`QUARTERS_UNAVAILABLE`] summary and no rows.
#[instrument(level = "debug", skip(dataset))]
pub fn compute_delta(dataset: &Dataset, from: Quarter, to: Quarter) -> DeltaReport {
    let (Some(old_roles), Some(new_roles)) = (dataset.quarter(from), dataset.quarter(to)) else {
        return DeltaReport::unavailable();
    };

    let mut rows = Vec::new();
    for (role, old_record) in old_roles {
        let Some(new_record) = new_roles.get(role) else {
            continue;
        };
        for (metric, old_value) in old_record.metrics() {
            let new_value = new_record.get(metric).unwrap_or(0);
            rows.push(DeltaRow::new(role, metric, old_value.unwrap_or(0), new_value));
        }
    }
    debug!(row_count = rows.len(), "delta computed");

    let summary = if rows.is_empty() {
        NO_COMMON_DATA.to_string()
    } else {
        rows.iter()
            .map(DeltaRow::summary_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    DeltaReport { summary, rows }
}
