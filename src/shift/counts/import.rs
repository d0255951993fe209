use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, instrument};

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::io::excel_read;
use crate::shift::counts::io::store::ShiftStore;
use crate::shift::counts::model::{Dataset, Quarter, ROLE_COLUMN, Record};

/// Outcome of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Workbook the data was taken from.
    pub source: PathBuf,
    /// Number of records merged per quarter sheet that held data.
    pub merged: Vec<(Quarter, usize)>,
}

impl ImportReport {
    pub fn record_count(&self) -> usize {
        self.merged.iter().map(|(_, count)| count).sum()
    }
}

/// Folds the most recently modified of `paths` into `dataset` and persists
/// the result.
///
/// All paths must live in the same folder. Every quarter sheet with rows and a
/// Role column is converted before anything is merged, so a row that fails
/// validation leaves `dataset` untouched. Merging is last-writer-wins per
/// (quarter, role); quarters the workbook does not fill are kept as they are.
#[instrument(level = "info", skip_all, fields(file_count = paths.len()))]
pub fn import_latest(
    paths: &[PathBuf],
    dataset: &mut Dataset,
    store: &ShiftStore,
) -> Result<ImportReport> {
    let source = select_latest(paths)?;
    info!(source = %source.display(), "importing workbook");

    let tables = excel_read::read_workbook(&source)?;
    let mut staged: Vec<(Quarter, Vec<Record>)> = Vec::new();

    for quarter in Quarter::ALL {
        let Some(table) = tables
            .iter()
            .find(|table| table.sheet_name == quarter.as_str())
        else {
            continue;
        };
        if table.is_empty() || !table.has_column(ROLE_COLUMN) {
            debug!(%quarter, "sheet has no importable rows");
            continue;
        }

        let mut records = Vec::with_capacity(table.rows.len());
        for (row_index, row) in table.rows.iter().enumerate() {
            if table
                .cell(row_index, ROLE_COLUMN)
                .is_none_or(|role| role.is_blank())
            {
                continue;
            }
            let fields = table
                .columns
                .iter()
                .map(String::as_str)
                .zip(row.iter());
            records.push(Record::from_fields(quarter, fields)?);
        }
        staged.push((quarter, records));
    }

    let mut merged = Vec::with_capacity(staged.len());
    for (quarter, records) in staged {
        merged.push((quarter, records.len()));
        for record in records {
            dataset.upsert(record);
        }
    }

    store.save(dataset)?;
    let report = ImportReport { source, merged };
    info!(record_count = report.record_count(), "import merged");
    Ok(report)
}

/// Checks that `paths` share one folder and returns the most recently
/// modified one.
pub fn select_latest(paths: &[PathBuf]) -> Result<PathBuf> {
    if paths.is_empty() {
        return Err(CountsError::NoImportFiles);
    }

    let folders: BTreeSet<&Path> = paths
        .iter()
        .map(|path| path.parent().unwrap_or_else(|| Path::new("")))
        .collect();
    if folders.len() != 1 {
        return Err(CountsError::MixedImportFolders);
    }

    let mut latest: Option<(SystemTime, &PathBuf)> = None;
    for path in paths {
        let modified = fs::metadata(path)?.modified()?;
        if latest.is_none_or(|(newest, _)| modified > newest) {
            latest = Some((modified, path));
        }
    }

    latest
        .map(|(_, path)| path.clone())
        .ok_or(CountsError::NoImportFiles)
}
