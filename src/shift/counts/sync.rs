use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::shift::counts::changelog;
use crate::shift::counts::config::EngineConfig;
use crate::shift::counts::eos::{self, EosOutcome};
use crate::shift::counts::error::Result;
use crate::shift::counts::io::store::ShiftStore;
use crate::shift::counts::model::{Dataset, Quarter, Record, ShiftDate, ShiftType};
use crate::shift::counts::workbook;

/// Per-step outcome of a submission. Steps after the quarter sheet write run
/// independently: a failure is recorded here and does not undo earlier
/// steps.
#[derive(Debug)]
pub struct SubmissionReport {
    pub document: PathBuf,
    pub quarter: Quarter,
    pub record_count: usize,
    pub eos: Result<EosOutcome>,
    pub change_log: Result<usize>,
    pub store: Result<()>,
}

impl SubmissionReport {
    /// True when every step succeeded.
    pub fn is_complete(&self) -> bool {
        self.eos.is_ok() && self.change_log.is_ok() && self.store.is_ok()
    }

    /// Messages of the steps that failed.
    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if let Err(error) = &self.eos {
            failures.push(error.to_string());
        }
        if let Err(error) = &self.change_log {
            failures.push(format!("shift changes: {error}"));
        }
        if let Err(error) = &self.store {
            failures.push(format!("store: {error}"));
        }
        failures
    }
}

/// Submits the counts of one quarter for the shift identified by `date` and
/// `shift_type`.
///
/// The quarter sheet is written first; if that fails nothing else happens and
/// the error is returned. Afterwards the records are merged into `dataset`,
/// EoS is brought up to date, the Shift Changes sheet is rebuilt and the store
/// is rewritten from `dataset`, each step on its own.
#[instrument(
    level = "info",
    skip_all,
    fields(date = %date, shift = %shift_type, quarter = %quarter, record_count = records.len())
)]
pub fn submit(
    config: &EngineConfig,
    date: ShiftDate,
    shift_type: ShiftType,
    quarter: Quarter,
    records: Vec<Record>,
    dataset: &mut Dataset,
    store: &ShiftStore,
) -> Result<SubmissionReport> {
    let document = config.document_path(date, shift_type);
    submit_to(&document, quarter, records, dataset, store)
}

/// Same as [`submit`] for an explicit workbook path.
#[instrument(level = "debug", skip_all, fields(path = %document.display()))]
pub fn submit_to(
    document: &Path,
    quarter: Quarter,
    records: Vec<Record>,
    dataset: &mut Dataset,
    store: &ShiftStore,
) -> Result<SubmissionReport> {
    workbook::write_quarter_sheet(document, quarter, &records)?;

    let record_count = records.len();
    for record in records {
        dataset.upsert(record);
    }

    let eos = eos::resolve_eos(document, quarter);
    if let Err(error) = &eos {
        warn!(%error, "EoS sheet not updated");
    }

    let change_log = changelog::write_change_log(dataset, document);
    if let Err(error) = &change_log {
        warn!(%error, "shift changes not updated");
    }

    let store_result = store.save(dataset);
    if let Err(error) = &store_result {
        error!(%error, "shift data not saved");
    }

    info!(record_count, "submission processed");
    Ok(SubmissionReport {
        document: document.to_path_buf(),
        quarter,
        record_count,
        eos,
        change_log,
        store: store_result,
    })
}
