use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::io::{commit_temporary, ensure_parent, temporary_path};
use crate::shift::counts::model::{Dataset, Quarter, ROLE_COLUMN, Record};
use crate::shift::counts::table::Cell;

/// File name of the store inside the engine's base directory.
pub const DEFAULT_STORE_FILE: &str = "shift_data.json";

/// Process-independent copy of the full dataset, kept as one JSON document
/// keyed by quarter, then role.
///
/// The document is always rewritten as a whole; it is never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftStore {
    path: PathBuf,
}

impl ShiftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the dataset, falling back to an empty one when the document is
    /// missing or cannot be read.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn load(&self) -> Dataset {
        match self.try_load() {
            Ok(dataset) => {
                info!(record_count = dataset.len(), "loaded shift data");
                dataset
            }
            Err(error) => {
                warn!(%error, "could not load shift data, starting empty");
                Dataset::new()
            }
        }
    }

    /// Loads the dataset, reporting unreadable or malformed documents. A
    /// missing document is an empty dataset.
    pub fn try_load(&self) -> Result<Dataset> {
        if !self.path.exists() {
            debug!("no shift data stored yet");
            return Ok(Dataset::new());
        }
        let source = fs::read_to_string(&self.path)?;
        let json: Value = serde_json::from_str(&source)?;
        dataset_from_json(json)
    }

    /// Overwrites the document with the full dataset.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, dataset: &Dataset) -> Result<()> {
        let json_string = serde_json::to_string_pretty(dataset)?;
        ensure_parent(&self.path)?;
        let temporary = temporary_path(&self.path);
        if let Err(error) = fs::write(&temporary, json_string) {
            let _ = fs::remove_file(&temporary);
            return Err(error.into());
        }
        commit_temporary(&temporary, &self.path)?;
        info!(record_count = dataset.len(), "saved shift data");
        Ok(())
    }
}

/// Rebuilds a dataset from its JSON form. Unknown quarters and records that
/// fail validation are skipped so one bad entry does not discard the rest.
fn dataset_from_json(json: Value) -> Result<Dataset> {
    let Value::Object(quarters) = json else {
        return Err(CountsError::InvalidStore(
            "expected an object keyed by quarter".into(),
        ));
    };

    let mut dataset = Dataset::new();
    for (label, roles) in quarters {
        let quarter = match label.parse::<Quarter>() {
            Ok(quarter) => quarter,
            Err(error) => {
                warn!(%error, "skipping stored quarter");
                continue;
            }
        };
        let Value::Object(roles) = roles else {
            warn!(%quarter, "skipping stored quarter that is not an object");
            continue;
        };

        for (role, fields) in roles {
            let Value::Object(fields) = fields else {
                warn!(%quarter, %role, "skipping stored record that is not an object");
                continue;
            };
            match record_from_json(quarter, &role, &fields) {
                Ok(record) => {
                    dataset.upsert(record);
                }
                Err(error) => warn!(%quarter, %role, %error, "skipping invalid stored record"),
            }
        }
    }

    Ok(dataset)
}

/// Builds a record from a flat JSON object. `role` fills in the Role field
/// when the object does not carry one.
pub(crate) fn record_from_json(
    quarter: Quarter,
    role: &str,
    fields: &Map<String, Value>,
) -> Result<Record> {
    let mut cells: Vec<(String, Cell)> = fields
        .iter()
        .map(|(name, value)| (name.clone(), Cell::from(value)))
        .collect();
    if !fields.contains_key(ROLE_COLUMN) && !role.is_empty() {
        cells.push((ROLE_COLUMN.to_string(), Cell::text(role)));
    }

    Record::from_fields(
        quarter,
        cells.iter().map(|(name, cell)| (name.as_str(), cell)),
    )
}
