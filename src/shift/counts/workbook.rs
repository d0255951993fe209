use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::io::{excel_read, excel_write};
use crate::shift::counts::model::{QUARTER_COLUMN, Quarter, Record};
use crate::shift::counts::table::SheetTable;

/// Reserved sheet, always empty.
pub const WASH_SHEET: &str = "Wash";
/// Sheet holding the sorted change log of the whole shift.
pub const SHIFT_CHANGES_SHEET: &str = "Shift Changes";

/// Sheets every shift workbook carries, in workbook order.
pub const FIXED_SHEETS: [&str; 7] = ["SoS", "Q1", "Q2", "Q3", "EoS", WASH_SHEET, SHIFT_CHANGES_SHEET];

/// Scoped handle on a shift workbook.
///
/// The whole document is held in memory while sheets are replaced; nothing
/// reaches the file until [`ShiftWorkbook::commit`] succeeds. Dropping the
/// handle without committing leaves the file as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftWorkbook {
    path: PathBuf,
    sheets: Vec<SheetTable>,
}

impl ShiftWorkbook {
    /// A new document holding every fixed sheet, empty.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheets: FIXED_SHEETS.iter().map(|name| SheetTable::new(*name)).collect(),
        }
    }

    /// Reads an existing document.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CountsError::MissingInput(path.to_path_buf()));
        }
        let sheets = excel_read::read_workbook(path)?;
        debug!(sheet_count = sheets.len(), "workbook opened");
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    /// Reads the document at `path`, or starts a new one when it does not
    /// exist yet.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::open(path)
        } else {
            Ok(Self::create(path))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|sheet| sheet.sheet_name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetTable> {
        self.sheets.iter().find(|sheet| sheet.sheet_name == name)
    }

    /// Replaces the sheet named after `table`, adding it when missing. Quarter
    /// sheets never keep a `Quarter` column, so all five share one shape.
    pub fn replace_sheet(&mut self, mut table: SheetTable) {
        if table.sheet_name.parse::<Quarter>().is_ok() {
            table.drop_column(QUARTER_COLUMN);
        }
        match self
            .sheets
            .iter_mut()
            .find(|sheet| sheet.sheet_name == table.sheet_name)
        {
            Some(sheet) => *sheet = table,
            None => self.sheets.push(table),
        }
    }

    /// Writes the document. Fixed sheets come first, in fixed order, followed
    /// by any other sheet the document already carried.
    pub fn commit(self) -> Result<()> {
        let fixed: BTreeSet<&str> = FIXED_SHEETS.iter().copied().collect();
        let mut ordered: Vec<SheetTable> = FIXED_SHEETS
            .iter()
            .map(|name| {
                self.sheet(name)
                    .cloned()
                    .unwrap_or_else(|| SheetTable::new(*name))
            })
            .collect();
        ordered.extend(
            self.sheets
                .iter()
                .filter(|sheet| !fixed.contains(sheet.sheet_name.as_str()))
                .cloned(),
        );
        excel_write::write_workbook(&self.path, &ordered)
    }
}

/// Replaces the sheet of `quarter` with the tabular form of `records`.
///
/// Columns are the union of the record fields in first-seen order and rows
/// follow the order of `records`. Roles missing from `records` disappear from
/// the sheet. The batch is checked before anything is written: every record
/// must belong to `quarter` and roles must be unique.
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), quarter = %quarter, record_count = records.len())
)]
pub fn write_quarter_sheet(path: &Path, quarter: Quarter, records: &[Record]) -> Result<()> {
    validate_batch(quarter, records)?;

    let table = SheetTable::from_keyed_rows(
        quarter.as_str(),
        records.iter().map(Record::to_keyed_row),
    );

    let mut document = ShiftWorkbook::open_or_create(path)?;
    document.replace_sheet(table);
    document.commit()?;
    info!("quarter sheet written");
    Ok(())
}

fn validate_batch(quarter: Quarter, records: &[Record]) -> Result<()> {
    let mut roles = BTreeSet::new();
    for record in records {
        if record.quarter() != quarter {
            return Err(CountsError::InvalidBatch(format!(
                "record for '{}' is tagged {} while submitting {quarter}",
                record.role(),
                record.quarter()
            )));
        }
        if !roles.insert(record.role()) {
            return Err(CountsError::InvalidBatch(format!(
                "role '{}' appears more than once",
                record.role()
            )));
        }
    }
    Ok(())
}
