use std::path::Path;

use tracing::{info, instrument};

use crate::shift::counts::error::Result;
use crate::shift::counts::model::{Dataset, QUARTER_COLUMN};
use crate::shift::counts::table::{Cell, SheetTable};
use crate::shift::counts::workbook::{SHIFT_CHANGES_SHEET, ShiftWorkbook};

/// Flattens the whole dataset into the Shift Changes table: one row per
/// quarter and role, `Quarter` first, ordered by quarter rank then role.
pub fn rebuild_change_log(dataset: &Dataset) -> SheetTable {
    let mut rows: Vec<(u8, &str, Vec<(String, Cell)>)> = Vec::with_capacity(dataset.len());

    for (quarter, roles) in dataset.iter() {
        for (role, record) in roles {
            let mut row = vec![(QUARTER_COLUMN.to_string(), Cell::text(quarter.as_str()))];
            row.extend(record.to_keyed_row());
            rows.push((quarter.rank(), role.as_str(), row));
        }
    }

    rows.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0).then_with(|| lhs.1.cmp(rhs.1)));

    SheetTable::from_keyed_rows(SHIFT_CHANGES_SHEET, rows.into_iter().map(|(_, _, row)| row))
}

/// Replaces the Shift Changes sheet of the workbook at `path`. Returns the
/// number of rows written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_change_log(dataset: &Dataset, path: &Path) -> Result<usize> {
    let table = rebuild_change_log(dataset);
    let row_count = table.rows.len();

    let mut document = ShiftWorkbook::open_or_create(path)?;
    document.replace_sheet(table);
    document.commit()?;
    info!(row_count, "shift changes written");
    Ok(row_count)
}
