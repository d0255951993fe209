use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::shift::counts::error::Result;
use crate::shift::counts::io::{commit_temporary, ensure_parent, temporary_path};
use crate::shift::counts::table::{Cell, SheetTable};

/// Writes the provided sheets, in order, as a complete workbook at `path`.
///
/// The workbook is saved next to the target first and then moved over it, so
/// an interrupted or failed write leaves the previous file in place.
pub fn write_workbook(path: &Path, tables: &[SheetTable]) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Number(value) => {
                        worksheet.write_number(excel_row, col_idx as u16, *value)?;
                    }
                    Cell::Text(value) => {
                        worksheet.write_string(excel_row, col_idx as u16, value)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        worksheet.autofit();
    }

    ensure_parent(path)?;
    let temporary = temporary_path(path);
    if let Err(error) = workbook_writer.save(&temporary) {
        let _ = fs::remove_file(&temporary);
        return Err(error.into());
    }
    commit_temporary(&temporary, path)?;
    debug!(path = %path.display(), sheet_count = tables.len(), "workbook written");
    Ok(())
}
