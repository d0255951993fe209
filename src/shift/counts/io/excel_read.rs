use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::table::{Cell, SheetTable};

/// Reads every sheet of an Excel workbook, in workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<SheetTable>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    sheet_names
        .iter()
        .map(|name| read_required_sheet(&mut workbook, name))
        .collect()
}

/// Reads one sheet by name. Returns `None` when the workbook has no such
/// sheet.
pub fn read_sheet(path: &Path, name: &str) -> Result<Option<SheetTable>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
        return Ok(None);
    }
    read_required_sheet(&mut workbook, name).map(Some)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<SheetTable> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| CountsError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(CountsError::from)?;
    Ok(range_to_table(name, &range))
}

/// Interprets the first row of the range as headers. Columns with a blank
/// header and rows without any content are dropped.
fn range_to_table(name: &str, range: &Range<DataType>) -> SheetTable {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return SheetTable::new(name);
    };

    let headers: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| (index, cell_to_cell(Some(cell)).to_string().trim().to_string()))
        .filter(|(_, header)| !header.is_empty())
        .collect();

    let rows = rows
        .map(|row| {
            headers
                .iter()
                .map(|(index, _)| cell_to_cell(row.get(*index)))
                .collect::<Vec<Cell>>()
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_blank()))
        .collect();

    SheetTable {
        sheet_name: name.to_string(),
        columns: headers.into_iter().map(|(_, header)| header).collect(),
        rows,
    }
}

fn cell_to_cell(cell: Option<&DataType>) -> Cell {
    match cell {
        Some(DataType::Float(value)) => Cell::Number(*value),
        Some(DataType::Int(value)) => Cell::Number(*value as f64),
        Some(DataType::String(value)) => Cell::text(value.clone()),
        Some(DataType::Bool(value)) => Cell::Text(value.to_string()),
        Some(DataType::Empty) | None => Cell::Empty,
        Some(other) => Cell::text(other.to_string()),
    }
}
