use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::model::{
    FLOOR_COLUMN, QUARTER_COLUMN, Quarter, ROLE_COLUMN, RoleKind, checked_total, parse_count,
};
use crate::shift::counts::table::{Cell, SheetTable};
use crate::shift::counts::workbook::ShiftWorkbook;

/// What happened to the EoS sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EosOutcome {
    /// The submitted EoS counts were kept as they are.
    Passthrough { row_count: usize },
    /// The EoS sheet now holds the per-role rollup of the listed quarters,
    /// which are the ones holding at least one row.
    Aggregated {
        contributing: Vec<Quarter>,
        row_count: usize,
    },
    /// No earlier quarter holds any row; the EoS sheet was left untouched.
    NothingToAggregate,
}

/// Brings the EoS sheet of the workbook at `path` up to date after a
/// submission for `submitted`.
///
/// An EoS submission is passed through unchanged. Any other submission
/// recomputes EoS from whichever of SoS..Q3 currently exist, so resubmitting
/// an earlier quarter corrects EoS without replaying history. Failures leave
/// the EoS sheet as it was and are reported as [`CountsError::Aggregation`].
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), submitted = %submitted)
)]
pub fn resolve_eos(path: &Path, submitted: Quarter) -> Result<EosOutcome> {
    resolve(path, submitted).map_err(|error| CountsError::Aggregation(Box::new(error)))
}

fn resolve(path: &Path, submitted: Quarter) -> Result<EosOutcome> {
    let mut document = ShiftWorkbook::open(path)?;
    let eos_name = Quarter::EoS.as_str();

    if submitted.is_end_of_shift() {
        let table = document
            .sheet(eos_name)
            .cloned()
            .unwrap_or_else(|| SheetTable::new(eos_name));
        let row_count = table.rows.len();
        document.replace_sheet(table);
        document.commit()?;
        info!(row_count, "EoS counts passed through");
        return Ok(EosOutcome::Passthrough { row_count });
    }

    let mut contributing = Vec::new();
    let mut tables = Vec::new();
    for quarter in Quarter::CONTRIBUTING {
        if let Some(table) = document
            .sheet(quarter.as_str())
            .filter(|table| !table.is_empty())
        {
            contributing.push(quarter);
            tables.push(table);
        }
    }

    let combined = SheetTable::concat(eos_name, tables);
    if combined.is_empty() {
        debug!("no contributing rows, EoS left untouched");
        return Ok(EosOutcome::NothingToAggregate);
    }

    let rollup = aggregate_by_role(&combined)?;
    let row_count = rollup.rows.len();
    document.replace_sheet(rollup);
    document.commit()?;
    info!(row_count, contributing = contributing.len(), "EoS rollup written");
    Ok(EosOutcome::Aggregated {
        contributing,
        row_count,
    })
}

/// Collapses `table` to one row per role, in role order.
///
/// Reduction policy, column by column:
/// - identity columns (Role, Floor, Quarter) and any column holding a cell
///   that is not a count take the group's first cell verbatim;
/// - count columns sum the group, blank cells counting as zero. A count
///   column the role does not record according to the catalog stays blank.
///   A total above the largest accepted count is a
///   [`CountsError::CountOverflow`].
///
/// Rows without a role are ignored.
pub fn aggregate_by_role(table: &SheetTable) -> Result<SheetTable> {
    let role_index = table.column_index(ROLE_COLUMN).ok_or_else(|| {
        CountsError::InvalidWorkbook(format!(
            "sheet '{}' has no {ROLE_COLUMN} column",
            table.sheet_name
        ))
    })?;

    let summable: Vec<bool> = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            !matches!(column.as_str(), ROLE_COLUMN | FLOOR_COLUMN | QUARTER_COLUMN)
                && table
                    .rows
                    .iter()
                    .all(|row| parse_count(column, &row[index]).is_ok())
        })
        .collect();

    let mut groups: BTreeMap<String, Vec<&Vec<Cell>>> = BTreeMap::new();
    for row in &table.rows {
        let role = row[role_index].to_string().trim().to_string();
        if role.is_empty() {
            continue;
        }
        groups.entry(role).or_default().push(row);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (role, members) in groups {
        let kind = RoleKind::parse(&role);
        let mut cells = Vec::with_capacity(table.columns.len());
        for (index, column) in table.columns.iter().enumerate() {
            let cell = if index == role_index {
                Cell::text(role.clone())
            } else if summable[index] {
                let tracked = kind.is_none_or(|kind| {
                    kind.metrics().iter().any(|metric| *metric == column.as_str())
                });
                if tracked {
                    Cell::count(Some(sum_column(column, index, &members)?))
                } else {
                    Cell::Empty
                }
            } else {
                members[0][index].clone()
            };
            cells.push(cell);
        }
        rows.push(cells);
    }

    Ok(SheetTable {
        sheet_name: table.sheet_name.clone(),
        columns: table.columns.clone(),
        rows,
    })
}

fn sum_column(column: &str, index: usize, members: &[&Vec<Cell>]) -> Result<u64> {
    checked_total(
        column,
        members
            .iter()
            .filter_map(|row| parse_count(column, &row[index]).ok().flatten()),
    )
}
