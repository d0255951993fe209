use shift_counts::CountsError;
use shift_counts::eos::{self, EosOutcome};
use shift_counts::io::excel_read;
use shift_counts::model::{Quarter, Record};
use shift_counts::table::{Cell, SheetTable};
use shift_counts::workbook::write_quarter_sheet;
use tempfile::tempdir;

fn record(quarter: Quarter, role: &str, values: &[(&str, u64)]) -> Record {
    let mut record = Record::new(quarter, role).expect("catalogued role");
    for (metric, value) in values {
        record.set(metric, Some(*value)).expect("tracked metric");
    }
    record
}

fn eos_sheet(path: &std::path::Path) -> SheetTable {
    excel_read::read_sheet(path, "EoS")
        .expect("workbook read")
        .expect("EoS sheet present")
}

fn row_of(sheet: &SheetTable, role: &str) -> usize {
    (0..sheet.rows.len())
        .find(|&index| sheet.cell(index, "Role") == Some(&Cell::text(role)))
        .unwrap_or_else(|| panic!("no EoS row for {role}"))
}

#[test]
fn eos_sums_every_submitted_quarter() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("shift.xlsx");

    write_quarter_sheet(
        &path,
        Quarter::SoS,
        &[
            record(Quarter::SoS, "Dock", &[("Headcount", 5)]),
            record(Quarter::SoS, "RSP (A2)", &[("Headcount", 2), ("Piles", 3)]),
        ],
    )
    .expect("SoS written");
    write_quarter_sheet(
        &path,
        Quarter::Q1,
        &[record(Quarter::Q1, "Dock", &[("Headcount", 7), ("Piles", 4)])],
    )
    .expect("Q1 written");
    write_quarter_sheet(
        &path,
        Quarter::Q2,
        &[record(Quarter::Q2, "RSP (A2)", &[("Piles", 10)])],
    )
    .expect("Q2 written");

    let outcome = eos::resolve_eos(&path, Quarter::Q2).expect("EoS resolved");
    assert_eq!(
        outcome,
        EosOutcome::Aggregated {
            contributing: vec![Quarter::SoS, Quarter::Q1, Quarter::Q2],
            row_count: 2,
        }
    );

    let sheet = eos_sheet(&path);
    assert!(!sheet.has_column("Quarter"));
    assert_eq!(sheet.rows.len(), 2);

    let dock = row_of(&sheet, "Dock");
    assert_eq!(sheet.cell(dock, "Headcount"), Some(&Cell::Number(12.0)));
    assert_eq!(sheet.cell(dock, "Piles"), Some(&Cell::Number(4.0)));
    assert_eq!(sheet.cell(dock, "NONCON"), Some(&Cell::Empty));

    let floor = row_of(&sheet, "RSP (A2)");
    assert_eq!(sheet.cell(floor, "Floor"), Some(&Cell::text("A2")));
    assert_eq!(sheet.cell(floor, "Headcount"), Some(&Cell::Number(2.0)));
    assert_eq!(sheet.cell(floor, "Piles"), Some(&Cell::Number(13.0)));
    assert_eq!(sheet.cell(floor, "Liquid Damages"), Some(&Cell::Empty));
}

#[test]
fn resubmitting_an_earlier_quarter_corrects_eos() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("shift.xlsx");

    write_quarter_sheet(&path, Quarter::SoS, &[record(Quarter::SoS, "IOL", &[("Headcount", 4)])])
        .expect("SoS written");
    write_quarter_sheet(&path, Quarter::Q1, &[record(Quarter::Q1, "IOL", &[("Headcount", 6)])])
        .expect("Q1 written");
    eos::resolve_eos(&path, Quarter::Q1).expect("EoS resolved");
    let sheet = eos_sheet(&path);
    assert_eq!(sheet.cell(0, "Headcount"), Some(&Cell::Number(10.0)));

    write_quarter_sheet(&path, Quarter::SoS, &[record(Quarter::SoS, "IOL", &[("Headcount", 1)])])
        .expect("SoS resubmitted");
    eos::resolve_eos(&path, Quarter::SoS).expect("EoS resolved again");
    let sheet = eos_sheet(&path);
    assert_eq!(sheet.rows.len(), 1);
    assert_eq!(sheet.cell(0, "Headcount"), Some(&Cell::Number(7.0)));
}

#[test]
fn eos_submission_passes_through_unchanged() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("shift.xlsx");

    write_quarter_sheet(&path, Quarter::SoS, &[record(Quarter::SoS, "GK", &[("Headcount", 9)])])
        .expect("SoS written");
    write_quarter_sheet(
        &path,
        Quarter::EoS,
        &[
            record(Quarter::EoS, "GK", &[("Headcount", 3)]),
            record(Quarter::EoS, "Damageland", &[("Backlog", 40)]),
        ],
    )
    .expect("EoS written");

    let first = eos::resolve_eos(&path, Quarter::EoS).expect("first pass");
    let after_first = eos_sheet(&path);
    let second = eos::resolve_eos(&path, Quarter::EoS).expect("second pass");
    let after_second = eos_sheet(&path);

    assert_eq!(first, EosOutcome::Passthrough { row_count: 2 });
    assert_eq!(first, second);
    assert_eq!(after_first, after_second);
    assert_eq!(after_first.cell(0, "Role"), Some(&Cell::text("GK")));
    assert_eq!(after_first.cell(0, "Headcount"), Some(&Cell::Number(3.0)));
    assert!(!after_first.has_column("Quarter"));
}

#[test]
fn empty_quarters_leave_eos_untouched() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("shift.xlsx");

    write_quarter_sheet(&path, Quarter::Q3, &[]).expect("empty Q3 written");
    let outcome = eos::resolve_eos(&path, Quarter::Q3).expect("EoS resolved");

    assert_eq!(outcome, EosOutcome::NothingToAggregate);
    assert!(eos_sheet(&path).is_empty());
}

#[test]
fn missing_workbook_is_an_aggregation_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("absent.xlsx");

    let error = eos::resolve_eos(&path, Quarter::Q1).unwrap_err();
    assert!(matches!(error, CountsError::Aggregation(_)));
    assert!(!path.exists());
}

#[test]
fn only_quarters_with_rows_contribute() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("shift.xlsx");

    write_quarter_sheet(&path, Quarter::Q1, &[record(Quarter::Q1, "GK", &[("Headcount", 2)])])
        .expect("Q1 written");
    let outcome = eos::resolve_eos(&path, Quarter::Q1).expect("EoS resolved");

    assert_eq!(
        outcome,
        EosOutcome::Aggregated {
            contributing: vec![Quarter::Q1],
            row_count: 1,
        }
    );
}

#[test]
fn oversized_totals_fail_instead_of_wrapping() {
    let row = || {
        vec![
            ("Role".to_string(), Cell::text("Dock")),
            ("Headcount".to_string(), Cell::text("9000000000000000000")),
        ]
    };
    let table = SheetTable::from_keyed_rows("EoS", vec![row(), row()]);

    let error = eos::aggregate_by_role(&table).unwrap_err();
    assert!(matches!(error, CountsError::CountOverflow { ref column } if column == "Headcount"));
}

#[test]
fn counts_beyond_the_limit_are_not_summed() {
    let table = SheetTable::from_keyed_rows(
        "EoS",
        vec![
            vec![
                ("Role".to_string(), Cell::text("Dock")),
                ("Headcount".to_string(), Cell::text("18446744073709551000")),
            ],
            vec![
                ("Role".to_string(), Cell::text("Dock")),
                ("Headcount".to_string(), Cell::text("18446744073709551000")),
            ],
        ],
    );

    let rollup = eos::aggregate_by_role(&table).expect("rollup");
    assert_eq!(
        rollup.cell(0, "Headcount"),
        Some(&Cell::text("18446744073709551000"))
    );
}

#[test]
fn text_columns_keep_the_first_value() {
    let table = SheetTable::from_keyed_rows(
        "EoS",
        vec![
            vec![
                ("Role".to_string(), Cell::text("Dock")),
                ("Notes".to_string(), Cell::text("late truck")),
                ("Headcount".to_string(), Cell::Number(2.0)),
            ],
            vec![
                ("Role".to_string(), Cell::text("Dock")),
                ("Notes".to_string(), Cell::text("on time")),
                ("Headcount".to_string(), Cell::Empty),
            ],
            vec![
                ("Role".to_string(), Cell::Empty),
                ("Notes".to_string(), Cell::text("stray")),
                ("Headcount".to_string(), Cell::Number(50.0)),
            ],
        ],
    );

    let rollup = eos::aggregate_by_role(&table).expect("rollup");
    assert_eq!(rollup.rows.len(), 1);
    assert_eq!(rollup.cell(0, "Notes"), Some(&Cell::text("late truck")));
    assert_eq!(rollup.cell(0, "Headcount"), Some(&Cell::Number(2.0)));
}
