use serde_json::json;
use shift_counts::batch;
use shift_counts::config::EngineConfig;
use shift_counts::eos::EosOutcome;
use shift_counts::io::excel_read;
use shift_counts::model::{Dataset, Quarter, ShiftDate, ShiftType};
use shift_counts::sync;
use shift_counts::table::Cell;
use shift_counts::workbook::{FIXED_SHEETS, ShiftWorkbook};
use tempfile::tempdir;

#[test]
fn submission_updates_workbook_and_store() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EngineConfig::with_base_dir(temp_dir.path());
    let store = config.store();
    let date: ShiftDate = "2024-05-01".parse().expect("valid date");
    let mut dataset = Dataset::new();

    let sos = batch::records_from_json(
        Quarter::SoS,
        &json!({
            "rsp": {"A2": {"Headcount": 2, "Piles": 10}},
            "dock": {"Headcount": 4},
            "other": {"IOL": 1}
        }),
    )
    .expect("SoS form accepted");
    let report = sync::submit(
        &config,
        date,
        ShiftType::Day,
        Quarter::SoS,
        sos,
        &mut dataset,
        &store,
    )
    .expect("SoS submitted");

    assert!(report.is_complete(), "failures: {:?}", report.failures());
    assert_eq!(report.record_count, 15);
    assert_eq!(
        report.document,
        temp_dir
            .path()
            .join("exports/2024-05-01/InboundPS_Days2024-05-01.xlsx")
    );
    assert!(matches!(report.eos, Ok(EosOutcome::Aggregated { .. })));
    assert_eq!(report.change_log.as_ref().ok(), Some(&15));

    let q1 = batch::records_from_json(
        Quarter::Q1,
        &json!([
            {"Role": "RSP (A2)", "Floor": "A2", "Piles": 5},
            {"Role": "Dock", "Headcount": 6}
        ]),
    )
    .expect("Q1 records accepted");
    let report = sync::submit(
        &config,
        date,
        ShiftType::Day,
        Quarter::Q1,
        q1,
        &mut dataset,
        &store,
    )
    .expect("Q1 submitted");
    assert!(report.is_complete(), "failures: {:?}", report.failures());

    let document = ShiftWorkbook::open(&report.document).expect("workbook opened");
    let names: Vec<&str> = document.sheet_names().collect();
    assert_eq!(names, FIXED_SHEETS.to_vec());

    let eos = excel_read::read_sheet(&report.document, "EoS")
        .expect("workbook read")
        .expect("EoS sheet present");
    let dock = (0..eos.rows.len())
        .find(|&row| eos.cell(row, "Role") == Some(&Cell::text("Dock")))
        .expect("Dock row");
    assert_eq!(eos.cell(dock, "Headcount"), Some(&Cell::Number(10.0)));
    let floor = (0..eos.rows.len())
        .find(|&row| eos.cell(row, "Role") == Some(&Cell::text("RSP (A2)")))
        .expect("RSP (A2) row");
    assert_eq!(eos.cell(floor, "Piles"), Some(&Cell::Number(15.0)));

    let changes = excel_read::read_sheet(&report.document, "Shift Changes")
        .expect("workbook read")
        .expect("Shift Changes sheet present");
    assert_eq!(changes.columns[0], "Quarter");
    assert_eq!(changes.rows.len(), 17);
    assert_eq!(changes.cell(0, "Quarter"), Some(&Cell::text("SoS")));
    assert_eq!(changes.cell(16, "Quarter"), Some(&Cell::text("Q1")));

    assert_eq!(store.try_load().expect("store readable"), dataset);
    assert_eq!(dataset.len(), 17);
}

#[test]
fn invalid_batch_changes_nothing() {
    let temp_dir = tempdir().expect("temporary directory");
    let config = EngineConfig::with_base_dir(temp_dir.path());
    let store = config.store();
    let date: ShiftDate = "2024-05-02".parse().expect("valid date");
    let mut dataset = Dataset::new();

    let dock = batch::records_from_json(Quarter::Q2, &json!([{"Role": "Dock", "Headcount": 1}]))
        .expect("records accepted");
    let mistagged = batch::records_from_json(Quarter::Q3, &json!([{"Role": "GK", "Headcount": 1}]))
        .expect("records accepted");
    let records = dock.into_iter().chain(mistagged).collect();

    let result = sync::submit(
        &config,
        date,
        ShiftType::Night,
        Quarter::Q2,
        records,
        &mut dataset,
        &store,
    );

    assert!(result.is_err());
    assert!(dataset.is_empty());
    assert!(!store.path().exists());
    assert!(!config.document_path(date, ShiftType::Night).exists());
}
