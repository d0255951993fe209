use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::io::store::record_from_json;
use crate::shift::counts::model::catalog::{
    HEADCOUNT, OTHER_ROLES, PILES, RSP_FLOORS, RoleKind,
};
use crate::shift::counts::model::{Quarter, Record, checked_total};

/// Counts entered for one quarter, laid out like the entry form.
///
/// Every value is optional; an absent entry is "not reported". Totals are
/// derived by [`ShiftForm::into_records`] and are never entered directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShiftForm {
    /// Floor code → metric → value.
    pub rsp: BTreeMap<String, BTreeMap<String, Option<u64>>>,
    /// Dock metric → value.
    pub dock: BTreeMap<String, Option<u64>>,
    /// Damageland metric → value.
    pub damageland: BTreeMap<String, Option<u64>>,
    /// Other role → headcount.
    pub other: BTreeMap<String, Option<u64>>,
}

impl ShiftForm {
    /// Builds the submission batch in form order: the six floors, the RSP
    /// piles and headcount totals, Dock, Damageland, the other roles and the
    /// non-RSP headcount total. Unreported values count as zero in totals.
    pub fn into_records(&self, quarter: Quarter) -> Result<Vec<Record>> {
        for floor in self.rsp.keys() {
            if !RSP_FLOORS.iter().any(|code| *code == floor.as_str()) {
                return Err(CountsError::UnknownRole(format!("RSP ({floor})")));
            }
        }
        for role in self.other.keys() {
            if !OTHER_ROLES.iter().any(|name| *name == role.as_str()) {
                return Err(CountsError::UnknownRole(role.clone()));
            }
        }

        let mut records = Vec::new();
        let empty = BTreeMap::new();

        for floor in RSP_FLOORS {
            let values = self.rsp.get(floor).unwrap_or(&empty);
            records.push(fill(Record::for_kind(quarter, RoleKind::RspFloor(floor)), values)?);
        }

        let floor_piles = total(&records, PILES)?;
        let floor_headcount = total(&records, HEADCOUNT)?;
        records.push(Record::for_kind(quarter, RoleKind::RspTotal).with(PILES, Some(floor_piles))?);
        records.push(
            Record::for_kind(quarter, RoleKind::RspHeadcountTotal)
                .with(HEADCOUNT, Some(floor_headcount))?,
        );

        let dock = fill(Record::for_kind(quarter, RoleKind::Dock), &self.dock)?;
        let damageland = fill(Record::for_kind(quarter, RoleKind::Damageland), &self.damageland)?;
        let non_rsp_start = records.len();
        records.push(dock);
        records.push(damageland);

        for role in OTHER_ROLES {
            let headcount = self.other.get(role).copied().flatten();
            records.push(Record::for_kind(quarter, RoleKind::Other(role)).with(HEADCOUNT, headcount)?);
        }

        let non_rsp_headcount = total(&records[non_rsp_start..], HEADCOUNT)?;
        records.push(
            Record::for_kind(quarter, RoleKind::NonRspHeadcountTotal)
                .with(HEADCOUNT, Some(non_rsp_headcount))?,
        );

        Ok(records)
    }
}

fn fill(mut record: Record, values: &BTreeMap<String, Option<u64>>) -> Result<Record> {
    for (metric, value) in values {
        record.set(metric, *value)?;
    }
    Ok(record)
}

fn total(records: &[Record], metric: &str) -> Result<u64> {
    checked_total(metric, records.iter().filter_map(|record| record.get(metric)))
}

/// Reads a submission batch from JSON: either a list of flat records
/// (`{"Role": .., "Headcount": ..}`) or a [`ShiftForm`] object.
pub fn records_from_json(quarter: Quarter, json: &Value) -> Result<Vec<Record>> {
    match json {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => record_from_json(quarter, "", fields),
                _ => Err(CountsError::InvalidBatch(
                    "expected a JSON object for each record".into(),
                )),
            })
            .collect(),
        Value::Object(_) => {
            let form: ShiftForm = serde_json::from_value(json.clone())?;
            form.into_records(quarter)
        }
        _ => Err(CountsError::InvalidBatch(
            "expected a list of records or a form object".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::counts::model::catalog::{NON_RSP_HEADCOUNT_TOTAL, RSP_HEADCOUNT_TOTAL, RSP_TOTAL};

    #[test]
    fn form_derives_totals() {
        let json = serde_json::json!({
            "rsp": {
                "A2": {"Headcount": 2, "Piles": 10},
                "B4": {"Headcount": 1, "Piles": 5, "LAF": null}
            },
            "dock": {"Headcount": 4},
            "damageland": {"Headcount": 3, "Backlog": 20},
            "other": {"IOL": 2, "GK": null}
        });

        let records = records_from_json(Quarter::Q1, &json).expect("form accepted");
        let find = |role: &str| {
            records
                .iter()
                .find(|record| record.role() == role)
                .expect("role present")
        };

        assert_eq!(records.len(), 15);
        assert_eq!(find(RSP_TOTAL).get(PILES), Some(15));
        assert_eq!(find(RSP_HEADCOUNT_TOTAL).get(HEADCOUNT), Some(3));
        assert_eq!(find(NON_RSP_HEADCOUNT_TOTAL).get(HEADCOUNT), Some(9));
        assert_eq!(find("RSP (A3)").get(HEADCOUNT), None);
        assert_eq!(find("GK").get(HEADCOUNT), None);
    }

    #[test]
    fn oversized_floor_totals_are_rejected() {
        let json = serde_json::json!({
            "rsp": {
                "A2": {"Piles": 9_000_000_000_000_000_000u64},
                "A3": {"Piles": 9_000_000_000_000_000_000u64}
            }
        });
        let error = records_from_json(Quarter::Q1, &json).unwrap_err();
        assert!(matches!(error, CountsError::CountOverflow { .. }));
    }

    #[test]
    fn form_rejects_unknown_floor() {
        let json = serde_json::json!({"rsp": {"C1": {"Piles": 1}}});
        let error = records_from_json(Quarter::SoS, &json).unwrap_err();
        assert!(matches!(error, CountsError::UnknownRole(_)));
    }

    #[test]
    fn record_list_is_validated() {
        let json = serde_json::json!([{"Role": "Dock", "Headcount": 5}]);
        let records = records_from_json(Quarter::Q2, &json).expect("records accepted");
        assert_eq!(records[0].get(HEADCOUNT), Some(5));

        let json = serde_json::json!([{"Role": "Dock", "Headcount": "five"}]);
        assert!(records_from_json(Quarter::Q2, &json).is_err());
    }
}
