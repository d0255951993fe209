use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::shift::counts::error::{CountsError, Result};
use crate::shift::counts::table::Cell;

pub mod catalog;

pub use catalog::RoleKind;

/// Column holding the role identifier.
pub const ROLE_COLUMN: &str = "Role";
/// Column holding the RSP floor code.
pub const FLOOR_COLUMN: &str = "Floor";
/// Column holding the quarter label; only the change log carries it.
pub const QUARTER_COLUMN: &str = "Quarter";

/// Sort rank given to quarter labels outside the tracked set.
pub const UNKNOWN_QUARTER_RANK: u8 = 99;

/// Largest count accepted anywhere. The difference of two counts always fits
/// in an `i64`.
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// One phase of the tracked shift, from start to end of shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Quarter {
    SoS,
    Q1,
    Q2,
    Q3,
    EoS,
}

impl Quarter {
    /// Every quarter in shift order.
    pub const ALL: [Quarter; 5] = [
        Quarter::SoS,
        Quarter::Q1,
        Quarter::Q2,
        Quarter::Q3,
        Quarter::EoS,
    ];

    /// Quarters whose sheets roll up into the EoS sheet.
    pub const CONTRIBUTING: [Quarter; 4] = [Quarter::SoS, Quarter::Q1, Quarter::Q2, Quarter::Q3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quarter::SoS => "SoS",
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::EoS => "EoS",
        }
    }

    /// Position of the quarter in the shift, starting at 1.
    pub fn rank(&self) -> u8 {
        match self {
            Quarter::SoS => 1,
            Quarter::Q1 => 2,
            Quarter::Q2 => 3,
            Quarter::Q3 => 4,
            Quarter::EoS => 5,
        }
    }

    pub fn is_end_of_shift(&self) -> bool {
        *self == Quarter::EoS
    }
}

/// Sort rank of an untyped quarter label, such as a Quarter cell read from
/// an externally authored sheet; unrecognised labels sort last.
pub fn quarter_rank(label: &str) -> u8 {
    label
        .parse::<Quarter>()
        .map(|quarter| quarter.rank())
        .unwrap_or(UNKNOWN_QUARTER_RANK)
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quarter {
    type Err = CountsError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        Quarter::ALL
            .into_iter()
            .find(|quarter| quarter.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CountsError::UnknownQuarter(value.to_string()))
    }
}

/// Day or night shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftType {
    Day,
    Night,
}

impl ShiftType {
    /// Label used in workbook file names.
    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Day => "Days",
            ShiftType::Night => "Nights",
        }
    }
}

impl FromStr for ShiftType {
    type Err = CountsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(ShiftType::Day),
            "night" | "nights" => Ok(ShiftType::Night),
            _ => Err(CountsError::UnknownShiftType(value.to_string())),
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Day => f.write_str("day"),
            ShiftType::Night => f.write_str("night"),
        }
    }
}

/// Calendar date of a shift, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShiftDate(NaiveDate);

impl ShiftDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for ShiftDate {
    type Err = CountsError;

    fn from_str(value: &str) -> Result<Self> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(ShiftDate)
            .map_err(|_| CountsError::InvalidDate(value.to_string()))
    }
}

impl fmt::Display for ShiftDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Parses an optional non-negative integer count.
///
/// Blank cells and whitespace-only text are "not reported" and yield `None`,
/// which is distinct from an explicit zero. Integral non-negative numbers and
/// digit-only text up to [`MAX_COUNT`] yield `Some`; anything else is
/// rejected.
pub fn parse_count(column: &str, cell: &Cell) -> Result<Option<u64>> {
    let invalid = || CountsError::InvalidCount {
        column: column.to_string(),
        value: cell.to_string(),
    };

    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(value) => {
            if value.is_finite() && *value >= 0.0 && value.fract() == 0.0 && *value < MAX_COUNT as f64
            {
                Ok(Some(*value as u64))
            } else {
                Err(invalid())
            }
        }
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
                match trimmed.parse::<u64>() {
                    Ok(count) if count <= MAX_COUNT => Ok(Some(count)),
                    _ => Err(invalid()),
                }
            } else {
                Err(invalid())
            }
        }
    }
}

/// Adds up counts of one column, failing instead of wrapping when the total
/// exceeds [`MAX_COUNT`].
pub fn checked_total<I>(column: &str, counts: I) -> Result<u64>
where
    I: IntoIterator<Item = u64>,
{
    counts
        .into_iter()
        .try_fold(0u64, |total, count| {
            total.checked_add(count).filter(|sum| *sum <= MAX_COUNT)
        })
        .ok_or_else(|| CountsError::CountOverflow {
            column: column.to_string(),
        })
}

/// One observation: the counts of a role during one quarter.
///
/// Records are validated on construction: the role must be part of the
/// catalog and only the metrics declared for the role may carry values. The
/// metric list always holds the full declared set, in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    quarter: Quarter,
    role: String,
    kind: RoleKind,
    metrics: Vec<(&'static str, Option<u64>)>,
}

impl Record {
    /// Creates a record for a catalogued role with every metric unreported.
    pub fn new(quarter: Quarter, role: &str) -> Result<Self> {
        let kind = RoleKind::parse(role).ok_or_else(|| CountsError::UnknownRole(role.to_string()))?;
        Ok(Self::for_kind(quarter, kind))
    }

    pub fn for_kind(quarter: Quarter, kind: RoleKind) -> Self {
        Self {
            quarter,
            role: kind.role_name(),
            kind,
            metrics: kind.metrics().iter().map(|metric| (*metric, None)).collect(),
        }
    }

    /// Builds a record from `(field, cell)` pairs as found in a sheet row or a
    /// stored record. The `Quarter` field is ignored in favour of `quarter`.
    pub fn from_fields<'a, I>(quarter: Quarter, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a Cell)>,
    {
        let fields: Vec<(&str, &Cell)> = fields.into_iter().collect();

        let role = fields
            .iter()
            .find(|(name, _)| *name == ROLE_COLUMN)
            .map(|(_, cell)| cell.to_string())
            .ok_or_else(|| CountsError::InvalidBatch("record without a Role field".into()))?;
        let mut record = Record::new(quarter, role.trim())?;

        for (name, cell) in fields {
            match name {
                ROLE_COLUMN | QUARTER_COLUMN => {}
                FLOOR_COLUMN => {
                    let floor = cell.to_string();
                    let floor = floor.trim();
                    if !floor.is_empty() && floor != record.floor() {
                        return Err(CountsError::FloorMismatch {
                            role: record.role.clone(),
                            floor: floor.to_string(),
                        });
                    }
                }
                metric => {
                    let value = parse_count(metric, cell)?;
                    // Rollups of mixed roles carry 0 in columns a role does not record.
                    if value == Some(0) && !record.tracks(metric) {
                        continue;
                    }
                    record.set(metric, value)?;
                }
            }
        }

        Ok(record)
    }

    /// Sets a metric value. Unknown metrics are rejected unless the value is
    /// unreported, and so are values above [`MAX_COUNT`].
    pub fn set(&mut self, metric: &str, value: Option<u64>) -> Result<()> {
        if let Some(count) = value.filter(|count| *count > MAX_COUNT) {
            return Err(CountsError::InvalidCount {
                column: metric.to_string(),
                value: count.to_string(),
            });
        }
        match self.metrics.iter_mut().find(|(name, _)| *name == metric) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None if value.is_none() => Ok(()),
            None => Err(CountsError::UnknownMetric {
                role: self.role.clone(),
                metric: metric.to_string(),
            }),
        }
    }

    /// Whether `metric` belongs to the role's metric set.
    pub fn tracks(&self, metric: &str) -> bool {
        self.metrics.iter().any(|(name, _)| *name == metric)
    }

    /// Builder-style variant of [`Record::set`].
    pub fn with(mut self, metric: &str, value: Option<u64>) -> Result<Self> {
        self.set(metric, value)?;
        Ok(self)
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn kind(&self) -> RoleKind {
        self.kind
    }

    pub fn floor(&self) -> &'static str {
        self.kind.floor()
    }

    /// Declared metrics with their values, in declared order.
    pub fn metrics(&self) -> &[(&'static str, Option<u64>)] {
        &self.metrics
    }

    /// Value of a metric; `None` when unreported or not tracked.
    pub fn get(&self, metric: &str) -> Option<u64> {
        self.metrics
            .iter()
            .find(|(name, _)| *name == metric)
            .and_then(|(_, value)| *value)
    }

    /// Re-tags the record for another quarter.
    pub fn in_quarter(mut self, quarter: Quarter) -> Self {
        self.quarter = quarter;
        self
    }

    /// Tabular form used by the quarter sheets: `Role, Floor, <metrics>`.
    pub fn to_keyed_row(&self) -> Vec<(String, Cell)> {
        let mut row = Vec::with_capacity(self.metrics.len() + 2);
        row.push((ROLE_COLUMN.to_string(), Cell::text(self.role.clone())));
        row.push((FLOOR_COLUMN.to_string(), Cell::text(self.floor())));
        for (metric, value) in &self.metrics {
            row.push(((*metric).to_string(), Cell::count(*value)));
        }
        row
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.metrics.len() + 2))?;
        map.serialize_entry(ROLE_COLUMN, &self.role)?;
        map.serialize_entry(FLOOR_COLUMN, self.floor())?;
        for (metric, value) in &self.metrics {
            map.serialize_entry(metric, value)?;
        }
        map.end()
    }
}

/// Records of a single quarter keyed by role.
pub type QuarterRecords = BTreeMap<String, Record>;

/// Every record known for the current shift, keyed by quarter then role.
///
/// Quarters iterate in shift order and roles in lexicographic order, which
/// keeps every derived view deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    quarters: BTreeMap<Quarter, QuarterRecords>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.values().all(BTreeMap::is_empty)
    }

    /// Total number of records across all quarters.
    pub fn len(&self) -> usize {
        self.quarters.values().map(BTreeMap::len).sum()
    }

    pub fn contains_quarter(&self, quarter: Quarter) -> bool {
        self.quarters.contains_key(&quarter)
    }

    pub fn quarter(&self, quarter: Quarter) -> Option<&QuarterRecords> {
        self.quarters.get(&quarter)
    }

    pub fn record(&self, quarter: Quarter, role: &str) -> Option<&Record> {
        self.quarters.get(&quarter).and_then(|roles| roles.get(role))
    }

    /// Stores a record, superseding any earlier record of the same quarter and
    /// role. Returns the superseded record.
    pub fn upsert(&mut self, record: Record) -> Option<Record> {
        self.quarters
            .entry(record.quarter())
            .or_default()
            .insert(record.role().to_string(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Quarter, &QuarterRecords)> {
        self.quarters.iter().map(|(quarter, roles)| (*quarter, roles))
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for record in iter {
            dataset.upsert(record);
        }
        dataset
    }
}
