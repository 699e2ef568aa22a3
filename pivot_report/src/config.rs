// ********* Input data structures ***********

use std::cmp::Ordering;
use std::error::Error;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// A scalar value read from a spreadsheet cell.
///
/// Equality is strict: values of different kinds never compare equal, so that
/// the integer `1` and the text `"1"` end up in different groups. Floating
/// point values are compared by bit pattern, which makes them usable as
/// grouping keys.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// A blank cell.
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A date or time, stored as the spreadsheet serial number.
    DateTime(f64),
}

impl CellValue {
    /// The text of a text cell. Other kinds, numbers included, have none.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    // Position of the kind in the total order.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Empty => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::DateTime(_) => 3,
            CellValue::Text(_) => 4,
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Text(s) => s.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) | CellValue::DateTime(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
        }
    }
}

/// Blank cells first, then booleans, numbers, dates and finally text.
/// Integers and floats are compared numerically; an integer sorts before a
/// float of the same numerical value.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.total_cmp(b),
            (CellValue::Int(a), CellValue::Float(b)) => {
                (*a as f64).total_cmp(b).then(Ordering::Less)
            }
            (CellValue::Float(a), CellValue::Int(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::DateTime(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A table of records as loaded from a spreadsheet.
///
/// The column labels are kept exactly as read. Lookups by name compare the
/// trimmed labels. Use the [`crate::builder::TableBuilder`] to construct one.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RecordTable {
    pub(crate) columns: Vec<String>,
    // Invariant: every row has exactly `columns.len()` cells.
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The position of the first column whose trimmed label is `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// The first `n` rows, with the same columns.
    pub fn head(&self, n: usize) -> RecordTable {
        RecordTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

// ******** Output data structures *********

/// The row key of the pivot table.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub document_id: CellValue,
    pub first_name: CellValue,
    pub last_name: CellValue,
}

impl IdentityKey {
    pub fn new(
        document_id: impl Into<CellValue>,
        first_name: impl Into<CellValue>,
        last_name: impl Into<CellValue>,
    ) -> IdentityKey {
        IdentityKey {
            document_id: document_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn values(&self) -> [&CellValue; 3] {
        [&self.document_id, &self.first_name, &self.last_name]
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PivotRow {
    pub key: IdentityKey,
    /// One count per pivot column, in the order of [`PivotTable::columns`].
    pub counts: Vec<u64>,
    pub total: u64,
}

/// The cross-tabulated counts, one row per person and one column per
/// status/competency pair, plus the total column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PivotTable {
    /// The names of the three identity columns forming the row index.
    pub index_names: Vec<String>,
    pub columns: Vec<String>,
    pub total_label: String,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All the labels of a materialized table: index names, pivot columns and total.
    pub fn header(&self) -> Vec<String> {
        let mut res = self.index_names.clone();
        res.extend(self.columns.iter().cloned());
        res.push(self.total_label.clone());
        res
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn row(&self, key: &IdentityKey) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.key == *key)
    }

    /// The count for a person and a column label. Returns None if either is unknown.
    pub fn count(&self, key: &IdentityKey, label: &str) -> Option<u64> {
        let idx = self.column_index(label)?;
        self.row(key).and_then(|r| r.counts.get(idx).cloned())
    }
}

/// Errors that prevent a pivot table from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ReportError {
    /// Required columns absent from the input, in their configured spelling.
    MissingColumns(Vec<String>),
    /// Any other failure while shaping the data.
    Processing(String),
}

impl Error for ReportError {}

impl Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::MissingColumns(cols) => {
                write!(f, "missing columns: {}", cols.join(", "))
            }
            ReportError::Processing(msg) => write!(f, "{}", msg),
        }
    }
}

// ********* Configuration **********

/// The order of the rows and of the pivot columns in the output.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum KeyOrder {
    /// Keys appear in the order in which they were first encountered.
    #[default]
    FirstSeen,
    /// Keys are sorted by value.
    Sorted,
}

/// The names of the required columns and the literal values used for
/// filtering.
///
/// The defaults match the exports of the training platform.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportSchema {
    pub document_id: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub competency: String,
    pub evaluation_judgment: String,
    /// A record is kept if its judgment is one of these values.
    pub accepted_judgments: Vec<String>,
    /// A record is kept if its status is exactly this value.
    pub in_training_status: String,
    pub total_label: String,
}

impl Default for ReportSchema {
    fn default() -> Self {
        ReportSchema {
            document_id: "Número de Documento".to_string(),
            first_name: "Nombre".to_string(),
            last_name: "Apellidos".to_string(),
            status: "Estado".to_string(),
            competency: "Competencia".to_string(),
            evaluation_judgment: "Juicio de Evaluación".to_string(),
            accepted_judgments: vec!["NO APROBADO".to_string(), "POR EVALUAR".to_string()],
            in_training_status: "EN FORMACION".to_string(),
            total_label: "Total General".to_string(),
        }
    }
}

impl ReportSchema {
    /// The required columns, in the order used when reporting missing columns.
    pub fn required_columns(&self) -> [&str; 6] {
        [
            self.document_id.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.status.as_str(),
            self.competency.as_str(),
            self.evaluation_judgment.as_str(),
        ]
    }

    pub fn index_names(&self) -> Vec<String> {
        vec![
            self.document_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
        ]
    }
}
