/*!

Cross-tabulation of training-evaluation records.

The input is a [`RecordTable`] holding one evaluation per row: a person
(document number, first name, last name), their training status, a
competency and the judgment for that competency. The records still in
training with a failing or pending judgment are counted per person and per
status/competency pair, and a total column is appended.

```
use pivot_report::builder::{PivotReportBuilder, TableBuilder};
use pivot_report::*;

let mut tb = TableBuilder::new(&ReportSchema::default().required_columns());
tb.add_row(vec![
    CellValue::Int(1),
    "Ana".into(),
    "Pérez".into(),
    "EN FORMACION".into(),
    "Inglés".into(),
    "POR EVALUAR".into(),
])?;
let table = PivotReportBuilder::new(&ReportSchema::default()).build(&tb.build())?;

let key = IdentityKey::new(1i64, "Ana", "Pérez");
assert_eq!(table.count(&key, "EN FORMACION Inglés"), Some(1));
assert_eq!(table.rows[0].total, 1);
# Ok::<(), ReportError>(())
```
*/

mod config;
use log::{debug, info};

use std::collections::HashMap;

pub mod builder;
pub mod manual;

pub use crate::config::*;

// **** Private structures ****

// Positions of the required columns, resolved once per table.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ColumnPositions {
    document_id: usize,
    first_name: usize,
    last_name: usize,
    status: usize,
    competency: usize,
    evaluation_judgment: usize,
}

// A typed view of one input row.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct EvaluationRecord<'a> {
    identity: IdentityRef<'a>,
    pair: PairRef<'a>,
    judgment: &'a CellValue,
}

type IdentityRef<'a> = (&'a CellValue, &'a CellValue, &'a CellValue);

// (status, competency)
type PairRef<'a> = (&'a CellValue, &'a CellValue);

impl ColumnPositions {
    fn record<'a>(&self, row: &'a [CellValue]) -> EvaluationRecord<'a> {
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY);
        EvaluationRecord {
            identity: (
                cell(self.document_id),
                cell(self.first_name),
                cell(self.last_name),
            ),
            pair: (cell(self.status), cell(self.competency)),
            judgment: cell(self.evaluation_judgment),
        }
    }
}

static EMPTY: CellValue = CellValue::Empty;

impl<'a> EvaluationRecord<'a> {
    // Exact, case-sensitive comparisons. Only text cells can match.
    fn is_selected(&self, schema: &ReportSchema) -> bool {
        let status_ok = self.pair.0.as_text() == Some(schema.in_training_status.as_str());
        let judgment_ok = match self.judgment.as_text() {
            Some(j) => schema.accepted_judgments.iter().any(|a| a == j),
            None => false,
        };
        status_ok && judgment_ok
    }
}

// Assigns dense ids to keys in the order they are first seen.
struct KeyIndex<K> {
    ids: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K: Eq + std::hash::Hash + Copy> KeyIndex<K> {
    fn new() -> KeyIndex<K> {
        KeyIndex {
            ids: HashMap::new(),
            keys: Vec::new(),
        }
    }

    fn id(&mut self, key: K) -> usize {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = self.keys.len();
        self.ids.insert(key, id);
        self.keys.push(key);
        id
    }

    // The ids in output order.
    fn ordering<F: Fn(&K, &K) -> std::cmp::Ordering>(&self, order: KeyOrder, cmp: F) -> Vec<usize> {
        let mut res: Vec<usize> = (0..self.keys.len()).collect();
        if order == KeyOrder::Sorted {
            res.sort_by(|a, b| cmp(&self.keys[*a], &self.keys[*b]));
        }
        res
    }
}

/// Checks that all the required columns are present and finds their positions.
///
/// Column labels are compared after trimming. The missing columns are
/// reported in the order of [`ReportSchema::required_columns`].
fn resolve_columns(
    records: &RecordTable,
    schema: &ReportSchema,
) -> Result<ColumnPositions, ReportError> {
    let required = schema.required_columns();
    let found: Vec<Option<usize>> = required
        .iter()
        .map(|name| records.column_index(name))
        .collect();
    let missing: Vec<String> = required
        .iter()
        .zip(found.iter())
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::MissingColumns(missing));
    }
    let positions: Vec<usize> = found.into_iter().flatten().collect();
    match positions.as_slice() {
        [document_id, first_name, last_name, status, competency, evaluation_judgment] => {
            Ok(ColumnPositions {
                document_id: *document_id,
                first_name: *first_name,
                last_name: *last_name,
                status: *status,
                competency: *competency,
                evaluation_judgment: *evaluation_judgment,
            })
        }
        _ => Err(ReportError::Processing(format!(
            "could not resolve the required columns {:?}",
            required
        ))),
    }
}

fn pair_label(status: &CellValue, competency: &CellValue) -> String {
    format!("{} {}", status, competency).trim().to_string()
}

/// Filters the records and builds the pivot table of evaluation counts.
///
/// Arguments:
/// * `records` the loaded table. Its column labels may carry surrounding whitespace.
/// * `schema` the names of the required columns and the filtering values
/// * `order` the order of the output rows and columns
///
/// The output is dense: a person without any record for a column gets a count of 0.
pub fn build_pivot(
    records: &RecordTable,
    schema: &ReportSchema,
    order: KeyOrder,
) -> Result<PivotTable, ReportError> {
    info!(
        "Processing {:?} records with {:?} columns",
        records.len(),
        records.columns().len()
    );
    let positions = resolve_columns(records, schema)?;
    debug!("build_pivot: resolved columns: {:?}", positions);

    let mut identities: KeyIndex<IdentityRef> = KeyIndex::new();
    let mut pairs: KeyIndex<PairRef> = KeyIndex::new();
    // (identity id, pair id) -> count
    let mut cells: HashMap<(usize, usize), u64> = HashMap::new();
    let mut num_selected: usize = 0;

    for row in records.rows() {
        let rec = positions.record(row);
        if !rec.is_selected(schema) {
            continue;
        }
        num_selected += 1;
        let row_id = identities.id(rec.identity);
        let col_id = pairs.id(rec.pair);
        *cells.entry((row_id, col_id)).or_insert(0) += 1;
    }

    info!(
        "Selected {:?} records: {:?} people, {:?} columns",
        num_selected,
        identities.keys.len(),
        pairs.keys.len()
    );

    let col_order = pairs.ordering(order, |a, b| a.cmp(b));
    let row_order = identities.ordering(order, |a, b| a.cmp(b));

    let columns: Vec<String> = col_order
        .iter()
        .map(|id| {
            let (status, competency) = pairs.keys[*id];
            pair_label(status, competency)
        })
        .collect();
    debug!("build_pivot: columns: {:?}", columns);

    let rows: Vec<PivotRow> = row_order
        .iter()
        .map(|row_id| {
            let (document_id, first_name, last_name) = identities.keys[*row_id];
            let counts: Vec<u64> = col_order
                .iter()
                .map(|col_id| cells.get(&(*row_id, *col_id)).cloned().unwrap_or(0))
                .collect();
            let total = counts.iter().sum();
            PivotRow {
                key: IdentityKey {
                    document_id: document_id.clone(),
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                },
                counts,
                total,
            }
        })
        .collect();

    Ok(PivotTable {
        index_names: schema.index_names(),
        columns,
        total_label: schema.total_label.clone(),
        rows,
    })
}
