pub use crate::config::*;

/// A builder for assembling a table of records row by row.
///
/// ```
/// use pivot_report::builder::TableBuilder;
/// use pivot_report::*;
///
/// let mut builder = TableBuilder::new(&["Nombre", "Competencia"]);
/// builder.add_row(vec!["Ana".into(), "Inglés".into()])?;
/// // Short rows are completed with blank cells.
/// builder.add_row(vec!["Luis".into()])?;
///
/// let table = builder.build();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.cell(1, 1), &CellValue::Empty);
/// # Ok::<(), ReportError>(())
/// ```
pub struct TableBuilder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _rows: Vec<Vec<CellValue>>,
}

impl TableBuilder {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> TableBuilder {
        TableBuilder {
            _columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            _rows: Vec::new(),
        }
    }

    /// Adds a row of cells, in the order of the columns.
    ///
    /// A row with fewer cells than columns is padded with blank cells. A row
    /// with more cells than columns is rejected.
    pub fn add_row(&mut self, mut cells: Vec<CellValue>) -> Result<(), ReportError> {
        let num_columns = self._columns.len();
        if cells.len() > num_columns {
            return Err(ReportError::Processing(format!(
                "row {} has {} cells but the table only has {} columns",
                self._rows.len() + 1,
                cells.len(),
                num_columns
            )));
        }
        cells.resize(num_columns, CellValue::Empty);
        self._rows.push(cells);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self._rows.len()
    }

    pub fn build(self) -> RecordTable {
        RecordTable {
            columns: self._columns,
            rows: self._rows,
        }
    }
}

/// Builds the pivot table of the evaluations still pending for each person.
///
/// The builder holds the configuration only. It can be reused for any
/// number of tables.
#[derive(Debug, Clone)]
pub struct PivotReportBuilder {
    pub(crate) _schema: ReportSchema,
    pub(crate) _order: KeyOrder,
}

impl PivotReportBuilder {
    pub fn new(schema: &ReportSchema) -> PivotReportBuilder {
        PivotReportBuilder {
            _schema: schema.clone(),
            _order: KeyOrder::FirstSeen,
        }
    }

    pub fn key_order(self, order: KeyOrder) -> PivotReportBuilder {
        PivotReportBuilder {
            _schema: self._schema,
            _order: order,
        }
    }

    /// Validates the columns of the table, filters the records and counts them.
    ///
    /// Fails with [`ReportError::MissingColumns`] if any required column is
    /// absent after trimming the column labels.
    pub fn build(&self, records: &RecordTable) -> Result<PivotTable, ReportError> {
        crate::build_pivot(records, &self._schema, self._order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_long_rows() {
        let mut builder = TableBuilder::new(&["a", "b"]);
        builder.add_row(vec!["1".into(), "2".into()]).unwrap();
        let res = builder.add_row(vec!["1".into(), "2".into(), "3".into()]);
        assert_eq!(
            res,
            Err(ReportError::Processing(
                "row 2 has 3 cells but the table only has 2 columns".to_string()
            ))
        );
        assert_eq!(builder.num_rows(), 1);
    }

    #[test]
    fn pads_short_rows() {
        let mut builder = TableBuilder::new(&["a", "b", "c"]);
        builder.add_row(vec![CellValue::Int(3)]).unwrap();
        let table = builder.build();
        assert_eq!(
            table.rows()[0],
            vec![CellValue::Int(3), CellValue::Empty, CellValue::Empty]
        );
        assert_eq!(table.cell(4, 0), &CellValue::Empty);
    }

    #[test]
    fn keeps_raw_column_labels() {
        let table = TableBuilder::new(&[" Nombre ", "Nombre"]).build();
        assert_eq!(table.columns(), &[" Nombre ".to_string(), "Nombre".to_string()]);
        // The first label that matches after trimming wins.
        assert_eq!(table.column_index("Nombre"), Some(0));
        assert_eq!(table.column_index(" Nombre "), None);
    }

    #[test]
    fn head() {
        let mut builder = TableBuilder::new(&["a"]);
        for i in 0..10 {
            builder.add_row(vec![CellValue::Int(i)]).unwrap();
        }
        let table = builder.build();
        let h = table.head(3);
        assert_eq!(h.len(), 3);
        assert_eq!(h.columns(), table.columns());
        assert_eq!(table.head(20).len(), 10);
    }

    #[test]
    fn builder_is_reusable() {
        let schema = ReportSchema::default();
        let builder = PivotReportBuilder::new(&schema).key_order(KeyOrder::Sorted);
        let mut tb = TableBuilder::new(&schema.required_columns());
        tb.add_row(vec![
            CellValue::Int(2),
            "Luis".into(),
            "Gómez".into(),
            "EN FORMACION".into(),
            "MATEMATICAS".into(),
            "NO APROBADO".into(),
        ])
        .unwrap();
        tb.add_row(vec![
            CellValue::Int(1),
            "Ana".into(),
            "Pérez".into(),
            "EN FORMACION".into(),
            "MATEMATICAS".into(),
            "POR EVALUAR".into(),
        ])
        .unwrap();
        let records = tb.build();
        let a = builder.build(&records).unwrap();
        let b = builder.build(&records).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rows[0].key.document_id, CellValue::Int(1));

        let empty = TableBuilder::new(&["Nombre"]).build();
        match builder.build(&empty) {
            Err(ReportError::MissingColumns(cols)) => assert_eq!(cols.len(), 5),
            x => panic!("unexpected result {:?}", x),
        }
    }
}
