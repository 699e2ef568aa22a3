// Text rendering of the tables for the terminal.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};

use crate::report::*;

fn new_table(header: &[String]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn value_cell(v: &CellValue) -> Cell {
    let cell = Cell::new(v.to_string());
    match v {
        CellValue::Int(_) | CellValue::Float(_) => cell.set_alignment(CellAlignment::Right),
        _ => cell,
    }
}

pub fn records_table(records: &RecordTable) -> Table {
    let mut table = new_table(records.columns());
    for row in records.rows() {
        table.add_row(row.iter().map(value_cell).collect::<Vec<Cell>>());
    }
    table
}

pub fn pivot_table(pivot: &PivotTable) -> Table {
    let mut table = new_table(&pivot.header());
    for row in pivot.rows.iter() {
        let mut cells: Vec<Cell> = row.key.values().iter().map(|v| value_cell(v)).collect();
        for count in row.counts.iter().chain(std::iter::once(&row.total)) {
            cells.push(Cell::new(count).set_alignment(CellAlignment::Right));
        }
        table.add_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_report::builder::{PivotReportBuilder, TableBuilder};

    #[test]
    fn renders_pivot() {
        let schema = ReportSchema::default();
        let mut tb = TableBuilder::new(&schema.required_columns());
        tb.add_row(vec![
            CellValue::Int(77),
            "Ana".into(),
            "Pérez".into(),
            "EN FORMACION".into(),
            "INGLES".into(),
            "NO APROBADO".into(),
        ])
        .unwrap();
        let records = tb.build();
        let pivot = PivotReportBuilder::new(&schema).build(&records).unwrap();

        let s = pivot_table(&pivot).to_string();
        assert!(s.contains("EN FORMACION INGLES"));
        assert!(s.contains("Total General"));
        assert!(s.contains("Pérez"));
        // header + one row
        assert_eq!(s.lines().filter(|l| l.contains("77")).count(), 1);

        let s = records_table(&records.head(5)).to_string();
        assert!(s.contains("Juicio de Evaluación"));
        assert!(s.contains("NO APROBADO"));
    }

    #[test]
    fn renders_empty_pivot() {
        let schema = ReportSchema::default();
        let records = TableBuilder::new(&schema.required_columns()).build();
        let pivot = PivotReportBuilder::new(&schema).build(&records).unwrap();
        let s = pivot_table(&pivot).to_string();
        assert!(s.contains("Número de Documento"));
        assert!(s.contains("Total General"));
    }
}
