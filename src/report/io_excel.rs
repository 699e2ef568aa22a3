// Primitives for reading the spreadsheet exports.

use std::path::Path;

use calamine::{open_workbook_auto, DataType, Range, Reader};

use pivot_report::builder::TableBuilder;

use crate::report::*;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];

// Larger integers are not exactly representable as floats.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Reads the records of a worksheet.
///
/// The first `skip_rows` rows of the worksheet are ignored, the next row is the header.
pub fn read_records(path: &str, worksheet_name: &str, skip_rows: usize) -> ReportResult<RecordTable> {
    check_extension(path)?;
    debug!(
        "read_records: path: {:?} worksheet: {:?} skip_rows: {:?}",
        path, worksheet_name, skip_rows
    );
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    let available: Vec<String> = workbook.sheet_names().to_vec();
    let wrange = match workbook.worksheet_range(worksheet_name) {
        Some(r) => r.context(OpeningExcelSnafu { path })?,
        None => {
            return MissingWorksheetSnafu {
                name: worksheet_name,
                path,
                available,
            }
            .fail()
        }
    };
    let table = range_to_table(&wrange, skip_rows).context(ReadingRecordsSnafu { path })?;
    info!(
        "Read {:?} records with {:?} columns from {:?}",
        table.len(),
        table.columns().len(),
        path
    );
    Ok(table)
}

fn check_extension(path: &str) -> ReportResult<()> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext {
        Some(e) if SUPPORTED_EXTENSIONS.contains(&e.as_str()) => Ok(()),
        _ => UnsupportedFileTypeSnafu { path }.fail(),
    }
}

/// Converts a worksheet range to a table of records.
///
/// Calamine ranges start at the first used cell, so the number of rows to skip is
/// counted from the top of the worksheet.
pub fn range_to_table(
    wrange: &Range<DataType>,
    skip_rows: usize,
) -> Result<RecordTable, ReportError> {
    let (start_row, start_col) = wrange.start().unwrap_or((0, 0));
    let to_skip = skip_rows.saturating_sub(start_row as usize);
    let mut iter = wrange.rows().skip(to_skip);

    let header: Vec<String> = match iter.next() {
        Some(row) => row
            .iter()
            .enumerate()
            .map(|(idx, cell)| header_label(cell, start_col as usize + idx))
            .collect(),
        // Nothing after the banner: no columns at all.
        None => Vec::new(),
    };
    debug!("range_to_table: header: {:?}", header);

    let mut builder = TableBuilder::new(header.as_slice());
    for row in iter {
        let cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        builder.add_row(cells)?;
    }
    Ok(builder.build())
}

fn header_label(cell: &DataType, col: usize) -> String {
    match cell_value(cell) {
        CellValue::Empty => format!("Unnamed: {}", col),
        CellValue::Text(s) => s,
        v => v.to_string(),
    }
}

pub fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Int(*i),
        DataType::Float(f) => float_value(*f),
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::DateTime(f) => CellValue::DateTime(*f),
        DataType::Error(e) => CellValue::Text(format!("#{:?}", e)),
        #[allow(unreachable_patterns)]
        other => CellValue::Text(format!("{:?}", other)),
    }
}

// Spreadsheets store every number as a float. Whole numbers such as document
// numbers are read back as integers.
fn float_value(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
        CellValue::Int(f as i64)
    } else {
        CellValue::Float(f)
    }
}
