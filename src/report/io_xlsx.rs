// Writes the output workbook: the loaded records and the pivot table.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::report::*;

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

pub fn write_report(
    path: &Path,
    records: &RecordTable,
    pivot: &PivotTable,
    original_sheet_name: &str,
    pivot_sheet_name: &str,
) -> ReportResult<()> {
    let path_s = path.display().to_string();
    debug!(
        "write_report: path: {:?} sheets: {:?} {:?}",
        path_s, original_sheet_name, pivot_sheet_name
    );
    let mut workbook =
        build_workbook(records, pivot, original_sheet_name, pivot_sheet_name)
            .context(WritingXlsxSnafu { path: path_s.clone() })?;
    workbook
        .save(path)
        .context(WritingXlsxSnafu { path: path_s.clone() })?;
    info!("Wrote {:?}", path_s);
    Ok(())
}

fn build_workbook(
    records: &RecordTable,
    pivot: &PivotTable,
    original_sheet_name: &str,
    pivot_sheet_name: &str,
) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    {
        let worksheet = workbook.add_worksheet().set_name(original_sheet_name)?;
        write_header(worksheet, records.columns(), &header_format)?;
        for (idx, row) in records.rows().iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                write_cell(worksheet, idx as u32 + 1, col as u16, cell, &date_format)?;
            }
        }
    }

    {
        let worksheet = workbook.add_worksheet().set_name(pivot_sheet_name)?;
        write_header(worksheet, &pivot.header(), &header_format)?;
        let num_index = pivot.index_names.len() as u16;
        for (idx, row) in pivot.rows.iter().enumerate() {
            let r = idx as u32 + 1;
            for (col, v) in row.key.values().iter().enumerate() {
                write_cell(worksheet, r, col as u16, v, &date_format)?;
            }
            for (col, count) in row.counts.iter().enumerate() {
                worksheet.write_number(r, num_index + col as u16, *count as f64)?;
            }
            let total_col = num_index + row.counts.len() as u16;
            worksheet.write_number(r, total_col, row.total as f64)?;
        }
        worksheet.set_freeze_panes(1, num_index)?;
    }

    Ok(workbook)
}

fn write_header(
    worksheet: &mut Worksheet,
    labels: &[String],
    format: &Format,
) -> Result<(), XlsxError> {
    for (col, label) in labels.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, label, format)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(f) => {
            worksheet.write_number_with_format(row, col, *f, date_format)?;
        }
    }
    Ok(())
}
