// JSON summary of a pivot table, and comparison with a reference summary.

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::report::*;

fn cell_json(v: &CellValue) -> JSValue {
    match v {
        CellValue::Empty => JSValue::Null,
        CellValue::Text(s) => json!(s),
        CellValue::Int(i) => json!(i),
        CellValue::Float(f) | CellValue::DateTime(f) => json!(f),
        CellValue::Bool(b) => json!(b),
    }
}

pub fn summary_json(pivot: &PivotTable) -> JSValue {
    let rows: Vec<JSValue> = pivot
        .rows
        .iter()
        .map(|row| {
            let key: Vec<JSValue> = row.key.values().iter().map(|v| cell_json(v)).collect();
            json!({
                "key": key,
                "counts": row.counts,
                "total": row.total,
            })
        })
        .collect();
    json!({
        "index": pivot.index_names,
        "columns": pivot.columns,
        "totalLabel": pivot.total_label,
        "rows": rows,
    })
}

pub fn pretty_summary(pivot: &PivotTable) -> ReportResult<String> {
    serde_json::to_string_pretty(&summary_json(pivot)).context(SerializingJsonSnafu {})
}

/// Writes the summary to a file, or to the standard output with `stdout`.
pub fn write_summary(pretty_js: &str, dest: &str) -> ReportResult<()> {
    if dest == "stdout" {
        println!("{}", pretty_js);
    } else {
        fs::write(dest, pretty_js).context(WritingSummarySnafu { path: dest })?;
        info!("Wrote summary to {:?}", dest);
    }
    Ok(())
}

pub fn read_reference(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

/// Checks a computed summary against a reference file, printing the differences if any.
pub fn check_reference(pretty_js: &str, reference_path: &str) -> ReportResult<()> {
    let summary_ref = read_reference(reference_path)?;
    let pretty_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_ref != pretty_js {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(pretty_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("Summary matches the reference {:?}", reference_path);
    Ok(())
}
