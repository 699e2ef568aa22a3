use log::{debug, error, info, warn};

use pivot_report::builder::PivotReportBuilder;
use pivot_report::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::report::config_reader::*;

pub mod config_reader;
pub mod display;
pub mod io_excel;
pub mod io_xlsx;
pub mod summary;

const DEFAULT_WORKSHEET: &str = "Hoja";
const DEFAULT_SKIP_ROWS: usize = 12;
const DEFAULT_PIVOT_SHEET: &str = "Hoja2";
const DEFAULT_PREVIEW_ROWS: usize = 5;
const OUTPUT_SUFFIX: &str = "_tabla_dinamica_filtrada.xlsx";

#[derive(Debug, Snafu)]
pub enum ReportRunError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Worksheet {name:?} not found in {path} (available: {available:?})"))]
    MissingWorksheet {
        name: String,
        path: String,
        available: Vec<String>,
    },
    #[snafu(display("Unsupported file type: {path} (expected .xlsx, .xls, .xlsm or .ods)"))]
    UnsupportedFileType { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error reading the records of {path}"))]
    ReadingRecords { source: ReportError, path: String },
    #[snafu(display("Error building the pivot table"))]
    Pivot { source: ReportError },
    #[snafu(display("Error writing workbook {path}"))]
    WritingXlsx {
        source: rust_xlsxwriter::XlsxError,
        path: String,
    },
    #[snafu(display("Error writing summary {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the pivot table and the reference summary {path}"))]
    ReferenceMismatch { path: String },
    #[snafu(display("Invalid arguments: {message}"))]
    InvalidArguments { message: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportRunError>;

/// The message shown to the user for a failed file.
pub fn user_message(err: &ReportRunError) -> String {
    match err {
        ReportRunError::Pivot {
            source: ReportError::MissingColumns(cols),
        } => format!("Missing columns in the file: {}", cols.join(", ")),
        e => format!("Error processing the file: {}", with_causes(e)),
    }
}

/// The message shown to the user when the run cannot start, before any file
/// is processed.
pub fn startup_message(err: &ReportRunError) -> String {
    with_causes(err)
}

fn with_causes(err: &ReportRunError) -> String {
    let mut msg = err.to_string();
    let mut cur = std::error::Error::source(err);
    while let Some(cause) = cur {
        msg.push_str(&format!(": {}", cause));
        cur = std::error::Error::source(cause);
    }
    msg
}

/// All the settings of a run, after merging the command line, the configuration
/// file and the defaults.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub schema: ReportSchema,
    pub key_order: KeyOrder,
    pub worksheet_name: String,
    pub skip_rows: usize,
    pub original_sheet_name: String,
    pub pivot_sheet_name: String,
    pub preview_rows: usize,
    pub out: Option<String>,
    pub out_dir: Option<String>,
    pub summary: Option<String>,
    pub reference: Option<String>,
    pub quiet: bool,
}

impl RunSettings {
    pub fn new(args: &Args, config: &ReportConfig) -> ReportResult<RunSettings> {
        let multiple_inputs = args.inputs.len() > 1;
        if multiple_inputs && args.out.is_some() {
            return InvalidArgumentsSnafu {
                message: "--out can only be used with a single input, use --out-dir instead",
            }
            .fail();
        }
        if multiple_inputs && args.reference.is_some() {
            return InvalidArgumentsSnafu {
                message: "--reference can only be used with a single input",
            }
            .fail();
        }
        if multiple_inputs && args.summary.as_deref().map_or(false, |s| s != "stdout") {
            return InvalidArgumentsSnafu {
                message: "--summary can only write to a file with a single input",
            }
            .fail();
        }

        let worksheet_name = args
            .worksheet
            .clone()
            .or_else(|| config.worksheet_name.clone())
            .unwrap_or_else(|| DEFAULT_WORKSHEET.to_string());
        let original_sheet_name = config
            .original_sheet_name
            .clone()
            .unwrap_or_else(|| worksheet_name.clone());
        let pivot_sheet_name = config
            .pivot_sheet_name
            .clone()
            .unwrap_or_else(|| DEFAULT_PIVOT_SHEET.to_string());
        if original_sheet_name == pivot_sheet_name {
            return InvalidArgumentsSnafu {
                message: format!(
                    "the two output sheets must have different names, got {:?} twice",
                    pivot_sheet_name
                ),
            }
            .fail();
        }

        let key_order = if args.sorted {
            KeyOrder::Sorted
        } else {
            config.key_order()?.unwrap_or_default()
        };

        Ok(RunSettings {
            schema: config.schema(),
            key_order,
            worksheet_name,
            skip_rows: args
                .skip_rows
                .or(config.skip_rows)
                .unwrap_or(DEFAULT_SKIP_ROWS),
            original_sheet_name,
            pivot_sheet_name,
            preview_rows: args.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            out: args.out.clone(),
            out_dir: args.out_dir.clone(),
            summary: args.summary.clone(),
            reference: args.reference.clone(),
            quiet: args.quiet,
        })
    }

    /// Where to write the workbook for the given input.
    pub fn output_path(&self, input: &str) -> ReportResult<PathBuf> {
        if let Some(out) = &self.out {
            return Ok(PathBuf::from(out));
        }
        let input_p = Path::new(input);
        let stem = match input_p.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s,
            None => whatever!("Cannot derive an output name from {:?}", input),
        };
        let dir: PathBuf = match &self.out_dir {
            Some(d) => PathBuf::from(d),
            None => input_p
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default(),
        };
        Ok(dir.join(format!("{}{}", stem, OUTPUT_SUFFIX)))
    }
}

/// The outcome of processing one input file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProcessedFile {
    pub output_path: PathBuf,
    pub num_records: usize,
    pub pivot: PivotTable,
}

/// Reads one file, builds its pivot table and writes the output workbook.
pub fn process_file(
    input: &str,
    builder: &PivotReportBuilder,
    settings: &RunSettings,
) -> ReportResult<ProcessedFile> {
    info!("Processing file {:?}", input);
    let records =
        io_excel::read_records(input, &settings.worksheet_name, settings.skip_rows)?;

    if !settings.quiet {
        println!(
            "Data loaded from worksheet {:?} ({} records):",
            settings.worksheet_name,
            records.len()
        );
        println!(
            "{}",
            display::records_table(&records.head(settings.preview_rows))
        );
    }

    let pivot = builder.build(&records).context(PivotSnafu {})?;
    debug!("process_file: pivot: {:?}", pivot);

    let output_path = settings.output_path(input)?;
    if Path::new(input) == output_path.as_path() {
        whatever!("The output {:?} would overwrite the input", output_path);
    }
    io_xlsx::write_report(
        &output_path,
        &records,
        &pivot,
        &settings.original_sheet_name,
        &settings.pivot_sheet_name,
    )?;

    if !settings.quiet {
        println!(
            "Pivot table (worksheet {:?} of {}):",
            settings.pivot_sheet_name,
            output_path.display()
        );
        println!("{}", display::pivot_table(&pivot));
    }

    if settings.summary.is_some() || settings.reference.is_some() {
        let pretty_js = summary::pretty_summary(&pivot)?;
        if let Some(dest) = &settings.summary {
            summary::write_summary(&pretty_js, dest)?;
        }
        if let Some(reference) = &settings.reference {
            summary::check_reference(&pretty_js, reference)?;
        }
    }

    Ok(ProcessedFile {
        output_path,
        num_records: records.len(),
        pivot,
    })
}

/// Processes all the inputs. A failing file is reported and does not stop the
/// others. Returns the number of failed files.
pub fn run_report(args: &Args) -> ReportResult<usize> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => ReportConfig::default(),
    };
    let settings = RunSettings::new(args, &config)?;
    info!("settings: {:?}", settings);
    let builder = PivotReportBuilder::new(&settings.schema).key_order(settings.key_order);

    let mut failures: usize = 0;
    for input in args.inputs.iter() {
        match process_file(input, &builder, &settings) {
            Ok(res) => {
                info!(
                    "{:?}: {} records, {} people, written to {:?}",
                    input,
                    res.num_records,
                    res.pivot.len(),
                    res.output_path
                );
            }
            Err(e) => {
                failures += 1;
                error!("{:?}: {:?}", input, e);
                if let Some(bt) = ErrorCompat::backtrace(&e) {
                    debug!("trace: {}", bt);
                }
                eprintln!("{}: {}", input, user_message(&e));
            }
        }
    }
    if failures > 0 {
        warn!("{} of {} files failed", failures, args.inputs.len());
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_xlsxwriter::Workbook;

    fn args(cmd: &[&str]) -> Args {
        let mut v = vec!["evalpivot"];
        v.extend_from_slice(cmd);
        Args::parse_from(v)
    }

    fn settings(cmd: &[&str]) -> ReportResult<RunSettings> {
        RunSettings::new(&args(cmd), &ReportConfig::default())
    }

    // Writes an export in the layout of the training platform.
    fn write_export(path: &Path, rows: &[[&str; 6]], with_judgment: bool) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet().set_name("Hoja").unwrap();
        worksheet.write_string(0, 0, "Reporte de Juicios Evaluativos").unwrap();
        worksheet.write_string(2, 0, "Ficha: 2500123").unwrap();
        let mut header = vec![
            "Número de Documento",
            "Nombre",
            "Apellidos",
            "Estado",
            "Competencia",
        ];
        if with_judgment {
            header.push("Juicio de Evaluación ");
        }
        for (col, h) in header.iter().enumerate() {
            worksheet.write_string(12, col as u16, *h).unwrap();
        }
        for (idx, row) in rows.iter().enumerate() {
            let r = 13 + idx as u32;
            worksheet.write_number(r, 0, row[0].parse::<f64>().unwrap()).unwrap();
            for col in 1..header.len() {
                worksheet.write_string(r, col as u16, row[col]).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn default_settings() {
        let s = settings(&["a.xlsx"]).unwrap();
        assert_eq!(s.worksheet_name, "Hoja");
        assert_eq!(s.skip_rows, 12);
        assert_eq!(s.original_sheet_name, "Hoja");
        assert_eq!(s.pivot_sheet_name, "Hoja2");
        assert_eq!(s.preview_rows, 5);
        assert_eq!(s.key_order, KeyOrder::FirstSeen);
        assert_eq!(s.schema, ReportSchema::default());
        assert_eq!(
            s.output_path("datos/enero.xlsx").unwrap(),
            PathBuf::from("datos/enero_tabla_dinamica_filtrada.xlsx")
        );
    }

    #[test]
    fn command_line_overrides_config() {
        let config: ReportConfig = serde_json::from_str(
            r#"{"worksheetName": "Datos", "skipRows": 3, "keyOrder": "firstSeen",
                "originalSheetName": "Original"}"#,
        )
        .unwrap();
        let s = RunSettings::new(
            &args(&["--skip-rows", "0", "--sorted", "--out-dir", "out", "a.xlsx"]),
            &config,
        )
        .unwrap();
        assert_eq!(s.worksheet_name, "Datos");
        assert_eq!(s.skip_rows, 0);
        assert_eq!(s.key_order, KeyOrder::Sorted);
        assert_eq!(s.original_sheet_name, "Original");
        assert_eq!(
            s.output_path("datos/a.xlsx").unwrap(),
            PathBuf::from("out/a_tabla_dinamica_filtrada.xlsx")
        );
    }

    #[test]
    fn invalid_argument_combinations() {
        assert!(matches!(
            settings(&["--out", "x.xlsx", "a.xlsx", "b.xlsx"]),
            Err(ReportRunError::InvalidArguments { .. })
        ));
        assert!(matches!(
            settings(&["--reference", "r.json", "a.xlsx", "b.xlsx"]),
            Err(ReportRunError::InvalidArguments { .. })
        ));
        assert!(matches!(
            settings(&["--summary", "s.json", "a.xlsx", "b.xlsx"]),
            Err(ReportRunError::InvalidArguments { .. })
        ));
        assert!(settings(&["--summary", "stdout", "a.xlsx", "b.xlsx"]).is_ok());
        let config: ReportConfig =
            serde_json::from_str(r#"{"pivotSheetName": "Hoja"}"#).unwrap();
        assert!(matches!(
            RunSettings::new(&args(&["a.xlsx"]), &config),
            Err(ReportRunError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ficha.xlsx");
        write_export(
            &input,
            &[
                ["1020", "Ana", "Pérez", "EN FORMACION", "INGLES", "NO APROBADO"],
                ["1020", "Ana", "Pérez", "EN FORMACION", "FISICA", "POR EVALUAR"],
                ["1020", "Ana", "Pérez", "EN FORMACION", "INGLES", "APROBADO"],
                ["3040", "Luis", "Gómez", "CANCELADO", "INGLES", "NO APROBADO"],
                ["5060", "Eva", "Ruiz", "EN FORMACION", "INGLES", "POR EVALUAR"],
            ],
            true,
        );
        let input_s = input.to_str().unwrap();
        let summary_p = dir.path().join("summary.json");
        let s = settings(&[
            "--quiet",
            "--summary",
            summary_p.to_str().unwrap(),
            input_s,
        ])
        .unwrap();
        let builder = PivotReportBuilder::new(&s.schema);
        let res = process_file(input_s, &builder, &s).unwrap();

        assert_eq!(res.num_records, 5);
        assert_eq!(
            res.output_path,
            dir.path().join("ficha_tabla_dinamica_filtrada.xlsx")
        );
        assert!(res.output_path.exists());
        assert_eq!(
            res.pivot.columns,
            vec!["EN FORMACION INGLES", "EN FORMACION FISICA"]
        );
        let ana = IdentityKey::new(1020i64, "Ana", "Pérez");
        assert_eq!(res.pivot.row(&ana).unwrap().counts, vec![1, 1]);
        assert_eq!(res.pivot.row(&ana).unwrap().total, 2);
        assert_eq!(
            res.pivot.count(&IdentityKey::new(5060i64, "Eva", "Ruiz"), "EN FORMACION FISICA"),
            Some(0)
        );
        assert!(res
            .pivot
            .row(&IdentityKey::new(3040i64, "Luis", "Gómez"))
            .is_none());

        // The summary can be used as a reference for the same input.
        let s2 = settings(&[
            "--quiet",
            "--reference",
            summary_p.to_str().unwrap(),
            input_s,
        ])
        .unwrap();
        assert!(process_file(input_s, &builder, &s2).is_ok());
    }

    #[test]
    fn missing_column_message() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("incompleto.xlsx");
        write_export(
            &input,
            &[["1", "Ana", "Pérez", "EN FORMACION", "INGLES", ""]],
            false,
        );
        let input_s = input.to_str().unwrap();
        let s = settings(&["--quiet", input_s]).unwrap();
        let builder = PivotReportBuilder::new(&s.schema);
        let err = process_file(input_s, &builder, &s).unwrap_err();
        assert_eq!(
            user_message(&err),
            "Missing columns in the file: Juicio de Evaluación"
        );
        // Nothing is written for a failed file.
        assert!(!dir
            .path()
            .join("incompleto_tabla_dinamica_filtrada.xlsx")
            .exists());
    }

    #[test]
    fn failures_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.xlsx");
        write_export(
            &good,
            &[["1", "Ana", "Pérez", "EN FORMACION", "INGLES", "NO APROBADO"]],
            true,
        );
        let missing = dir.path().join("missing.xlsx");
        let unsupported = dir.path().join("notes.txt");
        let failures = run_report(&args(&[
            "--quiet",
            missing.to_str().unwrap(),
            unsupported.to_str().unwrap(),
            good.to_str().unwrap(),
        ]))
        .unwrap();
        assert_eq!(failures, 2);
        assert!(dir
            .path()
            .join("good_tabla_dinamica_filtrada.xlsx")
            .exists());
    }

    #[test]
    fn other_errors_message() {
        let err = ReportRunError::UnsupportedFileType {
            path: "notes.txt".to_string(),
        };
        assert_eq!(
            user_message(&err),
            "Error processing the file: Unsupported file type: notes.txt (expected .xlsx, .xls, .xlsm or .ods)"
        );
    }

    #[test]
    fn ragged_rows_are_a_reading_error() {
        let err = ReportRunError::ReadingRecords {
            source: ReportError::Processing(
                "row 3 has 7 cells but the table only has 6 columns".to_string(),
            ),
            path: "export.xlsx".to_string(),
        };
        assert_eq!(
            user_message(&err),
            "Error processing the file: Error reading the records of export.xlsx: \
             row 3 has 7 cells but the table only has 6 columns"
        );
    }

    #[test]
    fn startup_errors_do_not_mention_a_file() {
        let err = run_report(&args(&["a.xlsx", "b.xlsx", "--out", "c.xlsx"])).unwrap_err();
        let msg = startup_message(&err);
        assert!(msg.starts_with("Invalid arguments: "), "{}", msg);
        assert!(!msg.contains("Error processing the file"));

        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{ not json").unwrap();
        let err = run_report(&args(&["a.xlsx", "-c", config.to_str().unwrap()])).unwrap_err();
        let msg = startup_message(&err);
        assert!(msg.starts_with("Error parsing JSON file "), "{}", msg);
        assert!(!msg.contains("Error processing the file"));
    }
}
