use clap::Parser;

/// Builds the pivot table of the pending evaluations of a training export.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file paths) The spreadsheets to process (.xlsx, .xls, .xlsm or .ods). Each file is processed
    /// independently: an error in one file does not stop the others.
    #[clap(value_parser, required = true)]
    pub inputs: Vec<String>,

    /// (file path, optional) A JSON file with the names of the columns, the filtering values and the
    /// worksheet settings. See the manual for all the options.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) Where to write the output workbook. Only accepted with a single input.
    /// By default, the output is written next to the input, as <name>_tabla_dinamica_filtrada.xlsx
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (directory, optional) The directory in which the output workbooks are written.
    #[clap(long, value_parser)]
    pub out_dir: Option<String>,

    /// (default Hoja) The name of the worksheet holding the records.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// (default 12) The number of rows at the top of the worksheet to skip before the header row.
    #[clap(long, value_parser)]
    pub skip_rows: Option<usize>,

    /// (default 5) The number of records to show from the loaded table.
    #[clap(long, value_parser)]
    pub preview_rows: Option<usize>,

    /// (file path, 'stdout' or empty) If specified, a summary of the pivot table will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, evalpivot will check that the
    /// pivot table matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Sorts the people and the columns by value instead of keeping the order of the input.
    #[clap(long, takes_value = false)]
    pub sorted: bool,

    /// Does not print the tables to the standard output.
    #[clap(short, long, takes_value = false)]
    pub quiet: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
