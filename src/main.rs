mod args;
mod report;

use clap::Parser;
use log::{debug, error, LevelFilter};

use crate::args::Args;

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!("args: {:?}", args);

    match report::run_report(&args) {
        Ok(0) => {}
        Ok(failures) => {
            error!("{} of {} files could not be processed", failures, args.inputs.len());
            std::process::exit(1);
        }
        Err(e) => {
            error!("{:?}", e);
            eprintln!("{}", report::startup_message(&e));
            std::process::exit(2);
        }
    }
}
