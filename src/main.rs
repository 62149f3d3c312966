mod args;
mod election;

use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::election::RunOptions;

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    info!("args: {:?}", args);

    let options = RunOptions {
        reference: args.reference,
        out: args.out,
        input: args.input,
        input_type: args.input_type,
        excel_worksheet_name: args.excel_worksheet_name,
        snapshot: args.snapshot,
    };

    if let Err(e) = election::run_election(args.config, &options) {
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
