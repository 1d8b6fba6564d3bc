mod args;
mod form;

use clap::Parser;
use log::{debug, LevelFilter};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    let res = form::run_form(
        args.config.as_str(),
        args.reference.as_deref(),
        args.out.as_deref(),
        args.winner_count,
    );
    if let Err(e) = res {
        form::print_error(&e);
        std::process::exit(1);
    }
}
