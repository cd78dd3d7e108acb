use clap::Parser;
use std::process::ExitCode;
use tidyfold::cli::{Args, run_cli};
use tidyfold::logging::init_logging;
use tidyfold::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    // Per-file failures are part of a completed run and do not change the exit code.
    match run_cli(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
