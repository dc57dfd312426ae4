use texfetch_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Logging first; fall back to stderr when the state dir is unusable.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", e);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("texfetch error: {:#}", err);
        std::process::exit(1);
    }
}
