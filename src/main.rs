//! scaffold's command-line entry point.
//! Parses arguments, sets up logging and runs the scaffolding in the current
//! directory; the process exits with the status code of the run.

use scaffold::{
    cli::get_args,
    error::{default_error_handler, Error},
    logger::init_logger,
    service::setup,
};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    let dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => default_error_handler(Error::IoError(err)),
    };

    let mut out = std::io::stdout();
    std::process::exit(setup(&dir, &mut out, &args));
}
