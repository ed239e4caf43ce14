//! Command-line interface for scaffold.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::DEFAULT_STACK;
use clap::{error::ErrorKind, CommandFactory, Parser};

/// Command-line arguments for scaffold.
#[derive(Parser, Debug)]
#[command(author, version, about = "scaffold: create a repository, build pipeline and deployment for a new service", long_about = None)]
pub struct Args {
    /// Name of the new service, also used as the directory to clone into
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Language stack to add on top of the common files
    #[arg(short, long, default_value = DEFAULT_STACK)]
    pub stack: String,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if the name is missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
