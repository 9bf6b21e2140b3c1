use std::path::PathBuf;

use clap::{
    ColorChoice, Parser, Subcommand,
    builder::{Styles, styling::AnsiColor},
    crate_authors, crate_description, crate_version,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[clap(
    version = crate_version!(),
    author = crate_authors!(),
    about = crate_description!(),
    color = ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::BrightMagenta.on_default().bold().underline())
        .usage(AnsiColor::BrightMagenta.on_default().bold().underline())
        .literal(AnsiColor::BrightCyan.on_default().bold())
        .placeholder(AnsiColor::BrightCyan.on_default().bold())
        .valid(AnsiColor::BrightGreen.on_default())
        .invalid(AnsiColor::BrightYellow.on_default())
        .error(AnsiColor::BrightRed.on_default())
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Set the log level
    #[arg(short, long, value_name = "LEVEL", env = "CORVID_LOG")]
    pub log: Option<LevelFilter>,

    /// Display the time taken for each phase
    #[arg(short, long)]
    pub time: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile and run a program as a console I/O driver (default entry: `main`)
    #[command(alias = "r")]
    Run {
        /// Source files to compile together
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Name of the nullary top-level definition to run
        #[arg(short, long, default_value = "main")]
        entry: String,
    },

    /// Compile a program and report errors without running it
    #[command(alias = "c")]
    Check {
        /// Source files to compile together
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
