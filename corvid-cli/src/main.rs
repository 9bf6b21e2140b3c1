mod check;
mod cli;
mod load;
mod run;

use std::fmt;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{level_filters::LevelFilter, Event, Level, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::cli::{Cli, Command};

fn main() {
    let start_time = Instant::now();
    let Cli { command, log, time } = Cli::parse();

    if let Some(log_level) = log {
        start_logging(log_level, start_time);
    }

    let exit_code = match command {
        Command::Run { files, entry } => {
            let code = run::run(&files, &entry);
            if time {
                print_times(&[("run", start_time.elapsed())]);
            }
            code
        }
        Command::Check { files } => {
            let code = check::check(&files);
            if time {
                print_times(&[("check", start_time.elapsed())]);
            }
            code
        }
    };

    std::process::exit(exit_code);
}

fn start_logging(level: LevelFilter, start_time: Instant) {
    tracing_subscriber::fmt()
        .with_env_filter(format!("none,corvid_lang={level},corvid_cli={level}"))
        .event_format(LogFormatter { start_time })
        .init();
}

struct LogFormatter {
    start_time: Instant,
}

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        context: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        use colored::Colorize;

        let elapsed = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let level = event.metadata().level();
        let scopes = context
            .event_scope()
            .map(|scope| scope.from_root().collect::<Vec<_>>())
            .unwrap_or_default();

        let colorized_level = match *level {
            Level::ERROR => "ERROR".red().bold(),
            Level::WARN => "WARN".yellow().bold(),
            Level::INFO => "INFO".blue().bold(),
            Level::DEBUG => "DEBUG".green().bold(),
            Level::TRACE => "TRACE".cyan().bold(),
        };

        write!(writer, "{} {:5}", format!("{elapsed:.3}ms").dimmed(), colorized_level)?;

        if !scopes.is_empty() {
            let span_names = scopes.iter().map(|span| span.metadata().name()).collect::<Vec<_>>();
            write!(writer, " {}", span_names.join("::").bold())?;
        }

        write!(writer, " ")?;
        context.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn print_times(times: &[(&str, Duration)]) {
    for (label, elapsed) in times {
        println!("{label}: {}ms", elapsed.as_secs_f64() * 1000.0);
    }
}
