use std::env;

use anyhow::Result;
use chrono::SecondsFormat;
use colored::Colorize;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, LevelFilter};

use crate::host::JOB_ID_VAR;

/// Verbosity level for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warning,
    /// Info, warning, and error messages (default)
    Info,
    /// Debug, info, warning, and error messages
    Debug,
    /// Trace, debug, info, warning, and error messages
    Trace,
}

impl LogLevel {
    /// Convert verbosity level to log::LevelFilter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }

    /// Get the verbosity level from the number of occurrences of a flag
    pub fn from_occurrences(occurrences: u8) -> Self {
        match occurrences {
            0 => LogLevel::Info,  // Default
            1 => LogLevel::Debug, // -v
            _ => LogLevel::Trace, // -vv or more
        }
    }
}

/// Label identifying one step run in the shared log file
///
/// `welcome@0192-abc` when the host engine runs the step as a job, the bare
/// step name otherwise.
pub fn run_label(step: &str, job_id: Option<&str>) -> String {
    match job_id.map(str::trim).filter(|job| !job.is_empty()) {
        Some(job) => format!("{step}@{job}"),
        None => step.to_string(),
    }
}

/// [`run_label`] with the job id taken from the host environment
pub fn run_label_from_env(step: &str) -> String {
    run_label(step, env::var(JOB_ID_VAR).ok().as_deref())
}

/// One record of the log file
pub fn file_record(timestamp: &str, level: Level, run: &str, message: &str) -> String {
    format!("[{timestamp} {level:<5} {run}] {message}")
}

/// Initialise the logger for a single step run
///
/// Console output goes to stderr so that stdout carries only the step payload
/// the host engine consumes. Several runs usually append to the same file, so
/// each file record carries `run`.
pub fn init_logger(verbosity: LogLevel, log_file: &str, run: &str) -> Result<()> {
    let base_logger = Dispatch::new().level(verbosity.to_level_filter());

    let colors_line = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::White)
        .debug(Color::White)
        .trace(Color::BrightBlack);

    let console_logger = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "\x1B[{}m{}\x1B[0m",
                colors_line.get_color(&record.level()).to_fg_str(),
                message
            ))
        })
        .level(verbosity.to_level_filter())
        .chain(std::io::stderr());

    if log_file.is_empty() {
        base_logger.chain(console_logger).apply()?;
    } else {
        let run = run.to_string();
        let file_logger = Dispatch::new()
            .format(move |out, message, record| {
                let timestamp = chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                out.finish(format_args!(
                    "{}",
                    file_record(&timestamp, record.level(), &run, &message.to_string())
                ))
            })
            .level(verbosity.to_level_filter())
            .chain(fern::log_file(log_file)?);
        base_logger
            .chain(file_logger)
            .chain(console_logger)
            .apply()?;
    }

    log::debug!("Logger initialized for {run} with verbosity level: {verbosity:?}");

    Ok(())
}

/// Format a message with colour support
pub fn format_message(message: &str, colored_message: &str) -> String {
    if atty::is(atty::Stream::Stderr) {
        colored_message.to_string()
    } else {
        message.to_string()
    }
}

/// Render a step outcome status for the terminal
///
/// `sucesso` is green, `aviso` yellow and anything else red.
pub fn format_status(status: &str) -> String {
    let colored_status = match status {
        "sucesso" => status.green().bold(),
        "aviso" => status.yellow().bold(),
        _ => status.red().bold(),
    };
    format_message(status, &colored_status.to_string())
}
