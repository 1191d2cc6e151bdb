//! Setup for the program logger.
//!
//! Messages at `warn` and above go to stderr and everything else to stdout, coloured when writing
//! to a terminal. The `run` command additionally writes two plain-text log files into the output
//! folder.
use anyhow::{Context, Result, anyhow, bail, ensure};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::OnceLock;

/// Set once the logger has been installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The log level used when neither `COVHPI_LOG_LEVEL` nor `settings.toml` give one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable which overrides the log level in the settings file
const LOG_LEVEL_ENV_VAR: &str = "COVHPI_LOG_LEVEL";

/// Log file for messages below `warn`
const LOG_INFO_FILE_NAME: &str = "covhpi_info.log";

/// Log file for warnings and errors
const LOG_ERROR_FILE_NAME: &str = "covhpi_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// The pair of log files written for a run
struct LogFiles {
    info: File,
    error: File,
}

impl LogFiles {
    /// Create (or truncate) both log files in `dir`
    fn create(dir: &Path) -> Result<Self> {
        let open = |file_name: &str| {
            let path = dir.join(file_name);
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .with_context(|| format!("Could not create log file {}", path.display()))
        };

        Ok(Self {
            info: open(LOG_INFO_FILE_NAME)?,
            error: open(LOG_ERROR_FILE_NAME)?,
        })
    }
}

/// Initialise the program logger.
///
/// The level is taken from the `COVHPI_LOG_LEVEL` environment variable if set, otherwise from
/// `log_level_from_settings`. Accepted levels are `off`, `error`, `warn`, `info`, `debug` and
/// `trace`, in any case.
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in `settings.toml`
/// * `log_file_path`: If given, the folder in which to write log files
pub fn init(log_level_from_settings: &str, log_file_path: Option<&Path>) -> Result<()> {
    ensure!(!is_logger_initialised(), "Logger already initialised");

    let log_level = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| log_level_from_settings.into());
    let log_level = parse_log_level(&log_level)?;

    let mut dispatch = Dispatch::new().chain(terminal_dispatch(log_level));
    if let Some(dir) = log_file_path {
        dispatch = dispatch.chain(file_dispatch(log_level, LogFiles::create(dir)?));
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT
        .set(())
        .map_err(|()| anyhow!("Logger already initialised"))?;

    Ok(())
}

/// Output to stdout and stderr
fn terminal_dispatch(log_level: LevelFilter) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let colour_stdout = io::stdout().is_terminal().then_some(colours);
    let colour_stderr = io::stderr().is_terminal().then_some(colours);

    Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .format(move |out, message, record| {
                    write_log(out, message, record, colour_stdout.as_ref());
                })
                .level(log_level)
                .chain(io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    write_log(out, message, record, colour_stderr.as_ref());
                })
                .level(log_level.min(LevelFilter::Warn))
                .chain(io::stderr()),
        )
}

/// Output to the log files.
///
/// The info file records at least `info` messages, whatever the terminal level.
fn file_dispatch(log_level: LevelFilter, files: LogFiles) -> Dispatch {
    Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .format(|out, message, record| write_log(out, message, record, None))
                .level(log_level.max(LevelFilter::Info))
                .chain(files.info),
        )
        .chain(
            Dispatch::new()
                .format(|out, message, record| write_log(out, message, record, None))
                .level(LevelFilter::Warn)
                .chain(files.error),
        )
}

/// Convert a log level string to a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    let level = match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(level)
}

/// Write a single log line, colouring the level if `colours` is given
fn write_log(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colours: Option<&ColoredLevelConfig>,
) {
    match colours {
        Some(colours) => write_line(out, colours.color(record.level()), record.target(), message),
        None => write_line(out, record.level(), record.target(), message),
    }
}

fn write_line<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");
    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}
