//! The command line interface for CovHPI.
use crate::dataset::FlatRecord;
use crate::date::DateKey;
use crate::input::load_dataset;
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_merged, write_records};
use crate::query::{available_years, region_series, snapshot};
use crate::region::{Region, parse_region_str};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result, bail, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

pub mod demo;
use demo::DemoSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for CovHPI.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// How to pick the day shown by the `snapshot` command
#[derive(Args)]
#[group(required = true, multiple = true)]
pub struct DaySelection {
    /// The day, e.g. 2020-03-15
    #[arg(long, conflicts_with_all = ["year", "day_of_year"])]
    pub date: Option<DateKey>,
    /// The year, used with --day-of-year
    #[arg(long, requires = "day_of_year")]
    pub year: Option<i32>,
    /// The day of the year (1-based), used with --year
    #[arg(long, requires = "year")]
    pub day_of_year: Option<u32>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Merge the input data and write the results to disk.
    Run {
        /// Path to the directory containing the input files.
        data_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check that the input data can be merged, without writing anything.
    Validate {
        /// Path to the directory containing the input files.
        data_dir: PathBuf,
    },
    /// Print every region's metrics on a single day.
    Snapshot {
        /// Path to the directory containing the input files.
        data_dir: PathBuf,
        /// The day to show
        #[command(flatten)]
        day: DaySelection,
    },
    /// Print the metrics for one region in date order.
    Series {
        /// Path to the directory containing the input files.
        data_dir: PathBuf,
        /// The region, as a name (e.g. "Ontario") or numeric code (e.g. 11).
        region: String,
        /// Only show days after this one
        #[arg(long)]
        since: Option<DateKey>,
    },
    /// List the known regions and their codes.
    Regions,
    /// Manage the bundled demo data.
    Demo {
        /// The available subcommands for managing demo data.
        #[command(subcommand)]
        subcommand: DemoSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { data_dir, opts } => handle_run_command(&data_dir, &opts, None),
            Self::Validate { data_dir } => handle_validate_command(&data_dir, None),
            Self::Snapshot { data_dir, day } => handle_snapshot_command(&data_dir, &day),
            Self::Series {
                data_dir,
                region,
                since,
            } => handle_series_command(&data_dir, &region, since.as_ref()),
            Self::Regions => {
                handle_regions_command();
                Ok(())
            }
            Self::Demo { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start CovHPI
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ covhpi --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    data_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(data_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    // Load and merge the input data
    let dataset = load_dataset(data_path, settings.calendar()).context("Failed to load data.")?;
    info!("Loaded data from {}", data_path.display());
    info!("Output folder: {}", output_path.display());

    let records = dataset.flatten();
    write_merged(output_path, &records).context("Failed to write merged data.")?;
    write_metadata(output_path, data_path, records.len())
        .context("Failed to write metadata.")?;
    info!("Wrote {} merged records", records.len());

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(data_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    load_dataset(data_path, settings.calendar()).context("Failed to validate data.")?;
    info!("Data validation successful!");

    Ok(())
}

/// Load and flatten the data without initialising the logger, for commands writing to stdout
fn load_records(data_path: &Path, settings: &Settings) -> Result<Vec<FlatRecord>> {
    let dataset = load_dataset(data_path, settings.calendar()).context("Failed to load data.")?;
    Ok(dataset.flatten())
}

/// Handle the `snapshot` command.
fn handle_snapshot_command(data_path: &Path, day: &DaySelection) -> Result<()> {
    let settings = load_settings(None)?;
    let records = load_records(data_path, &settings)?;

    let date = match (day.date, day.year, day.day_of_year) {
        (Some(date), _, _) => date,
        (None, Some(year), Some(day_of_year)) => settings
            .calendar()
            .date_from_day_of_year(year, day_of_year)?,
        _ => bail!("Either --date or both --year and --day-of-year must be given"),
    };

    let found = snapshot(&records, &date);
    ensure!(
        !found.is_empty(),
        "No data for {date}. Available years: {:?}",
        available_years(&records)
    );

    write_records(io::stdout().lock(), found)
}

/// Handle the `series` command.
fn handle_series_command(data_path: &Path, region: &str, since: Option<&DateKey>) -> Result<()> {
    let region = parse_region_str(region)?;
    let settings = load_settings(None)?;
    let records = load_records(data_path, &settings)?;

    write_records(io::stdout().lock(), region_series(&records, region, since))
}

/// Handle the `regions` command.
fn handle_regions_command() {
    for region in Region::iter() {
        println!("{:>2}  {region}", region.code());
    }
}
