//! The `metadata.toml` file written alongside the merged data.
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

const METADATA_FILE_NAME: &str = "metadata.toml";

/// Build information generated by `build.rs`
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Everything recorded about a single `run`
#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

impl<'a> Metadata<'a> {
    fn collect(data_path: &'a Path, record_count: usize) -> Result<Self> {
        Ok(Self {
            run: RunMetadata {
                data_path,
                datetime: Local::now().to_rfc2822(),
                record_count,
            },
            program: ProgramMetadata::current(),
            platform: PlatformMetadata::current()?,
        })
    }
}

#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Folder the input files were read from
    data_path: &'a Path,
    /// When the run started
    datetime: String,
    /// Number of rows in `merged.csv`
    record_count: usize,
}

#[derive(Serialize)]
struct ProgramMetadata {
    name: &'static str,
    version: &'static str,
    /// Target triple, e.g. x86_64-unknown-linux-gnu
    target: &'static str,
    is_debug: bool,
    rustc_version: &'static str,
    build_time_utc: &'static str,
    /// Short commit hash, suffixed with `-dirty` for uncommitted changes
    git_commit_hash: String,
}

impl ProgramMetadata {
    fn current() -> Self {
        let git_commit_hash = match built_info::GIT_COMMIT_HASH_SHORT {
            None => "unknown".into(),
            Some(hash) if built_info::GIT_DIRTY == Some(true) => format!("{hash}-dirty"),
            Some(hash) => hash.into(),
        };

        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash,
        }
    }
}

/// The `uname` fields of the machine doing the run
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn current() -> Result<Self> {
        let info =
            PlatformInfo::new().map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;
        let lossy = |s: &OsStr| s.to_string_lossy().into_owned();

        Ok(Self {
            sysname: lossy(info.sysname()),
            nodename: lossy(info.nodename()),
            release: lossy(info.release()),
            version: lossy(info.version()),
            machine: lossy(info.machine()),
            osname: lossy(info.osname()),
        })
    }
}

/// Write `metadata.toml` into the output folder
///
/// # Arguments
///
/// * `output_path` - Folder where the file will be saved
/// * `data_path` - Folder the input files were read from
/// * `record_count` - The number of merged records written
pub fn write_metadata(output_path: &Path, data_path: &Path, record_count: usize) -> Result<()> {
    let metadata = Metadata::collect(data_path, record_count)?;
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(())
}
