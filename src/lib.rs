//! Common functionality for CovHPI.
//!
//! CovHPI merges a daily, per-region case-rate feed with a monthly, per-region housing price index
//! feed into one data set of daily records, each carrying three aligned metrics.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod dataset;
pub mod date;
pub mod input;
pub mod log;
pub mod output;
pub mod query;
pub mod region;
pub mod settings;

#[cfg(test)]
mod fixture;

/// Get the path to the folder where per-user configuration for CovHPI is stored.
///
/// Falls back on the current working directory if the platform has no config dir.
pub fn get_covhpi_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::default();
    };
    dir.push("covhpi");
    dir
}
