//! The module responsible for writing output data to disk.
use crate::dataset::FlatRecord;
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which data-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "covhpi_results";

/// The output file name for the merged data set
const MERGED_FILE_NAME: &str = "merged.csv";

/// Get the default output directory for the specified data directory
pub fn get_output_dir(data_dir: &Path) -> Result<PathBuf> {
    // canonicalise in case the user has specified "."
    let data_dir = data_dir
        .canonicalize()
        .context("Could not resolve path to data")?;

    let data_name = data_dir
        .file_name()
        .context("Data cannot be in root folder")?
        .to_str()
        .context("Invalid chars in data dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, data_name].iter().collect())
}

/// Create a new output directory, returning whether an existing one is being overwritten.
///
/// # Arguments
///
/// * `output_dir` - The folder to create
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it if allowed and it contains files
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the merged data set CSV file
#[derive(Serialize, Debug, PartialEq)]
struct MergedRow<'a> {
    region_code: u32,
    year: i32,
    month: u32,
    day: u32,
    string_date: &'a str,
    hpi: f64,
    total_per_100k: f64,
    active_per_100k: f64,
}

impl<'a> From<&'a FlatRecord> for MergedRow<'a> {
    fn from(record: &'a FlatRecord) -> Self {
        Self {
            region_code: record.region_code,
            year: record.date.year,
            month: record.date.month,
            day: record.date.day,
            string_date: &record.string_date,
            hpi: record.hpi,
            total_per_100k: record.total_per_100k,
            active_per_100k: record.active_per_100k,
        }
    }
}

/// Write flattened records as CSV to any writer
pub fn write_records<'a, W, I>(writer: W, records: I) -> Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a FlatRecord>,
{
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(MergedRow::from(record))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the merged data set to the output folder
///
/// # Arguments
///
/// * `output_path` - Folder where the file will be saved
/// * `records` - The flattened data set
pub fn write_merged(output_path: &Path, records: &[FlatRecord]) -> Result<()> {
    let file_path = output_path.join(MERGED_FILE_NAME);
    let file = fs::File::create(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    write_records(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MetricRecord;
    use crate::date::DateKey;
    use crate::region::Region;
    use tempfile::tempdir;

    #[test]
    fn test_write_records() {
        let record = MetricRecord {
            total_per_100k: 100.0,
            active_per_100k: 50.5,
            hpi: 500.0,
        };
        let records = [FlatRecord::new(
            Region::Ontario,
            DateKey::new(2020, 3, 15),
            &record,
        )];

        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "region_code,year,month,day,string_date,hpi,total_per_100k,active_per_100k\n\
            11,2020,3,15,2020-3-15,500.0,100.0,50.5\n"
        );
    }

    #[test]
    fn test_write_merged() {
        let dir = tempdir().unwrap();
        write_merged(dir.path(), &[]).unwrap();
        assert!(dir.path().join(MERGED_FILE_NAME).is_file());
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("new_folder");

        // Create a new directory should succeed
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("empty_folder");
        fs::create_dir(&output_dir).unwrap();

        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("folder_with_files");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("existing_file.txt"), "some content").unwrap();

        // Should fail when overwrite is not allowed
        assert!(create_output_directory(&output_dir, false).is_err());

        // Should succeed and report the overwrite when allowed
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(output_dir.is_dir());
        assert!(!output_dir.join("existing_file.txt").exists());
    }
}
