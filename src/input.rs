//! Common routines for handling input data.
use crate::dataset::{MergedDataset, MergedDatasetBuilder};
use crate::date::Calendar;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod case_rate;
use case_rate::read_case_rates;
pub mod house_price;
use house_price::read_house_prices;

/// Read a series of type `T`s from a CSV file.
///
/// The whole file is read before any rows are returned, so a malformed row anywhere in the file
/// is reported before any data are used. Fields are not trimmed and a file with only a header
/// yields no rows.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = csv::Reader::from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec.into_iter())
}

/// Parse a numeric field, returning `None` if it is empty.
///
/// # Arguments
///
/// * `s` - The field's contents
/// * `name` - The column name, for error messages
pub fn parse_optional_f64(s: &str, name: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let value = s
        .parse()
        .ok()
        .with_context(|| format!("Invalid {name}: '{s}'"))?;
    Ok(Some(value))
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read both input files from the data directory and merge them.
///
/// The case-rate file is read and applied in full before the housing price file is opened.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input files
/// * `calendar` - Month lengths to use when broadcasting monthly values onto days
pub fn load_dataset(data_dir: &Path, calendar: Calendar) -> Result<MergedDataset> {
    let mut builder = MergedDatasetBuilder::new(calendar);
    read_case_rates(data_dir, &mut builder)?;
    read_house_prices(data_dir, &mut builder)?;
    let dataset = builder.finish();
    info!("Merged data set contains {} daily records", dataset.len());

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, write_file};
    use rstest::rstest;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "test.csv", "id,value\nhello,1\nworld,2\n");
        let records: Vec<Record> = read_csv(&dir.path().join("test.csv")).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );
    }

    #[test]
    fn test_read_csv_header_only() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "test.csv", "id,value\n");
        let file_path = dir.path().join("test.csv");
        let records = read_csv::<Record>(&file_path).unwrap();
        assert_eq!(records.count(), 0);
    }

    #[test]
    fn test_read_csv_untrimmed() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "test.csv", "id,value\n hello ,1\n");
        let records: Vec<Record> = read_csv(&dir.path().join("test.csv")).unwrap().collect();
        assert_eq!(records[0].id, " hello ");
    }

    #[test]
    fn test_read_csv_missing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.csv");
        assert_error!(
            read_csv::<Record>(&file_path).map(Iterator::count),
            input_err_msg(&file_path)
        );
    }

    #[test]
    fn test_read_csv_malformed() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");
        write_file(dir.path(), "test.csv", "id,value\nhello,1\nworld,x\n");
        assert_error!(
            read_csv::<Record>(&file_path).map(Iterator::count),
            input_err_msg(&file_path)
        );
    }

    #[rstest]
    #[case("1.5", Some(1.5))]
    #[case(" 2 ", Some(2.0))]
    #[case("", None)]
    #[case("  ", None)]
    fn test_parse_optional_f64(#[case] s: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_optional_f64(s, "VALUE").unwrap(), expected);
    }

    #[test]
    fn test_parse_optional_f64_invalid() {
        assert_error!(parse_optional_f64("n/a", "VALUE"), "Invalid VALUE: 'n/a'");
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "test.toml", "id = \"hello\"\nvalue = 1\n");
        assert_eq!(
            read_toml::<Record>(&dir.path().join("test.toml")).unwrap(),
            Record {
                id: "hello".to_string(),
                value: 1,
            }
        );
    }
}
