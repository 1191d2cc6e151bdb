//! Code for reading daily case rates from a CSV file.
use super::*;
use crate::dataset::{CaseRateObservation, MergedDatasetBuilder, Observation};
use crate::date::normalize;
use crate::region::Region;
use log::debug;
use serde::Deserialize;

const CASE_RATES_FILE_NAME: &str = "covid19-download.csv";

/// A row of the case-rate file.
///
/// Only the columns needed are read; the rest are ignored. Values are kept as strings until the
/// region has been checked, so rows for other regions are never parsed.
#[derive(Debug, Deserialize, PartialEq)]
struct CaseRateRaw {
    #[serde(rename = "prname")]
    region: String,
    date: String,
    /// Total cases plus deaths per 100,000 population
    #[serde(rename = "ratetotal")]
    total_per_100k: String,
    /// Currently active cases per 100,000 population
    #[serde(rename = "rateactive")]
    active_per_100k: String,
}

impl CaseRateRaw {
    /// Convert to an observation, or `None` if the row is for a region we don't know about
    fn into_observation(self) -> Result<Option<CaseRateObservation>> {
        let Some(region) = Region::from_name(&self.region) else {
            return Ok(None);
        };

        let date = normalize(&self.date)?;
        let total_per_100k = parse_optional_f64(&self.total_per_100k, "ratetotal")?
            .with_context(|| format!("Missing ratetotal for {region} on {date}"))?;
        let active_per_100k = parse_optional_f64(&self.active_per_100k, "rateactive")?
            .with_context(|| format!("Missing rateactive for {region} on {date}"))?;

        Ok(Some(CaseRateObservation {
            region,
            date,
            total_per_100k,
            active_per_100k,
        }))
    }
}

/// Read case rates from the data directory into `builder`.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input files
/// * `builder` - The data set being built
pub fn read_case_rates(data_dir: &Path, builder: &mut MergedDatasetBuilder) -> Result<()> {
    let file_path = data_dir.join(CASE_RATES_FILE_NAME);
    let case_rates_csv = read_csv(&file_path)?;
    let count = read_case_rates_from_iter(case_rates_csv, builder)
        .with_context(|| input_err_msg(&file_path))?;
    info!("Read {count} case-rate rows from {}", file_path.display());

    Ok(())
}

/// Apply case-rate rows to `builder`, returning the number of rows retained.
///
/// Rows for unrecognised regions are skipped.
fn read_case_rates_from_iter<I>(iter: I, builder: &mut MergedDatasetBuilder) -> Result<usize>
where
    I: Iterator<Item = CaseRateRaw>,
{
    let mut retained = 0;
    let mut skipped = 0;
    for raw in iter {
        let Some(observation) = raw.into_observation()? else {
            skipped += 1;
            continue;
        };

        builder.apply(&Observation::CaseRate(observation))?;
        retained += 1;
    }

    debug!("Skipped {skipped} case-rate rows for unrecognised regions");

    Ok(retained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;
    use crate::fixture::{assert_error, write_file};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::iter;
    use tempfile::tempdir;

    fn raw(region: &str, date: &str, total: f64, active: f64) -> CaseRateRaw {
        CaseRateRaw {
            region: region.into(),
            date: date.into(),
            total_per_100k: total.to_string(),
            active_per_100k: active.to_string(),
        }
    }

    #[test]
    fn test_read_case_rates_from_iter() {
        let mut builder = MergedDatasetBuilder::default();
        let rows = [
            raw("Ontario", "2020-03-15", 100.0, 50.0),
            raw("Quebec", "3/16/2020", 10.0, 5.0),
        ];
        assert_eq!(
            read_case_rates_from_iter(rows.into_iter(), &mut builder).unwrap(),
            2
        );

        let dataset = builder.finish();
        assert_eq!(dataset.len(), 2);
        let record = dataset
            .get(Region::Quebec, &DateKey::new(2020, 3, 16))
            .unwrap();
        assert_approx_eq!(f64, record.total_per_100k, 10.0);
        assert_approx_eq!(f64, record.active_per_100k, 5.0);
        assert_approx_eq!(f64, record.hpi, 0.0);
    }

    #[rstest]
    #[case("Canada")]
    #[case("Repatriated travellers")]
    fn test_read_case_rates_from_iter_unknown_region(#[case] region: &str) {
        let mut builder = MergedDatasetBuilder::default();
        let row = raw(region, "2020-03-15", 100.0, 50.0);
        assert_eq!(
            read_case_rates_from_iter(iter::once(row), &mut builder).unwrap(),
            0
        );
        assert!(builder.finish().is_empty());
    }

    #[test]
    fn test_read_case_rates_from_iter_unknown_region_bad_date() {
        // Rows for other regions are dropped before their dates are looked at
        let mut builder = MergedDatasetBuilder::default();
        let row = raw("Canada", "not a date", 100.0, 50.0);
        assert!(read_case_rates_from_iter(iter::once(row), &mut builder).is_ok());
    }

    #[rstest]
    #[case("n/a", "n/a")]
    #[case("", "")]
    fn test_read_case_rates_from_iter_unknown_region_bad_values(
        #[case] total: &str,
        #[case] active: &str,
    ) {
        let mut builder = MergedDatasetBuilder::default();
        let row = CaseRateRaw {
            total_per_100k: total.into(),
            active_per_100k: active.into(),
            ..raw("Canada", "2020-03-15", 0.0, 0.0)
        };
        assert_eq!(
            read_case_rates_from_iter(iter::once(row), &mut builder).unwrap(),
            0
        );
    }

    #[test]
    fn test_read_case_rates_from_iter_padded_region() {
        // Region names must match exactly
        let mut builder = MergedDatasetBuilder::default();
        let row = raw(" Ontario ", "2020-03-15", 100.0, 50.0);
        assert_eq!(
            read_case_rates_from_iter(iter::once(row), &mut builder).unwrap(),
            0
        );
    }

    #[test]
    fn test_read_case_rates_from_iter_bad_value() {
        let mut builder = MergedDatasetBuilder::default();
        let row = CaseRateRaw {
            active_per_100k: "n/a".into(),
            ..raw("Ontario", "2020-03-15", 100.0, 50.0)
        };
        assert_error!(
            read_case_rates_from_iter(iter::once(row), &mut builder),
            "Invalid rateactive: 'n/a'"
        );
    }

    #[test]
    fn test_read_case_rates_from_iter_bad_date() {
        let mut builder = MergedDatasetBuilder::default();
        let row = raw("Ontario", "2020/03/15/1", 100.0, 50.0);
        assert_error!(
            read_case_rates_from_iter(iter::once(row), &mut builder),
            "Invalid date: 2020/03/15/1"
        );
    }

    #[test]
    fn test_read_case_rates_from_iter_missing_value() {
        let mut builder = MergedDatasetBuilder::default();
        let row = CaseRateRaw {
            total_per_100k: String::new(),
            ..raw("Ontario", "2020-03-15", 100.0, 50.0)
        };
        assert_error!(
            read_case_rates_from_iter(iter::once(row), &mut builder),
            "Missing ratetotal for Ontario on 2020-3-15"
        );
    }

    #[test]
    fn test_read_case_rates() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            CASE_RATES_FILE_NAME,
            "pruid,prname,prnameFR,date,ratetotal,rateactive
35,Ontario,Ontario,2020-03-15,100.0,50.0
1,Canada,Canada,2020-03-15,n/a,n/a
99,Repatriated travellers,Voyageurs rapatriés,2020-03-15,,
35,Ontario,Ontario,2020-03-16,110.5,55.25
",
        );

        let mut builder = MergedDatasetBuilder::default();
        read_case_rates(dir.path(), &mut builder).unwrap();
        let flat = builder.finish().flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].string_date, "2020-3-16");
        assert_approx_eq!(f64, flat[1].total_per_100k, 110.5);
        assert_approx_eq!(f64, flat[1].active_per_100k, 55.25);
    }

    #[test]
    fn test_read_case_rates_header_only() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            CASE_RATES_FILE_NAME,
            "pruid,prname,prnameFR,date,ratetotal,rateactive\n",
        );

        let mut builder = MergedDatasetBuilder::default();
        read_case_rates(dir.path(), &mut builder).unwrap();
        assert!(builder.finish().is_empty());
    }

    #[test]
    fn test_read_case_rates_missing_file() {
        let dir = tempdir().unwrap();
        let mut builder = MergedDatasetBuilder::default();
        assert_error!(
            read_case_rates(dir.path(), &mut builder),
            input_err_msg(dir.path().join(CASE_RATES_FILE_NAME))
        );
    }
}
