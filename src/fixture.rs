//! Fixtures for tests
use crate::dataset::{CaseRateObservation, HousePriceObservation, Observation};
use crate::date::DateKey;
use crate::region::Region;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a case-rate observation
pub fn case_rate(
    region: Region,
    (year, month, day): (i32, u32, u32),
    total_per_100k: f64,
    active_per_100k: f64,
) -> Observation {
    Observation::CaseRate(CaseRateObservation {
        region,
        date: DateKey::new(year, month, day),
        total_per_100k,
        active_per_100k,
    })
}

/// Create a housing price observation
pub fn house_price(region: Region, year: i32, month: u32, hpi: f64) -> Observation {
    Observation::HousePrice(HousePriceObservation {
        region,
        year,
        month,
        hpi,
    })
}

/// Write `contents` to a file called `file_name` in `dir_path`
pub fn write_file(dir_path: &Path, file_name: &str, contents: &str) {
    let mut file = File::create(dir_path.join(file_name)).unwrap();
    write!(file, "{contents}").unwrap();
}
