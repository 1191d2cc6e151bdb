//! Code for reading monthly housing price indexes from a CSV file.
use super::*;
use crate::dataset::{HousePriceObservation, MergedDatasetBuilder, Observation};
use crate::date::normalize;
use crate::region::Region;
use log::debug;
use serde::Deserialize;

const HOUSE_PRICES_FILE_NAME: &str = "18100205.csv";

/// The only housing category which is retained. Others (e.g. "Land only") are ignored.
pub const HOUSE_PRICE_CATEGORY: &str = "House only";

/// A row of the housing price file
#[derive(Debug, Deserialize, PartialEq)]
struct HousePriceRaw {
    #[serde(rename = "REF_DATE")]
    date: String,
    #[serde(rename = "GEO")]
    region: String,
    #[serde(rename = "New housing price indexes")]
    category: String,
    /// The index value, which is sometimes missing. Only parsed for retained rows.
    #[serde(rename = "VALUE")]
    value: String,
}

impl HousePriceRaw {
    /// Convert to an observation, or `None` if the row isn't for a known region and category.
    ///
    /// Missing values are treated as zero.
    fn into_observation(self) -> Result<Option<HousePriceObservation>> {
        let Some(region) = Region::from_name(&self.region) else {
            return Ok(None);
        };
        if self.category != HOUSE_PRICE_CATEGORY {
            return Ok(None);
        }

        // Only the year and month are used
        let date = normalize(&self.date)?;
        let hpi = parse_optional_f64(&self.value, "VALUE")?.unwrap_or(0.0);
        Ok(Some(HousePriceObservation {
            region,
            year: date.year,
            month: date.month,
            hpi,
        }))
    }
}

/// Read housing price indexes from the data directory into `builder`.
///
/// Each monthly value is applied to every day in its month.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the input files
/// * `builder` - The data set being built
pub fn read_house_prices(data_dir: &Path, builder: &mut MergedDatasetBuilder) -> Result<()> {
    let file_path = data_dir.join(HOUSE_PRICES_FILE_NAME);
    let house_prices_csv = read_csv(&file_path)?;
    let count = read_house_prices_from_iter(house_prices_csv, builder)
        .with_context(|| input_err_msg(&file_path))?;
    info!(
        "Read {count} monthly housing price rows from {}",
        file_path.display()
    );

    Ok(())
}

/// Apply housing price rows to `builder`, returning the number of rows retained
fn read_house_prices_from_iter<I>(iter: I, builder: &mut MergedDatasetBuilder) -> Result<usize>
where
    I: Iterator<Item = HousePriceRaw>,
{
    let mut retained = 0;
    let mut skipped = 0;
    let mut missing = 0;
    for raw in iter {
        let value_missing = raw.value.trim().is_empty();
        let Some(observation) = raw.into_observation()? else {
            skipped += 1;
            continue;
        };

        builder.apply(&Observation::HousePrice(observation))?;
        retained += 1;
        if value_missing {
            missing += 1;
        }
    }

    debug!("Skipped {skipped} housing price rows for other regions or categories");
    debug!("{missing} housing price rows had no value and were treated as zero");

    Ok(retained)
}
