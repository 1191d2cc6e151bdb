//! The merged data set of daily, per-region metrics.
//!
//! Observations from both sources are folded into a [`MergedDatasetBuilder`], which is then
//! finalised into an immutable [`MergedDataset`]. All case-rate observations must be applied
//! before any housing price observations, so that monthly values are broadcast onto days which
//! may already carry case rates.
use crate::date::{Calendar, DateKey};
use crate::region::Region;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use strum::IntoEnumIterator;

/// The three metrics recorded for a single region on a single day.
///
/// Any metric not provided by the source which created the record is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricRecord {
    /// Total cases plus deaths per 100,000 population
    pub total_per_100k: f64,
    /// Currently active cases per 100,000 population
    pub active_per_100k: f64,
    /// Housing price index
    pub hpi: f64,
}

/// A single day's case rates for one region
#[derive(Clone, Debug, PartialEq)]
pub struct CaseRateObservation {
    /// The region observed
    pub region: Region,
    /// The day observed
    pub date: DateKey,
    /// Total cases plus deaths per 100,000 population
    pub total_per_100k: f64,
    /// Currently active cases per 100,000 population
    pub active_per_100k: f64,
}

/// A single month's housing price index for one region
#[derive(Clone, Debug, PartialEq)]
pub struct HousePriceObservation {
    /// The region observed
    pub region: Region,
    /// The year observed
    pub year: i32,
    /// The month observed
    pub month: u32,
    /// The index value
    pub hpi: f64,
}

/// An observation from either of the input sources
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    /// A daily case-rate observation
    CaseRate(CaseRateObservation),
    /// A monthly housing price observation
    HousePrice(HousePriceObservation),
}

/// Metric records for one region, keyed by date in insertion order
pub type RegionSeries = IndexMap<DateKey, MetricRecord>;

/// Accumulates observations into a [`MergedDataset`].
#[derive(Debug, Default)]
pub struct MergedDatasetBuilder {
    calendar: Calendar,
    regions: IndexMap<Region, RegionSeries>,
    house_prices_started: bool,
}

impl MergedDatasetBuilder {
    /// Create a new, empty builder
    pub fn new(calendar: Calendar) -> Self {
        Self {
            calendar,
            ..Default::default()
        }
    }

    /// Get the record for the given key, creating it with all metrics zero if needed
    fn record_mut(&mut self, region: Region, date: DateKey) -> &mut MetricRecord {
        self.regions
            .entry(region)
            .or_default()
            .entry(date)
            .or_default()
    }

    /// Fold a single observation into the data set.
    ///
    /// A case-rate observation sets both rate fields of the record for that day, overwriting any
    /// earlier observation for the same day. A housing price observation sets the index value for
    /// every day of its month, leaving rate fields untouched.
    pub fn apply(&mut self, observation: &Observation) -> Result<()> {
        match observation {
            Observation::CaseRate(obs) => {
                ensure!(
                    !self.house_prices_started,
                    "Case-rate observations must be applied before housing price observations"
                );

                let record = self.record_mut(obs.region, obs.date);
                record.total_per_100k = obs.total_per_100k;
                record.active_per_100k = obs.active_per_100k;
            }
            Observation::HousePrice(obs) => {
                self.house_prices_started = true;
                for date in self.calendar.iter_days(obs.year, obs.month)? {
                    self.record_mut(obs.region, date).hpi = obs.hpi;
                }
            }
        }

        Ok(())
    }

    /// Finalise the data set
    pub fn finish(self) -> MergedDataset {
        MergedDataset {
            regions: self.regions,
        }
    }
}

/// The merged data set: at most one [`MetricRecord`] per region per day.
#[derive(Debug, Default, PartialEq)]
pub struct MergedDataset {
    regions: IndexMap<Region, RegionSeries>,
}

impl MergedDataset {
    /// Get the record for the given region and day, if there is one
    pub fn get(&self, region: Region, date: &DateKey) -> Option<&MetricRecord> {
        self.regions.get(&region)?.get(date)
    }

    /// The total number of records
    pub fn len(&self) -> usize {
        self.regions.values().map(IndexMap::len).sum()
    }

    /// Whether the data set has no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all records, region by region in enumeration order, then in insertion order
    pub fn iter_records(&self) -> impl Iterator<Item = (Region, &DateKey, &MetricRecord)> {
        Region::iter().flat_map(move |region| {
            self.regions
                .get(&region)
                .into_iter()
                .flatten()
                .map(move |(date, record)| (region, date, record))
        })
    }

    /// Project the data set onto a flat list of records
    pub fn flatten(&self) -> Vec<FlatRecord> {
        self.iter_records()
            .map(|(region, date, record)| FlatRecord::new(region, *date, record))
            .collect()
    }
}

/// A single row of the flattened data set, ready for display
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRecord {
    /// Numeric code of the region
    pub region_code: u32,
    /// The day
    pub date: DateKey,
    /// The day formatted as `year-month-day` without zero padding
    pub string_date: String,
    /// Housing price index
    pub hpi: f64,
    /// Total cases plus deaths per 100,000 population
    pub total_per_100k: f64,
    /// Currently active cases per 100,000 population
    pub active_per_100k: f64,
}

impl FlatRecord {
    /// Create a new [`FlatRecord`]
    pub fn new(region: Region, date: DateKey, record: &MetricRecord) -> Self {
        Self {
            region_code: region.code(),
            date,
            string_date: date.to_string(),
            hpi: record.hpi,
            total_per_100k: record.total_per_100k,
            active_per_100k: record.active_per_100k,
        }
    }
}
