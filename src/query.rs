//! Read-only views over the flattened data set.
//!
//! The flattened records are in region-then-insertion order, so anything wanting chronological
//! order has to sort explicitly, which is what these helpers do.
use crate::dataset::FlatRecord;
use crate::date::DateKey;
use crate::region::Region;
use itertools::Itertools;

/// The distinct years present in `records`, in ascending order
pub fn available_years(records: &[FlatRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|record| record.date.year)
        .unique()
        .sorted()
        .collect()
}

/// Every record on the given day, in flattened order
pub fn snapshot<'a>(records: &'a [FlatRecord], date: &DateKey) -> Vec<&'a FlatRecord> {
    records
        .iter()
        .filter(|record| record.date == *date)
        .collect()
}

/// The records for a single region in chronological order.
///
/// If `since` is given, only records strictly after that day are included.
pub fn region_series<'a>(
    records: &'a [FlatRecord],
    region: Region,
    since: Option<&DateKey>,
) -> Vec<&'a FlatRecord> {
    records
        .iter()
        .filter(|record| record.region_code == region.code())
        .filter(|record| since.is_none_or(|since| record.date > *since))
        .sorted_by_key(|record| record.date)
        .collect()
}
