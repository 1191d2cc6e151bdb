//! Regions are the Canadian provinces and territories for which data are merged.
use anyhow::{Context, Result};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One of the provinces or territories of Canada.
///
/// The enumeration order is the order in which regions appear in the flattened output. Any region
/// name in the input files which does not correspond to a variant (e.g. "Canada" or "Repatriated
/// travellers") is ignored.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Region {
    #[strum(to_string = "Ontario")]
    Ontario,
    #[strum(to_string = "British Columbia")]
    BritishColumbia,
    #[strum(to_string = "Quebec")]
    Quebec,
    #[strum(to_string = "Manitoba")]
    Manitoba,
    #[strum(to_string = "Nova Scotia")]
    NovaScotia,
    #[strum(to_string = "Newfoundland and Labrador")]
    NewfoundlandAndLabrador,
    #[strum(to_string = "New Brunswick")]
    NewBrunswick,
    #[strum(to_string = "Saskatchewan")]
    Saskatchewan,
    #[strum(to_string = "Yukon")]
    Yukon,
    #[strum(to_string = "Alberta")]
    Alberta,
    #[strum(to_string = "Prince Edward Island")]
    PrinceEdwardIsland,
    #[strum(to_string = "Northwest Territories")]
    NorthwestTerritories,
    #[strum(to_string = "Nunavut")]
    Nunavut,
}

impl Region {
    /// The numeric code for the region, as used in the boundary geometry
    pub fn code(self) -> u32 {
        match self {
            Self::Quebec => 1,
            Self::NovaScotia => 2,
            Self::Saskatchewan => 3,
            Self::Alberta => 4,
            Self::NewfoundlandAndLabrador => 5,
            Self::BritishColumbia => 6,
            Self::NewBrunswick => 7,
            Self::PrinceEdwardIsland => 8,
            Self::Yukon => 9,
            Self::Manitoba => 10,
            Self::Ontario => 11,
            Self::Nunavut => 12,
            Self::NorthwestTerritories => 13,
        }
    }

    /// Look up a region by its exact name, returning `None` if it isn't one of ours
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Look up a region by its numeric code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::iter().find(|region| region.code() == code)
    }
}

/// Parse a region given on the command line, either as a name or a numeric code.
pub fn parse_region_str(s: &str) -> Result<Region> {
    let s = s.trim();
    let region = match s.parse::<u32>() {
        Ok(code) => Region::from_code(code),
        Err(_) => Region::from_name(s),
    };

    region.with_context(|| format!("Unknown region: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use itertools::Itertools;
    use rstest::rstest;

    #[test]
    fn test_codes_unique() {
        let codes = Region::iter().map(Region::code).sorted().collect_vec();
        assert_eq!(codes, (1..=13).collect_vec());
    }

    #[rstest]
    #[case("Ontario", Some(Region::Ontario))]
    #[case("Prince Edward Island", Some(Region::PrinceEdwardIsland))]
    #[case("Canada", None)]
    #[case("Repatriated travellers", None)]
    #[case("ontario", None)] // names must match exactly
    fn test_from_name(#[case] name: &str, #[case] expected: Option<Region>) {
        assert_eq!(Region::from_name(name), expected);
    }

    #[test]
    fn test_from_code_round_trip() {
        for region in Region::iter() {
            assert_eq!(Region::from_code(region.code()), Some(region));
        }
        assert_eq!(Region::from_code(0), None);
        assert_eq!(Region::from_code(14), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Region::NewfoundlandAndLabrador.to_string(),
            "Newfoundland and Labrador"
        );
    }

    #[rstest]
    #[case("11", Region::Ontario)]
    #[case(" Yukon ", Region::Yukon)]
    #[case("6", Region::BritishColumbia)]
    fn test_parse_region_str(#[case] s: &str, #[case] expected: Region) {
        assert_eq!(parse_region_str(s).unwrap(), expected);
    }

    #[rstest]
    #[case("Canada")]
    #[case("42")]
    fn test_parse_region_str_invalid(#[case] s: &str) {
        assert_error!(parse_region_str(s), format!("Unknown region: {s}"));
    }
}
