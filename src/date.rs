//! Code for normalising the date strings found in the input files.
//!
//! The two sources encode dates differently: the case-rate feed uses full `YYYY-MM-DD` dates (or,
//! in older extracts, `M/D/YYYY`) and the housing price feed uses `YYYY-MM`. All of these are
//! converted to a [`DateKey`].
use anyhow::{Context, Result, bail, ensure};
use derive_more::Display;
use itertools::Itertools;
use std::str::FromStr;

/// A calendar date as a (year, month, day) triple.
///
/// No check is made that the day actually exists in the given month.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{year}-{month}-{day}")]
pub struct DateKey {
    /// The year
    pub year: i32,
    /// The month (1-12)
    pub month: u32,
    /// The day of the month
    pub day: u32,
}

impl DateKey {
    /// Create a new [`DateKey`]
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl FromStr for DateKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

/// The shapes of date string which can be normalised, with their unparsed components.
#[derive(Debug, PartialEq)]
pub enum DateFormat<'a> {
    /// Year and month only, e.g. `2018-05`
    MonthOnly {
        /// The year component
        year: &'a str,
        /// The month component
        month: &'a str,
    },
    /// Year, month and day, e.g. `2003-05-17`
    FullDate {
        /// The year component
        year: &'a str,
        /// The month component
        month: &'a str,
        /// The day component
        day: &'a str,
    },
    /// Month, day and year separated by slashes, e.g. `1/31/2020`
    SlashDate {
        /// The year component
        year: &'a str,
        /// The month component
        month: &'a str,
        /// The day component
        day: &'a str,
    },
}

impl<'a> DateFormat<'a> {
    /// Work out which format `s` is in and split it into its components.
    pub fn classify(s: &'a str) -> Result<Self> {
        if s.contains('/') {
            let (month, day, year) = s
                .split('/')
                .collect_tuple()
                .context("Dates containing '/' must have exactly three components")?;
            return Ok(Self::SlashDate { year, month, day });
        }

        match s.split('-').collect_vec()[..] {
            [year, month] => Ok(Self::MonthOnly { year, month }),
            [year, month, day] => Ok(Self::FullDate { year, month, day }),
            _ => bail!("Dates must have two or three components separated by '-'"),
        }
    }

    /// Parse the components into a [`DateKey`].
    ///
    /// Month-only dates map onto the first day of the month.
    pub fn to_date_key(&self) -> Result<DateKey> {
        let (year, month, day) = match *self {
            Self::MonthOnly { year, month } => (year, month, "1"),
            Self::FullDate { year, month, day } | Self::SlashDate { year, month, day } => {
                (year, month, day)
            }
        };

        Ok(DateKey {
            year: parse_component(year, "year")?,
            month: parse_component(month, "month")?,
            day: parse_component(day, "day")?,
        })
    }
}

/// Parse a single numeric component of a date string
fn parse_component<T: FromStr>(s: &str, name: &str) -> Result<T> {
    s.trim()
        .parse()
        .ok()
        .with_context(|| format!("Invalid {name}: '{s}'"))
}

/// Convert a date string in any of the supported formats into a [`DateKey`].
///
/// # Arguments
///
/// * `s` - A date such as `2018-05`, `2003-05-17` or `1/31/2020`
pub fn normalize(s: &str) -> Result<DateKey> {
    DateFormat::classify(s.trim())
        .and_then(|format| format.to_date_key())
        .with_context(|| format!("Invalid date: {s}"))
}

/// The number of days in each month, as used when broadcasting monthly values onto days.
///
/// By default February always has 28 days, so the 29th of February in a leap year is never
/// covered. Setting `leap_years` gives February 29 days in leap years instead.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Calendar {
    /// Whether to give February 29 days in leap years
    pub leap_years: bool,
}

impl Calendar {
    /// Create a new [`Calendar`]
    pub fn new(leap_years: bool) -> Self {
        Self { leap_years }
    }

    /// The number of days in the given month
    pub fn days_in_month(self, year: i32, month: u32) -> Result<u32> {
        let days = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if self.leap_years && is_leap_year(year) => 29,
            2 => 28,
            _ => bail!("Invalid month: {month}"),
        };

        Ok(days)
    }

    /// The number of days in the given year
    pub fn days_in_year(self, year: i32) -> u32 {
        if self.leap_years && is_leap_year(year) {
            366
        } else {
            365
        }
    }

    /// Iterate over every day of the given month
    pub fn iter_days(self, year: i32, month: u32) -> Result<impl Iterator<Item = DateKey>> {
        let days = self.days_in_month(year, month)?;
        Ok((1..=days).map(move |day| DateKey::new(year, month, day)))
    }

    /// Convert a 1-based day of the year into a [`DateKey`]
    pub fn date_from_day_of_year(self, year: i32, day_of_year: u32) -> Result<DateKey> {
        let days_in_year = self.days_in_year(year);
        ensure!(
            (1..=days_in_year).contains(&day_of_year),
            "Day of year must be between 1 and {days_in_year}"
        );

        let mut day = day_of_year;
        for month in 1..=12 {
            let days_in_month = self.days_in_month(year, month)?;
            if day <= days_in_month {
                return Ok(DateKey::new(year, month, day));
            }
            day -= days_in_month;
        }

        unreachable!("Month lengths should sum to the length of the year")
    }
}

/// Whether `year` is a leap year in the Gregorian calendar
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
