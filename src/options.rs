use crate::date::DateResolver;
use crate::error::{Error, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_YEAR: i32 = 1900;
pub const DEFAULT_MAX_YEAR: i32 = 2099;

/// Settings shared by consolidation, comparison and statistics.
///
/// Can be loaded from TOML:
///
/// ```toml
/// min_year = 2000
/// max_year = 2099
/// today = "2024-03-01"
/// ```
///
/// When `today` is not set, the local date at the time the resolver is built
/// stands in for dates that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationOptions {
    pub min_year: i32,
    pub max_year: i32,
    pub today: Option<NaiveDate>,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        ConsolidationOptions {
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
            today: None,
        }
    }
}

impl ConsolidationOptions {
    pub fn from_toml_str(input: &str) -> Result<ConsolidationOptions> {
        let options: ConsolidationOptions = toml::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_today(mut self, today: NaiveDate) -> ConsolidationOptions {
        self.today = Some(today);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_year > self.max_year {
            return Err(Error::InvalidYearRange {
                min: self.min_year,
                max: self.max_year,
            });
        }
        Ok(())
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Builds a resolver with "today" fixed for its whole lifetime, so that
    /// one consolidation run substitutes the same date everywhere.
    pub fn resolver(&self) -> DateResolver {
        DateResolver::new(self.min_year, self.max_year, self.today())
    }
}
