use std::str::FromStr;
use std::time::Duration;

use chrono::{Datelike, Local};

use crate::utils::{YearRange, YearRangeError};

pub const BASE_URL: &str = "http://vitibrasil.cnpuv.embrapa.br/index.php?";
pub const FIRST_YEAR: i32 = 1970;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Everything up to and including the `?` of the site's index page.
    pub base_url: String,
    pub timeout: Duration,
    pub first_year: i32,
    /// Last year to scrape, the current calendar year when unset.
    pub last_year: Option<i32>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            first_year: FIRST_YEAR,
            last_year: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring invalid value for {key}: {raw:?}");
            None
        }
    }
}

impl ScraperConfig {
    /// Reads overrides from `VITIBRASIL_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("VITIBRASIL_BASE_URL").unwrap_or(defaults.base_url),
            timeout: env_or("VITIBRASIL_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            first_year: env_or("VITIBRASIL_FIRST_YEAR").unwrap_or(defaults.first_year),
            last_year: env_or("VITIBRASIL_LAST_YEAR").or(defaults.last_year),
        }
    }

    /// Rejects a configured range that would scrape no year at all.
    pub fn validate(self) -> Result<Self, YearRangeError> {
        self.year_range().validate()?;
        Ok(self)
    }

    pub fn year_range(&self) -> YearRange {
        YearRange {
            start: self.first_year,
            end: self.last_year.unwrap_or_else(current_year),
        }
    }
}

pub fn current_year() -> i32 {
    Local::now().year()
}
