use std::sync::LazyLock;

use regex::Regex;

use crate::types::Endpoint;

#[derive(Debug, thiserror::Error)]
pub enum PageRefError {
    #[error("URL has no 'opcao' parameter: {0}")]
    MissingOption(String),
    #[error("Unknown option '{option}' in URL: {url}")]
    UnknownOption { option: String, url: String },
    #[error("URL has no 'ano' parameter: {0}")]
    MissingYear(String),
}

static RE_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]opcao=([^&#]+)").expect("invalid regex: opcao"));

static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]ano=(\d{4})(?:[&#]|$)").expect("invalid regex: ano"));

/// Identifies one yearly table page on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef {
    pub endpoint: Endpoint,
    pub year: i32,
}

impl PageRef {
    pub fn new(endpoint: Endpoint, year: i32) -> Self {
        Self { endpoint, year }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}&ano={}", base_url, self.endpoint.query(), self.year)
    }

    pub fn from_url(url: &str) -> Result<Self, PageRefError> {
        let option = RE_OPTION
            .captures(url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| PageRefError::MissingOption(url.to_string()))?;
        let endpoint =
            Endpoint::from_option(&option).ok_or_else(|| PageRefError::UnknownOption {
                option,
                url: url.to_string(),
            })?;
        let year = RE_YEAR
            .captures(url)
            .and_then(|caps| caps[1].parse::<i32>().ok())
            .ok_or_else(|| PageRefError::MissingYear(url.to_string()))?;

        Ok(Self { endpoint, year })
    }
}
