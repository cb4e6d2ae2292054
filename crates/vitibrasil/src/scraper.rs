use crate::config::ScraperConfig;
use crate::page::{PageRef, PageRefError};
use crate::parser::{ParseError, parse_year_page};
use crate::types::{Endpoint, Record};
use crate::utils::YearRange;

use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Error fetching data from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("An unexpected error occurred while parsing {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum PageUrlError {
    #[error(transparent)]
    PageRef(#[from] PageRefError),
    #[error(transparent)]
    Scraper(#[from] ScraperError),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    config: ScraperConfig,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(ScraperError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Single GET, no retries. Any non-2xx status is a failure.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        let http_error = |source| ScraperError::Http {
            url: url.to_string(),
            source,
        };

        self.client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))
            .map_err(http_error)?
            .error_for_status()
            .map_err(http_error)?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))
            .map_err(http_error)
    }

    async fn fetch_page_ref(&self, page: PageRef) -> Result<Option<Vec<Record>>, ScraperError> {
        let url = page.url(&self.config.base_url);
        log::debug!("Fetching {url}");

        let html = self.fetch_page(&url).await?;
        parse_year_page(&html, page.endpoint, page.year)
            .map_err(|source| ScraperError::Parse { url, source })
    }

    /// Records for one year, `None` when the year has no qualifying rows.
    pub async fn fetch_year(
        &self,
        endpoint: Endpoint,
        year: i32,
    ) -> Result<Option<Vec<Record>>, ScraperError> {
        self.fetch_page_ref(PageRef::new(endpoint, year)).await
    }

    /// Scrapes a page given its full site URL, endpoint and year are read
    /// back from the query string.
    pub async fn fetch_url(&self, url: &str) -> Result<Option<Vec<Record>>, PageUrlError> {
        let page = PageRef::from_url(url)?;
        let html = self.fetch_page(url).await?;
        parse_year_page(&html, page.endpoint, page.year)
            .map_err(|source| {
                ScraperError::Parse {
                    url: url.to_string(),
                    source,
                }
                .into()
            })
    }

    /// Walks `range` in ascending order, one year at a time. The first
    /// failing year aborts the whole run and nothing is returned.
    pub async fn fetch_years(
        &self,
        endpoint: Endpoint,
        range: YearRange,
    ) -> Result<Vec<Record>, ScraperError> {
        log::info!(
            "Fetching {endpoint} from {} to {}...",
            range.start,
            range.end
        );

        let mut records = Vec::new();
        for year in range.years() {
            match self.fetch_year(endpoint, year).await? {
                Some(year_records) => records.extend(year_records),
                None => log::debug!("{endpoint} {year}: no data, skipping"),
            }
        }

        log::info!("Fetched {} {endpoint} record(s)", records.len());
        Ok(records)
    }

    pub async fn fetch_all_years(&self, endpoint: Endpoint) -> Result<Vec<Record>, ScraperError> {
        self.fetch_years(endpoint, self.config.year_range()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Duration;

    fn unreachable_config() -> ScraperConfig {
        // Bind then drop to get a local port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        ScraperConfig {
            base_url: format!("http://127.0.0.1:{port}/index.php?"),
            timeout: Duration::from_secs(2),
            first_year: 2000,
            last_year: Some(2001),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_names_the_url() {
        let scraper = WebScraper::with_config(unreachable_config()).unwrap();

        let err = scraper
            .fetch_year(Endpoint::Producao, 2000)
            .await
            .unwrap_err();

        assert!(matches!(err, ScraperError::Http { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Error fetching data from http://127.0.0.1:"));
        assert!(message.contains("opcao=opt_02&ano=2000"));
    }

    #[tokio::test]
    async fn test_range_aborts_on_first_failure() {
        let scraper = WebScraper::with_config(unreachable_config()).unwrap();
        let err = scraper
            .fetch_all_years(Endpoint::Importacao)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("opcao=opt_05&ano=2000"));
    }

    #[tokio::test]
    async fn test_fetch_url_rejects_unknown_pages_before_any_request() {
        let scraper = WebScraper::with_config(unreachable_config()).unwrap();
        let err = scraper
            .fetch_url("http://127.0.0.1:1/index.php?opcao=opt_09&ano=2000")
            .await
            .unwrap_err();
        assert!(matches!(err, PageUrlError::PageRef(_)));
    }
}
