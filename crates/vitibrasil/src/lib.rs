pub mod config;
pub mod page;
pub mod parser;
pub mod scraper;
pub mod types;
pub mod utils;

pub use config::ScraperConfig;
pub use scraper::{ScraperError, WebScraper};
pub use types::{CellValue, Endpoint, Record};
