use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use vitibrasil::types::{Endpoint, Record};
use vitibrasil::utils::{RecordStats, YearRange};
use vitibrasil::{ScraperConfig, WebScraper};

#[derive(Parser)]
#[command(name = "vitibrasil")]
#[command(about = "A vitibrasil.cnpuv.embrapa.br viticulture statistics scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available topics and the site option each one maps to
    Endpoints,
    /// Fetch every record of a topic, for one year or a range of years
    Fetch {
        #[arg(value_parser = parse_endpoint, help = "Topic to fetch")]
        endpoint: Endpoint,

        #[arg(
            long,
            conflicts_with_all = ["start_year", "end_year"],
            help = "Fetch a single year"
        )]
        year: Option<i32>,

        #[arg(long, help = "First year to fetch (defaults to 1970)")]
        start_year: Option<i32>,

        #[arg(long, help = "Last year to fetch (defaults to the current year)")]
        end_year: Option<i32>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Scrape a single page given its full site URL
    Page {
        #[arg(help = "Page URL, e.g. http://vitibrasil.cnpuv.embrapa.br/index.php?opcao=opt_02&ano=2022")]
        url: String,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
}

fn parse_endpoint(s: &str) -> Result<Endpoint, String> {
    Endpoint::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn print_records(records: &[Record], format: OutputFormat) {
    match format {
        OutputFormat::Json => serialize_json(&records),
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No records to display.");
            } else {
                for (i, record) in records.iter().enumerate() {
                    println!("{:>5}. {}", i + 1, record);
                }
                print!("{}", RecordStats::from_records(records));
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let scraper = WebScraper::with_config(ScraperConfig::from_env()).unwrap_or_else(|e| {
        log::error!("Error creating scraper: {}", e);
        process::exit(1);
    });

    match cli.command {
        Commands::Endpoints => {
            for endpoint in Endpoint::ALL {
                println!(
                    "{:<16} {:<13} {}",
                    endpoint.slug(),
                    endpoint.query(),
                    endpoint.description()
                );
            }
        }

        Commands::Fetch {
            endpoint,
            year,
            start_year,
            end_year,
            format,
        } => {
            let defaults = scraper.config().year_range();
            let range = match year {
                Some(year) => YearRange::single(year),
                None => YearRange {
                    start: start_year.unwrap_or(defaults.start),
                    end: end_year.unwrap_or(defaults.end),
                },
            };

            let range = range.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let records = scraper
                .fetch_years(endpoint, range)
                .await
                .unwrap_or_else(|e| {
                    log::error!("{}", e);
                    process::exit(1);
                });

            print_records(&records, format);
        }

        Commands::Page { url, format } => {
            log::info!("Fetching page {}...", url);

            let records = scraper
                .fetch_url(&url)
                .await
                .unwrap_or_else(|e| {
                    log::error!("{}", e);
                    process::exit(1);
                })
                .unwrap_or_default();

            print_records(&records, format);
        }
    }
}
