use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use arte7::config::AppConfig;
use arte7::error::{Error, Result};
use arte7::http::HttpClient;
use arte7::models::{ProgramRecord, Quality};
use arte7::resolver::{Resolver, download};
use arte7::search::{CatalogSearch, truncate};

/// Get and download Arte+7 videos.
#[derive(Debug, Parser)]
#[command(name = "arte7", version, about)]
#[command(group = clap::ArgGroup::new("entry").required(true).multiple(false))]
struct Cli {
    /// Page URL of one program.
    #[arg(short, long, group = "entry")]
    url: Option<String>,

    /// Known program short name (e.g. "tracks").
    #[arg(short, long, group = "entry")]
    program: Option<String>,

    /// Free-text catalog search.
    #[arg(short, long, group = "entry")]
    search: Option<String>,

    /// Quality to download (EQ, SQ, MQ, HQ). Without it, print JSON.
    #[arg(short, long)]
    quality: Option<Quality>,

    /// Language code of the variant to download.
    #[arg(short, long, default_value = "VF")]
    lang: String,

    /// Keep only the first N records (-1 keeps all).
    #[arg(short = 'n', long, default_value_t = -1)]
    keep: i64,

    /// Download directory (overrides ARTE7_OUTPUT_DIR).
    #[arg(short, long)]
    dir: Option<String>,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "arte7=debug" } else { "arte7=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("arte7: {err:#}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::from_env()?;
    let client = HttpClient::new(&config)?;

    // One entry path: direct URL, known name, or free-text search.
    let records = if let Some(url) = &cli.url {
        let resolver = Resolver::new(&client, &config);
        vec![resolver.resolve_by_url(url).await?]
    } else if let Some(name) = &cli.program {
        CatalogSearch::new(&client, &config).by_program_name(name).await?
    } else if let Some(query) = &cli.search {
        CatalogSearch::new(&client, &config).search(query).await?
    } else {
        unreachable!("clap enforces the entry group");
    };

    let records = truncate(records, cli.keep);
    if records.is_empty() {
        eprintln!("arte7: nothing found");
        return Ok(ExitCode::from(3));
    }

    match cli.quality {
        Some(quality) => {
            let dir = cli.dir.clone().unwrap_or_else(|| config.output_dir.clone());
            download_records(&client, &records, &cli.lang, quality, Path::new(&dir)).await?;
        }
        None => print_records(&records)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Download the selected variant of every record, one at a time.
async fn download_records(
    client: &HttpClient,
    records: &[ProgramRecord],
    lang: &str,
    quality: Quality,
    dir: &Path,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("create {}: {e}", dir.display()))?;

    for record in records {
        let dest = download(client, record, lang, quality, dir).await?;
        info!("{} saved to {}", record.name, dest.display());
    }
    Ok(())
}

/// JSON output mode: pretty-printed `infos()` with sorted keys, a single
/// object for one record, an array otherwise.
fn print_records(records: &[ProgramRecord]) -> Result<()> {
    let value = match records {
        [record] => record.infos(),
        many => serde_json::Value::Array(many.iter().map(ProgramRecord::infos).collect()),
    };
    let rendered = serde_json::to_string_pretty(&value).map_err(|e| Error::Other(e.into()))?;
    println!("{rendered}");
    Ok(())
}
