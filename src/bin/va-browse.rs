use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use va_relay::browser::{Browser, RelayClient, ViewMode};

#[derive(Parser)]
#[command(name = "va-browse")]
#[command(about = "Fetch a page through va-relay and inline its resources", long_about = None)]
struct Cli {
    /// Relay endpoint.
    #[arg(short, long, default_value = "http://localhost:7203")]
    proxy_url: String,

    /// Dump the relayed response as text instead of rendering HTML.
    #[arg(long)]
    raw: bool,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page to load; `http://` is assumed when no scheme is given.
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "va_relay=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mode = if cli.raw { ViewMode::Raw } else { ViewMode::Html };

    let browser = Browser::new(RelayClient::new(cli.proxy_url)?, mode);
    let page = browser.load(&cli.url).await;

    match &cli.output {
        Some(path) => tokio::fs::write(path, page.document.as_bytes()).await?,
        None => print!("{}", page.document),
    }

    if !page.loaded {
        std::process::exit(1);
    }
    Ok(())
}
