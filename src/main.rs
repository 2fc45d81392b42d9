use anyhow::Result;
use clap::Parser;
use medsupply_data::{config::Config, fetch::HttpFetcher, run};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Download the medicines metadata export and save it as trimmed JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Source URL of the pipe-delimited export
    #[arg(long)]
    url: Option<String>,

    /// Output JSON file (its directory must exist)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout is reserved for the one status line
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) resolve config ───────────────────────────────────────────
    let cli = Cli::parse();
    let mut config = Config::default();
    if let Some(url) = cli.url {
        config = config.with_url(url);
    }
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }
    info!(url = %config.url, output = %config.output.display(), "startup");

    // ─── 3) fetch, transform, write ──────────────────────────────────
    let fetcher = HttpFetcher::new()?;
    let outcome = run::run(&fetcher, &config)?;

    println!("{}", outcome);
    Ok(())
}
