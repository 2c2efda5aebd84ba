//! # seo-audit: An SEO Audit CLI
//!
//! Audits a web page with a three-stage model pipeline and saves a markdown
//! report. Runs a single audit with `--url`, or prompts for URLs interactively.

use anyhow::{bail, Result};
use clap::Parser;
use seo_audit_cli::{
    app::{audit_once, build_pipeline, is_valid_url, run_interactive},
    config::get_config,
};
use std::fs::File;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Audit this URL and exit instead of prompting
    #[arg(long)]
    url: Option<String>,
    /// Path to a YAML configuration file
    #[arg(long, env = "SEO_AUDIT_CONFIG")]
    config: Option<String>,
    /// The user the audit runs as (defaults to the configured user_id)
    #[arg(long)]
    user_id: Option<String>,
    /// Where to write logs (defaults to the configured log_file)
    #[arg(long)]
    log_file: Option<String>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = get_config(cli.config.as_deref())?;

    // Setup logging to a file
    let log_file = File::create(cli.log_file.as_deref().unwrap_or(&config.log_file))?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let pipeline = build_pipeline(&config)?;
    let user_id = cli.user_id.unwrap_or_else(|| config.user_id.clone());
    info!("Running as user '{user_id}'.");

    match cli.url {
        Some(url) => {
            if !is_valid_url(&url) {
                bail!("Please enter a valid URL starting with http:// or https://");
            }
            if !audit_once(&pipeline, &user_id, &url, &mut io::stdout()).await? {
                bail!("Audit of {url} failed");
            }
        }
        None => run_interactive(&pipeline, &user_id, io::stdin().lock(), io::stdout()).await?,
    }

    Ok(())
}
