// src/lib.rs

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod http;
pub mod logging;
pub mod output;

use cli::Args;
use config::Settings;
use error::Result;
use http::CachedClient;
use output::ReportOutcome;

/// Fetch the report selected by `args` and hand it to the reporter.
pub fn run(args: &Args, settings: &Settings) -> Result<ReportOutcome> {
    let client = CachedClient::new(settings.cache_dir())?;
    if args.clear_cache {
        client.clear_cache()?;
    }

    match fetch::scrape(args.mode, &client, settings)? {
        Some(rows) => output::control_output(&rows, args.mode, args.output, settings),
        None => Ok(ReportOutcome::Skipped),
    }
}
