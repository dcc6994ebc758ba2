use clap::Parser;
use docscraper::{cli::Args, config::Settings, logging};
use tracing::{error, info};

fn main() {
    // ─── 1) logging first ───────────────────────────────────────────
    let settings = Settings::from_env();
    if let Err(e) = logging::init(&settings.log_path()) {
        error!(path = %settings.log_path().display(), error = %e, "log file unavailable, logging to console only");
    }
    info!("Parser started");

    // ─── 2) arguments ───────────────────────────────────────────────
    let args = Args::parse();
    info!(?args, "command-line arguments");

    // ─── 3) scrape + report; failures are logged, never fatal ──────
    match docscraper::run(&args, &settings) {
        Ok(outcome) => info!(?outcome, mode = %args.mode, "report finished"),
        Err(e) => {
            let report = anyhow::Error::new(e);
            error!("Parser error: {report:?}");
        }
    }

    info!("Parser finished");
}
