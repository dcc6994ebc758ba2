// src/logging.rs

use chrono::Local;
use std::{
    fmt,
    fs::{File, OpenOptions},
    path::Path,
    sync::Mutex,
};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{
        format::{self as tracing_format, FormatEvent, FormatFields},
        FmtContext,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LOG_TIME_FORMAT;

/// `<time> - [<LEVEL>] - <message>`, shared by the console and the log file.
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: tracing_format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - [{}] - ",
            Local::now().format(LOG_TIME_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the process-wide subscriber: console on stderr plus `log_path`
/// opened for appending. Call once, before anything logs.
///
/// The console layer is installed even when the log file cannot be opened;
/// that failure is returned after the subscriber is in place.
pub fn init(log_path: &Path) -> std::io::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(std::io::stderr);
    let (logfile, opened) = match open_log_file(log_path) {
        Ok(file) => {
            let layer = tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), Ok(()))
        }
        Err(e) => (None, Err(e)),
    };

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env)
        .with(console)
        .with(logfile)
        .try_init();
    opened
}

fn open_log_file(log_path: &Path) -> std::io::Result<File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_log_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("logs").join("parser.log");
        init(&path).unwrap();
        assert!(path.exists());
        // a repeated call must not fail
        init(&path).unwrap();
    }

    #[test]
    fn test_unopenable_log_file_still_installs_console() {
        let tmp = tempdir().unwrap();
        // a directory where the log file should be
        let path = tmp.path().join("parser.log");
        std::fs::create_dir(&path).unwrap();

        assert!(init(&path).is_err());
        assert!(tracing::dispatcher::has_been_set());
    }
}
