// src/output.rs

use chrono::Local;
use prettytable::{format::Alignment, Cell, Row as TableRow, Table};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{error, info};

use crate::{
    cli::{Mode, OutputMode},
    config::{Settings, DATETIME_FORMAT},
    error::Result,
    fetch::Row,
};

pub const NO_DATA: &str = "No data to display.";

/// What happened to a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Printed,
    Table,
    Saved(PathBuf),
    SaveFailed,
    /// The fetcher produced nothing to report.
    Skipped,
}

/// Print or save `rows` according to `output`.
pub fn control_output(
    rows: &[Row],
    mode: Mode,
    output: Option<OutputMode>,
    settings: &Settings,
) -> Result<ReportOutcome> {
    let mut stdout = io::stdout().lock();
    match output {
        Some(OutputMode::Pretty) => {
            pretty_output(rows, &mut stdout)?;
            Ok(ReportOutcome::Table)
        }
        Some(OutputMode::File) => Ok(file_output(rows, mode, settings, &mut stdout)),
        None => {
            print_results(rows, &mut stdout)?;
            Ok(ReportOutcome::Printed)
        }
    }
}

/// One line per row, fields separated by a single space.
pub fn print_results<W: Write>(rows: &[Row], out: &mut W) -> Result<()> {
    for row in rows {
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

/// Left-aligned table with the first row as the header.
pub fn pretty_output<W: Write>(rows: &[Row], out: &mut W) -> Result<()> {
    let Some((header, data)) = rows.split_first() else {
        writeln!(out, "{NO_DATA}")?;
        return Ok(());
    };

    let mut table = Table::new();
    table.set_titles(left_aligned(header));
    for row in data {
        table.add_row(left_aligned(row));
    }
    table.print(out)?;
    Ok(())
}

fn left_aligned(fields: &[String]) -> TableRow {
    TableRow::new(
        fields
            .iter()
            .map(|f| Cell::new_align(f, Alignment::LEFT))
            .collect(),
    )
}

/// `<mode>_<timestamp>.csv`
pub fn results_file_name(mode: Mode, now: &chrono::DateTime<Local>) -> String {
    format!("{}_{}.csv", mode.name(), now.format(DATETIME_FORMAT))
}

/// Write `rows` as CSV to `path`, creating parent directories.
pub fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save to `results/`; a failure is reported on `out`, never returned.
pub fn file_output<W: Write>(
    rows: &[Row],
    mode: Mode,
    settings: &Settings,
    out: &mut W,
) -> ReportOutcome {
    let path = settings
        .results_dir()
        .join(results_file_name(mode, &Local::now()));
    match write_csv(rows, &path) {
        Ok(()) => {
            info!(path = %path.display(), "results saved");
            let _ = writeln!(out, "Results saved to {}", path.display());
            ReportOutcome::Saved(path)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to save results");
            let _ = writeln!(out, "Failed to save results to file: {e}");
            ReportOutcome::SaveFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::row;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample() -> Vec<Row> {
        vec![row(["Status", "Count"]), row(["Final", "12"]), row(["Total", "12"])]
    }

    #[test]
    fn test_print_results_space_separated() {
        let mut out = Vec::new();
        print_results(&sample(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Status Count\nFinal 12\nTotal 12\n");
    }

    #[test]
    fn test_pretty_output_table() {
        let mut out = Vec::new();
        pretty_output(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("| Status | Count |"));
        assert!(text.contains("| Final  | 12    |"));
    }

    #[test]
    fn test_pretty_output_without_rows() {
        let mut out = Vec::new();
        pretty_output(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{NO_DATA}\n"));
    }

    #[test]
    fn test_results_file_name() {
        let now = Local.with_ymd_and_hms(2024, 5, 17, 9, 3, 7).unwrap();
        assert_eq!(
            results_file_name(Mode::LatestVersions, &now),
            "latest-versions_2024-05-17_09-03-07.csv"
        );
    }

    #[test]
    fn test_csv_round_trip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("results").join("pep.csv");
        let rows = vec![row(["A", "B"]), row(["1", "2"])];
        write_csv(&rows, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "A,B\n1,2\n");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let read: Vec<Row> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(read, rows);
    }

    #[test]
    fn test_file_output_saves_under_results_dir() {
        let tmp = tempdir().unwrap();
        let settings = Settings::default().with_base_dir(tmp.path());
        let mut out = Vec::new();

        let outcome = file_output(&sample(), Mode::Pep, &settings, &mut out);
        let ReportOutcome::Saved(path) = outcome else {
            panic!("expected Saved, got {outcome:?}");
        };
        assert!(path.starts_with(settings.results_dir()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("pep_"));
        assert!(String::from_utf8(out).unwrap().starts_with("Results saved to"));
    }

    #[test]
    fn test_file_output_failure_is_reported_not_raised() {
        let tmp = tempdir().unwrap();
        // a plain file where the results directory should be
        fs::write(tmp.path().join("results"), b"").unwrap();
        let settings = Settings::default().with_base_dir(tmp.path());
        let mut out = Vec::new();

        let outcome = file_output(&sample(), Mode::Pep, &settings, &mut out);
        assert_eq!(outcome, ReportOutcome::SaveFailed);
        assert!(String::from_utf8(out).unwrap().starts_with("Failed to save results"));
    }
}
