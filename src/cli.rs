// src/cli.rs

use clap::{Parser, ValueEnum};
use std::fmt;

/// Which report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Release notes for every Python version
    WhatsNew,
    /// Documentation links and status per version
    LatestVersions,
    /// Download the A4 PDF documentation archive
    Download,
    /// Count PEPs by status
    Pep,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::WhatsNew => "whats-new",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::Pep => "pep",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extra ways to present results; plain printing when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Aligned table
    Pretty,
    /// CSV file under results/
    File,
}

#[derive(Debug, Parser)]
#[command(name = "docscraper", about = "Python documentation scraper")]
pub struct Args {
    /// Parser mode
    #[arg(value_enum)]
    pub mode: Mode,

    /// Clear the HTTP cache before fetching
    #[arg(short = 'c', long)]
    pub clear_cache: bool,

    /// Additional output format
    #[arg(short = 'o', long, value_enum)]
    pub output: Option<OutputMode>,
}
