//! Progress records emitted by the walker and their console rendering.

use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Search, // Directory being visited
    Delete, // Stale entry removed
    Keep,   // Entry inside the retention window, or undated
    Error,  // Per-entry failure, processing continued
}

/// One progress event: severity, walk depth, path and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub depth: usize,
    pub path: PathBuf,
    pub message: String,
}

impl Record {
    pub fn new(level: Level, depth: usize, path: &Path, message: impl Into<String>) -> Self {
        Record {
            level,
            depth,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Error => write!(f, "{} ERROR {}", self.path.display(), self.message),
            _ => write!(
                f,
                "{:indent$}{} {}...",
                "",
                self.message,
                self.path.display(),
                indent = self.depth * 2
            ),
        }
    }
}

/// Sink for walker progress
pub trait Reporter {
    fn report(&mut self, record: Record);
}

/// Writes colored, indented lines; errors go to stderr
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        ConsoleReporter
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, record: Record) {
        let line = record.to_string();
        match record.level {
            Level::Search => println!("{}", line.green()),
            Level::Delete => println!("{}", line.yellow()),
            Level::Keep => println!("{}", line.dimmed()),
            Level::Error => eprintln!("{}", line.red()),
        }
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub records: Vec<Record>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        MemoryReporter::default()
    }

    /// Paths reported at the given level, in order
    pub fn paths(&self, level: Level) -> Vec<&Path> {
        self.records
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.path.as_path())
            .collect()
    }

    pub fn count(&self, level: Level) -> usize {
        self.records.iter().filter(|r| r.level == level).count()
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, record: Record) {
        self.records.push(record);
    }
}
