//! LogSweep - Dated Log Cleaner
//!
//! LogSweep walks a directory tree and removes stale dated log output. Inside every
//! visited directory it deletes subdirectories whose names embed a `YYYYMMDD` date
//! older than the retention window, and, on paths containing "log", `.txt`/`.log`
//! files last written before the window.
//!
//! ## Layout
//!
//! - [`retention`]: cutoff computation and the keep-or-delete decisions (pure)
//! - [`filters`]: skip rules for protected, dot-prefixed and `obj*` directories
//! - [`walker`]: depth-bounded traversal and the two-phase clean
//! - [`report`]: progress records; the walker never prints on its own

pub mod filters;
pub mod report;
pub mod retention;
pub mod walker;

// Re-export commonly used items
pub use report::{ConsoleReporter, Level, MemoryReporter, Record, Reporter};
pub use retention::{
    parse_days, should_delete_directory, should_delete_file, Clock, FixedClock, RetentionWindow,
    SystemClock,
};
pub use walker::{TreeWalker, WalkMode, WalkOptions, WalkStats};
