//! Directory tree walk and per-directory cleanup.

use crate::filters::{has_cleanable_extension, is_log_dir_name, is_log_path, is_skipped_dir};
use crate::report::{Level, Record, Reporter};
use crate::retention::{
    local_date, should_delete_directory, should_delete_file, Clock, RetentionWindow,
};

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// How the tree is searched for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkMode {
    /// Visit every directory and clean each one after its subtree.
    /// Files are cleaned only under paths containing "log".
    #[default]
    Thorough,
    /// Stop at directories named "log*" and clean only their dated subdirectories.
    LogFoldersOnly,
}

impl WalkMode {
    pub fn default_max_depth(self) -> usize {
        match self {
            WalkMode::Thorough => 4,
            WalkMode::LogFoldersOnly => 128,
        }
    }
}

/// Options controlling a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    pub mode: WalkMode,
    /// Deepest level visited; the root is level 0
    pub max_depth: usize,
    pub retention: RetentionWindow,
}

impl WalkOptions {
    pub fn new(mode: WalkMode, retention: RetentionWindow) -> Self {
        WalkOptions {
            mode,
            max_depth: mode.default_max_depth(),
            retention,
        }
    }

    /// Override the mode's depth ceiling when given
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        if let Some(depth) = max_depth {
            self.max_depth = depth;
        }
        self
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions::new(WalkMode::default(), RetentionWindow::default())
    }
}

/// Counters collected during a walk
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkStats {
    pub directories_visited: usize,
    pub directories_deleted: usize,
    pub directories_kept: usize,
    pub files_deleted: usize,
    pub files_kept: usize,
    pub errors: usize,
}

/// Walks a tree depth-first, deleting stale dated entries as it goes.
///
/// Every failure is scoped to the entry that caused it: it is reported and the
/// walk moves on to the next sibling.
pub struct TreeWalker<'a> {
    options: WalkOptions,
    clock: &'a dyn Clock,
    reporter: &'a mut dyn Reporter,
    stats: WalkStats,
}

impl<'a> TreeWalker<'a> {
    pub fn new(options: WalkOptions, clock: &'a dyn Clock, reporter: &'a mut dyn Reporter) -> Self {
        TreeWalker {
            options,
            clock,
            reporter,
            stats: WalkStats::default(),
        }
    }

    /// Walk `root` and return what was done. The root itself is never deleted.
    pub fn walk(mut self, root: &Path) -> WalkStats {
        match self.options.mode {
            WalkMode::Thorough => self.search(root, 0),
            WalkMode::LogFoldersOnly => self.search_log_folders(root, 0),
        }
        self.stats
    }

    /// Visit a non-root directory: its subtree first, then its own children
    fn visit(&mut self, dir: &Path, level: usize) {
        if level > self.options.max_depth {
            return;
        }
        self.search(dir, level);
        self.clean_directory(dir, level);
    }

    fn search(&mut self, dir: &Path, level: usize) {
        self.stats.directories_visited += 1;
        self.report(Level::Search, level, dir, "Searching");
        if level >= self.options.max_depth {
            return;
        }

        for child in self.subdirectories(dir, level) {
            self.visit(&child, level + 1);
        }
    }

    fn search_log_folders(&mut self, dir: &Path, level: usize) {
        if level > self.options.max_depth {
            return;
        }
        self.stats.directories_visited += 1;
        self.report(Level::Search, level, dir, "Searching");

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if is_log_dir_name(&name) {
            self.clean_directory(dir, level);
            return;
        }
        if level >= self.options.max_depth {
            return;
        }

        for child in self.subdirectories(dir, level) {
            self.search_log_folders(&child, level + 1);
        }
    }

    /// Delete stale dated subdirectories of `dir`, then stale log files when
    /// `dir` sits on a log path.
    ///
    /// `level` is the level of `dir` itself; its children are reported one level
    /// deeper. A directory at the depth ceiling is left alone since its children
    /// lie beyond it.
    fn clean_directory(&mut self, dir: &Path, level: usize) {
        if level >= self.options.max_depth {
            return;
        }
        let depth = level + 1;

        // Recomputed per directory so a walk spanning midnight follows the clock
        let today = self.clock.today();
        let cutoff_token = self.options.retention.cutoff_token(today);

        let entries = self.list(dir, depth);
        let (dirs, files): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.file_type().is_dir());

        for entry in dirs {
            if self.is_skipped(&entry, depth) {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy();

            if should_delete_directory(&name, &cutoff_token) {
                self.report(Level::Delete, depth, path, "Cleaning");
                match fs::remove_dir_all(path) {
                    Ok(()) => self.stats.directories_deleted += 1,
                    Err(err) => self.error(depth, path, &err),
                }
            } else {
                self.stats.directories_kept += 1;
                self.report(Level::Keep, depth, path, "Skipping Cleaning");
            }
        }

        if self.options.mode != WalkMode::Thorough || !is_log_path(dir) {
            return;
        }

        for entry in files {
            let path = entry.path();
            if !entry.file_type().is_file() || !has_cleanable_extension(path) {
                continue;
            }

            let modified = match entry.metadata().map_err(std::io::Error::from) {
                Ok(meta) => meta.modified(),
                Err(err) => Err(err),
            };
            let last_write = match modified {
                Ok(time) => local_date(time),
                Err(err) => {
                    self.error(depth, path, &err);
                    continue;
                }
            };

            if should_delete_file(last_write, today, self.options.retention) {
                self.report(Level::Delete, depth, path, "Cleaning file");
                match fs::remove_file(path) {
                    Ok(()) => self.stats.files_deleted += 1,
                    Err(err) => self.error(depth, path, &err),
                }
            } else {
                self.stats.files_kept += 1;
                self.report(Level::Keep, depth, path, "Skipping file");
            }
        }
    }

    /// Immediate subdirectories worth descending into, in file name order
    fn subdirectories(&mut self, dir: &Path, level: usize) -> Vec<PathBuf> {
        self.list(dir, level)
            .into_iter()
            .filter(|entry| entry.file_type().is_dir())
            .filter(|entry| !self.is_skipped(entry, level + 1))
            .map(DirEntry::into_path)
            .collect()
    }

    /// Immediate children of `dir`. Symlinks are listed but never followed.
    fn list(&mut self, dir: &Path, level: usize) -> Vec<DirEntry> {
        let mut entries = Vec::new();

        for result in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match result {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    let err = std::io::Error::from(err);
                    self.error(level, &path, &err);
                }
            }
        }

        entries
    }

    fn is_skipped(&mut self, entry: &DirEntry, level: usize) -> bool {
        let name = entry.file_name().to_string_lossy();
        match entry.metadata() {
            Ok(meta) => is_skipped_dir(&name, &meta),
            Err(err) => {
                let err = std::io::Error::from(err);
                self.error(level, entry.path(), &err);
                true
            }
        }
    }

    fn error(&mut self, depth: usize, path: &Path, err: &std::io::Error) {
        self.stats.errors += 1;
        self.report(Level::Error, depth, path, err.to_string());
    }

    fn report(&mut self, level: Level, depth: usize, path: &Path, message: impl Into<String>) {
        self.reporter.report(Record::new(level, depth, path, message));
    }
}
