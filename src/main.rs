use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use logsweep::{
    parse_days, ConsoleReporter, RetentionWindow, SystemClock, TreeWalker, WalkMode, WalkOptions,
};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Delete stale dated log folders and files below a directory",
    long_about = None
)]
struct Args {
    /// Directory to search for log folders
    #[arg(long, short)]
    path: PathBuf,

    /// Days of logs to keep, optionally with a unit (7, 7d, 2w, 1m). 0 uses the default of 7
    #[arg(long, short, default_value = "0", value_parser = parse_days_arg)]
    days_to_keep: u32,

    /// Wait for Enter before exiting (for consoles that close on exit)
    #[arg(long, short)]
    read_key: bool,

    /// Deepest directory level to visit (default: 4, or 128 with --log-folders-only)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Only clean dated subfolders of directories named "log*", without touching files
    #[arg(long)]
    log_folders_only: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn parse_days_arg(value: &str) -> Result<u32, String> {
    parse_days(value).map_err(|err| err.to_string())
}

fn validate_root(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        bail!("{} doesn't exist", path.display());
    }
    if !path.is_dir() {
        bail!("{} is not a directory", path.display());
    }
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))
}

fn wait_for_enter() -> Result<()> {
    println!("Press Enter to exit");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    let root = validate_root(&args.path)?;

    if args.days_to_keep == 0 {
        println!(
            "{}",
            "Days to keep not specified or zero. Using the default of 7".bold()
        );
    }

    let mode = if args.log_folders_only {
        WalkMode::LogFoldersOnly
    } else {
        WalkMode::Thorough
    };
    let options = WalkOptions::new(mode, RetentionWindow::new(args.days_to_keep))
        .with_max_depth(args.max_depth);

    let clock = SystemClock;
    let mut reporter = ConsoleReporter::new();
    TreeWalker::new(options, &clock, &mut reporter).walk(&root);

    if args.read_key {
        wait_for_enter()?;
    }

    Ok(())
}
