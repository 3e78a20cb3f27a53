//! Interactive editors for PS2 save titles.
//!
//! Both tools follow the same loop: scan a folder for candidate files, then
//! for each one show the current text, ask for replacements, take a one-time
//! `.bak` copy and overwrite the file. A failure on one file is reported and
//! the loop moves on to the next.

use std::fmt;
use std::path::PathBuf;

use colored::Colorize;
use ps2_filetypes::{TitleBlockError, TitleCfgError};

pub mod backup;
pub mod config;
pub mod icon_sys;
pub mod prompt;
pub mod scan;
pub mod title_cfg;

pub use config::{ConfigError, ConfigOverrides, EditorConfig};
pub use icon_sys::{edit_icon_sys_file, edit_icon_sys_titles};
pub use prompt::{Answer, Prompt, StdinPrompt};
pub use scan::{find_files, FoundFile, NameMatch};
pub use title_cfg::{edit_title_cfg_file, edit_title_cfgs};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to create backup {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read input: {0}")]
    Prompt(#[source] std::io::Error),
    #[error(transparent)]
    TitleBlock(#[from] TitleBlockError),
    #[error(transparent)]
    TitleCfg(#[from] TitleCfgError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Errors that end the whole run rather than just the current file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Prompt(_) | Error::Config(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Written,
    Unchanged,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    QuitAll,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub written: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub quit: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Written => self.written += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed => self.failed += 1,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} written, {} unchanged, {} skipped, {} failed",
            self.written, self.unchanged, self.skipped, self.failed
        )
    }
}

/// Runs `edit` over `files` one at a time.
///
/// Per-file errors are printed and counted; only fatal errors (a broken
/// prompt) stop the batch early.
fn run_batch<F>(files: &[FoundFile], label: &str, mut edit: F) -> Result<RunSummary, Error>
where
    F: FnMut(&FoundFile) -> Result<(FileOutcome, Flow), Error>,
{
    let mut summary = RunSummary {
        found: files.len(),
        ..RunSummary::default()
    };

    println!("Found {} {label} files.\n", files.len());
    if files.is_empty() {
        println!("{}", "Nothing to do.".dimmed());
        return Ok(summary);
    }

    for (index, file) in files.iter().enumerate() {
        println!("[{}/{}] {}", index + 1, files.len(), file.relative.display());

        let (outcome, flow) = match edit(file) {
            Ok(result) => result,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                log::debug!("{}: {err:?}", file.path.display());
                eprintln!("  {} {err}", "ERROR:".red());
                (FileOutcome::Failed, Flow::Continue)
            }
        };
        summary.record(outcome);
        println!();

        if flow == Flow::QuitAll {
            println!("{}", "Quit requested.".yellow());
            summary.quit = true;
            break;
        }
    }

    Ok(summary)
}
