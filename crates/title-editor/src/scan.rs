use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const ICON_SYS_FILE_NAME: &str = "icon.sys";
pub const TITLE_CFG_FILE_NAME: &str = "title.cfg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact,
    IgnoreAsciiCase,
}

impl NameMatch {
    pub fn matches(self, candidate: &str, name: &str) -> bool {
        match self {
            NameMatch::Exact => candidate == name,
            NameMatch::IgnoreAsciiCase => candidate.eq_ignore_ascii_case(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundFile {
    pub path: PathBuf,
    /// `path` relative to the scanned root, for display.
    pub relative: PathBuf,
}

/// Recursively lists files called `name` under `root`, in a stable order
/// (directory entries sorted by file name). Entries that cannot be read are
/// logged and skipped.
pub fn find_files(root: &Path, name: &str, matching: NameMatch) -> Vec<FoundFile> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|candidate| matching.matches(candidate, name))
                .unwrap_or(false)
        })
        .map(|entry| {
            let path = entry.into_path();
            let relative = path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.clone());
            FoundFile { path, relative }
        })
        .collect()
}
