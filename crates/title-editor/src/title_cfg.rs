use std::fs;
use std::path::Path;

use colored::Colorize;
use ps2_filetypes::TitleCfg;

use crate::backup;
use crate::prompt::{Answer, Prompt};
use crate::scan::{find_files, FoundFile, NameMatch, TITLE_CFG_FILE_NAME};
use crate::{run_batch, EditorConfig, Error, FileOutcome, Flow, RunSummary};

const VALUE_PROMPT: &str = "     New value (blank=keep, q=skip file, qa=quit all): ";

/// Walks `root` for `title.cfg` files (any case) and edits their values.
pub fn edit_title_cfgs<P: Prompt>(
    root: &Path,
    config: &EditorConfig,
    prompt: &mut P,
) -> Result<RunSummary, Error> {
    let files = find_files(root, TITLE_CFG_FILE_NAME, NameMatch::IgnoreAsciiCase);
    run_batch(&files, TITLE_CFG_FILE_NAME, |file| {
        edit_title_cfg_file(file, config, prompt)
    })
}

/// Offers every `key=value` entry for editing. Stopping early with `q` still
/// saves the values entered so far, along with the normalised layout.
pub fn edit_title_cfg_file<P: Prompt>(
    file: &FoundFile,
    config: &EditorConfig,
    prompt: &mut P,
) -> Result<(FileOutcome, Flow), Error> {
    let original = fs::read(&file.path).map_err(|source| Error::Read {
        path: file.path.clone(),
        source,
    })?;

    let mut document = TitleCfg::parse(&original);
    println!(
        "  Encoding: {}, Newline: {}",
        document.encoding, document.newline
    );
    println!("{}", "  Enter keeps a value, q skips the rest of this file, qa quits.".dimmed());

    let encoding = document.encoding;
    let total = document.entry_count();
    let mut flow = Flow::Continue;

    'entries: for index in 0..total {
        let Some(entry) = document.entry_mut(index) else {
            break;
        };
        println!("  [{}/{}] {}", index + 1, total, entry.render());

        loop {
            let input = prompt.ask(VALUE_PROMPT).map_err(Error::Prompt)?;
            match Answer::title_cfg_value(input) {
                Answer::Keep => break,
                Answer::SkipFile => break 'entries,
                Answer::QuitAll => {
                    flow = Flow::QuitAll;
                    break 'entries;
                }
                Answer::Text(value) => {
                    if !encoding.can_encode(&value) {
                        println!(
                            "  {} value cannot be written as {encoding}",
                            "Rejected:".yellow()
                        );
                        continue;
                    }
                    entry.value = value;
                    break;
                }
            }
        }
    }

    let updated = document.to_bytes()?;
    if updated == original {
        println!("  {}", "No changes.".dimmed());
        return Ok((FileOutcome::Unchanged, flow));
    }

    backup::commit(&file.path, &original, &updated, config.backup)?;
    println!("  {}", "Saved.".green());
    Ok((FileOutcome::Written, flow))
}
