use std::fs;
use std::path::Path;

use colored::Colorize;
use ps2_filetypes::{encode_title_line, DecodedLine, TitleBlockError};

use crate::backup;
use crate::prompt::{Answer, Prompt};
use crate::scan::{find_files, FoundFile, NameMatch, ICON_SYS_FILE_NAME};
use crate::{run_batch, EditorConfig, Error, FileOutcome, Flow, RunSummary};

const LINE1_PROMPT: &str = "  New Line 1 (blank=keep, 's'=skip file, 'q'=quit all): ";
const LINE2_PROMPT: &str = "  New Line 2 (blank=keep): ";

/// Walks `root` for `icon.sys` files and edits their titles one by one.
pub fn edit_icon_sys_titles<P: Prompt>(
    root: &Path,
    config: &EditorConfig,
    prompt: &mut P,
) -> Result<RunSummary, Error> {
    let files = find_files(root, ICON_SYS_FILE_NAME, NameMatch::Exact);
    run_batch(&files, ICON_SYS_FILE_NAME, |file| {
        edit_icon_sys_file(file, config, prompt)
    })
}

pub fn edit_icon_sys_file<P: Prompt>(
    file: &FoundFile,
    config: &EditorConfig,
    prompt: &mut P,
) -> Result<(FileOutcome, Flow), Error> {
    let original = fs::read(&file.path).map_err(|source| Error::Read {
        path: file.path.clone(),
        source,
    })?;

    let layout = config.icon_sys;
    let current = layout.decode(&original);
    println!("  Current split @0x06: {}", current.split_offset);
    println!("  Line1:'{}'", current.line1.text);
    println!("  Line2:'{}'", current.line2.text);
    if !current.is_clean() {
        println!(
            "  {}",
            "Warning: title bytes are not valid Shift-JIS; damaged lines must be retyped."
                .yellow()
        );
    }

    let line1 = match ask_line(prompt, LINE1_PROMPT, &current.line1, Answer::icon_line1)? {
        Answer::Text(text) => text,
        Answer::SkipFile => {
            println!("  {}", "Skipped.".yellow());
            return Ok((FileOutcome::Skipped, Flow::Continue));
        }
        _ => return Ok((FileOutcome::Skipped, Flow::QuitAll)),
    };
    let line2 = match ask_line(prompt, LINE2_PROMPT, &current.line2, Answer::icon_line2)? {
        Answer::Text(text) => text,
        _ => return Ok((FileOutcome::Skipped, Flow::QuitAll)),
    };

    let updated = match layout.encode(&original, &line1, &line2) {
        Ok(updated) => updated,
        Err(err @ TitleBlockError::BlockOverflow { .. }) => {
            println!("  {} {err}", "Not written:".yellow());
            return Ok((FileOutcome::Skipped, Flow::Continue));
        }
        Err(err) => return Err(err.into()),
    };

    if updated == original {
        println!("  {}", "No changes.".dimmed());
        return Ok((FileOutcome::Unchanged, Flow::Continue));
    }

    backup::commit(&file.path, &original, &updated, config.backup)?;
    println!("  {}", "Written.".green());
    Ok((FileOutcome::Written, Flow::Continue))
}

/// Asks until the answer is a usable line or a control signal. "Keep" is
/// resolved to the current text, which is only allowed when it decoded
/// cleanly. The returned answer is never `Keep`.
fn ask_line<P: Prompt>(
    prompt: &mut P,
    message: &str,
    current: &DecodedLine,
    parse: fn(Option<String>) -> Answer,
) -> Result<Answer, Error> {
    loop {
        let input = prompt.ask(message).map_err(Error::Prompt)?;
        let text = match parse(input) {
            Answer::Keep if current.clean => current.text.clone(),
            Answer::Keep => {
                println!(
                    "  {}",
                    "The current line is damaged and cannot be kept; enter new text.".yellow()
                );
                continue;
            }
            Answer::Text(text) => text,
            control => return Ok(control),
        };

        match encode_title_line(&text) {
            Ok(_) => return Ok(Answer::Text(text)),
            Err(err @ TitleBlockError::LineTooLong { .. }) => {
                println!("  {} {err}", "Too long:".yellow());
            }
            Err(err) => return Err(err.into()),
        }
    }
}
