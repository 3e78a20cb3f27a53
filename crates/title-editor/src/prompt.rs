use std::io::{self, BufRead, Write};

pub trait Prompt {
    /// Shows `message` and reads one line of input without its terminator.
    /// `Ok(None)` means the input has ended.
    fn ask(&mut self, message: &str) -> io::Result<Option<String>>;
}

#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, message: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{message}")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c| c == '\n' || c == '\r').to_owned()))
    }
}

/// What the user asked for at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Keep,
    Text(String),
    SkipFile,
    QuitAll,
}

impl Answer {
    /// First icon.sys prompt: blank keeps, `s` skips the file, `q` quits.
    pub fn icon_line1(input: Option<String>) -> Self {
        match input {
            None => Answer::QuitAll,
            Some(text) => match text.trim() {
                "" => Answer::Keep,
                control if control.eq_ignore_ascii_case("s") => Answer::SkipFile,
                control if control.eq_ignore_ascii_case("q") => Answer::QuitAll,
                _ => Answer::Text(text),
            },
        }
    }

    /// Second icon.sys prompt: only blank is special, so a one-letter title
    /// can still be entered here.
    pub fn icon_line2(input: Option<String>) -> Self {
        match input {
            None => Answer::QuitAll,
            Some(text) if text.trim().is_empty() => Answer::Keep,
            Some(text) => Answer::Text(text),
        }
    }

    /// title.cfg prompt: blank keeps, `q` stops this file, `qa` quits.
    pub fn title_cfg_value(input: Option<String>) -> Self {
        match input {
            None => Answer::QuitAll,
            Some(text) => match text.trim() {
                "" => Answer::Keep,
                control if control.eq_ignore_ascii_case("qa") => Answer::QuitAll,
                control if control.eq_ignore_ascii_case("q") => Answer::SkipFile,
                _ => Answer::Text(text),
            },
        }
    }
}
