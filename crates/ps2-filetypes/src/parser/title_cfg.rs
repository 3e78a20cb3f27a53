//! `title.cfg`, the `key=value` text file that sits next to homebrew saves.
//!
//! Parsing keeps every line in order. Only lines that look like entries are
//! interpreted; comments, blanks and anything else pass through untouched
//! apart from trailing whitespace. The file is written back in the encoding
//! and newline style it was read with.

use std::fmt;

use encoding_rs::{Encoding, SHIFT_JIS, WINDOWS_1252};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TitleCfgError {
    #[error("character {character:?} cannot be written as {encoding}")]
    Unencodable {
        character: char,
        encoding: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8Bom,
    Utf8,
    ShiftJis,
    /// Fallback; every byte sequence decodes.
    Windows1252,
}

impl TextEncoding {
    /// Picks the first encoding that decodes `raw` without errors, trying
    /// UTF-8 with BOM, UTF-8, Shift-JIS and finally Windows-1252.
    pub fn detect(raw: &[u8]) -> (Self, String) {
        if let Some(rest) = raw.strip_prefix(UTF8_BOM) {
            if let Ok(text) = std::str::from_utf8(rest) {
                return (TextEncoding::Utf8Bom, text.to_owned());
            }
        }

        if let Ok(text) = std::str::from_utf8(raw) {
            return (TextEncoding::Utf8, text.to_owned());
        }

        if let Some(text) = SHIFT_JIS.decode_without_bom_handling_and_without_replacement(raw) {
            return (TextEncoding::ShiftJis, text.into_owned());
        }

        let (text, _) = WINDOWS_1252.decode_without_bom_handling(raw);
        (TextEncoding::Windows1252, text.into_owned())
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8Bom => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::ShiftJis => "shift_jis",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, TitleCfgError> {
        match self {
            TextEncoding::Utf8Bom => {
                let mut bytes = UTF8_BOM.to_vec();
                bytes.extend_from_slice(text.as_bytes());
                Ok(bytes)
            }
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::ShiftJis => self.encode_legacy(SHIFT_JIS, text),
            TextEncoding::Windows1252 => self.encode_legacy(WINDOWS_1252, text),
        }
    }

    pub fn can_encode(self, text: &str) -> bool {
        self.encode(text).is_ok()
    }

    fn encode_legacy(
        self,
        encoding: &'static Encoding,
        text: &str,
    ) -> Result<Vec<u8>, TitleCfgError> {
        let (bytes, _, had_errors) = encoding.encode(text);
        if !had_errors {
            return Ok(bytes.into_owned());
        }

        // encoding_rs substitutes numeric character references; find the
        // character that caused it so the error is useful.
        let character = text
            .chars()
            .find(|ch| {
                let mut utf8 = [0u8; 4];
                encoding.encode(ch.encode_utf8(&mut utf8)).2
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Err(TitleCfgError::Unencodable {
            character,
            encoding: self.name(),
        })
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlineStyle {
    Lf,
    CrLf,
}

impl NewlineStyle {
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") && !text.ends_with('\r') {
            NewlineStyle::CrLf
        } else {
            NewlineStyle::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NewlineStyle::Lf => "\n",
            NewlineStyle::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for NewlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NewlineStyle::Lf => f.write_str("LF"),
            NewlineStyle::CrLf => f.write_str("CRLF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCfgEntry {
    pub key: String,
    pub value: String,
}

impl TitleCfgEntry {
    pub fn render(&self) -> String {
        format!("{}={}", self.key.trim(), self.value.trim())
    }
}

impl fmt::Display for TitleCfgEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleCfgLine {
    Entry(TitleCfgEntry),
    /// Comment, blank or any other line without an entry.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCfg {
    pub lines: Vec<TitleCfgLine>,
    pub encoding: TextEncoding,
    pub newline: NewlineStyle,
    pub trailing_newline: bool,
}

impl TitleCfg {
    pub fn parse(raw: &[u8]) -> Self {
        let (encoding, text) = TextEncoding::detect(raw);
        let newline = NewlineStyle::detect(&text);
        let trailing_newline = text.ends_with('\n') || text.ends_with('\r');
        let lines = split_lines(&text).iter().map(|line| parse_line(line)).collect();

        Self {
            lines,
            encoding,
            newline,
            trailing_newline,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &TitleCfgEntry> {
        self.lines.iter().filter_map(|line| match line {
            TitleCfgLine::Entry(entry) => Some(entry),
            TitleCfgLine::Text(_) => None,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }

    /// The `index`-th entry in file order.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut TitleCfgEntry> {
        self.lines
            .iter_mut()
            .filter_map(|line| match line {
                TitleCfgLine::Entry(entry) => Some(entry),
                TitleCfgLine::Text(_) => None,
            })
            .nth(index)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Normalised text: `key=value` entries, no trailing whitespace, one
    /// newline style throughout.
    pub fn render(&self) -> String {
        let newline = self.newline.as_str();
        let mut out = self
            .lines
            .iter()
            .map(|line| match line {
                TitleCfgLine::Entry(entry) => entry.render(),
                TitleCfgLine::Text(text) => trim_line_end(text).to_owned(),
            })
            .collect::<Vec<_>>()
            .join(newline);
        if self.trailing_newline {
            out.push_str(newline);
        }
        out
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TitleCfgError> {
        self.encoding.encode(&self.render())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    body.split('\n').map(str::to_owned).collect()
}

fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(|c| c == ' ' || c == '\t')
}

fn is_entry_line(line: &str) -> bool {
    match line.trim_start().chars().next() {
        None | Some('#') | Some(';') => false,
        Some(_) => line.contains('='),
    }
}

fn parse_line(line: &str) -> TitleCfgLine {
    let line = trim_line_end(line);
    if is_entry_line(line) {
        if let Some((key, value)) = line.split_once('=') {
            return TitleCfgLine::Entry(TitleCfgEntry {
                key: key.trim().to_owned(),
                value: value.trim().to_owned(),
            });
        }
    }
    TitleCfgLine::Text(line.to_owned())
}
