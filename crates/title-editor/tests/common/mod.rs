#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use ps2_filetypes::TitleBlockLayout;
use title_editor::Prompt;

pub const ICON_SYS_SIZE: usize = 964;

/// Replays canned answers. Running out of answers behaves like end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub asked: usize,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|answer| answer.to_string()).collect(),
            asked: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, _message: &str) -> io::Result<Option<String>> {
        self.asked += 1;
        Ok(self.answers.pop_front())
    }
}

/// A zeroed icon.sys with the "PS2D" magic and the given titles.
pub fn icon_sys_bytes(line1: &str, line2: &str) -> Vec<u8> {
    let mut buffer = vec![0u8; ICON_SYS_SIZE];
    buffer[..4].copy_from_slice(b"PS2D");
    TitleBlockLayout::default()
        .encode(&buffer, line1, line2)
        .unwrap()
}

pub fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn read_titles(path: &Path) -> (String, String) {
    let title = TitleBlockLayout::default().decode(&fs::read(path).unwrap());
    (title.line1.text, title.line2.text)
}
