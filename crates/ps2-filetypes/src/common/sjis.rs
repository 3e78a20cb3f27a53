//! Shift-JIS helpers shared by the icon.sys and title.cfg code.
//!
//! Byte conversion goes through `encoding_rs`. Width folding is a static
//! mapping: an offset for the printable ASCII block, a constant table for
//! half-width katakana and an embedded replacement table for punctuation,
//! subscripts and Latin letters that have no decomposition. Other accented
//! Latin letters are reduced to their base letter through NFD.

use std::collections::HashMap;

use encoding_rs::SHIFT_JIS;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::from_str;
use unicode_normalization::UnicodeNormalization;

/// Substituted for any character that has no Shift-JIS encoding.
pub const UNSUPPORTED_CHAR_PLACEHOLDER: char = '\u{3000}';

const IDEOGRAPHIC_SPACE: char = '\u{3000}';
const FULLWIDTH_ASCII_OFFSET: u32 = 0xFEE0;
const HALFWIDTH_KATAKANA_START: u32 = 0xFF61;

/// Full-width forms of U+FF61..=U+FF9F, in code point order.
const HALFWIDTH_KATAKANA: [char; 63] = [
    '。', '「', '」', '、', '・', 'ヲ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ', 'ャ', 'ュ', 'ョ', 'ッ', 'ー',
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ', 'ス', 'セ', 'ソ', 'タ',
    'チ', 'ツ', 'テ', 'ト', 'ナ', 'ニ', 'ヌ', 'ネ', 'ノ', 'ハ', 'ヒ', 'フ', 'ヘ', 'ホ', 'マ', 'ミ',
    'ム', 'メ', 'モ', 'ヤ', 'ユ', 'ヨ', 'ラ', 'リ', 'ル', 'レ', 'ロ', 'ワ', 'ン', '゛', '゜',
];

#[derive(Debug, Deserialize)]
struct ReplacementTable {
    replacements: HashMap<char, char>,
}

static REPLACEMENTS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    from_str::<ReplacementTable>(include_str!("sjis_replacements.json"))
        .expect("valid Shift-JIS replacement table JSON")
        .replacements
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("character {character:?} has no Shift-JIS encoding")]
pub struct SjisEncodeError {
    pub character: char,
}

/// Strictly encodes `value`, failing on the first unrepresentable character.
pub fn encode_sjis(value: &str) -> Result<Vec<u8>, SjisEncodeError> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(value);
    if !had_errors {
        return Ok(bytes.into_owned());
    }

    let character = value
        .chars()
        .find(|&ch| encode_sjis_char(ch).is_none())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Err(SjisEncodeError { character })
}

/// Encodes a single character, or `None` when Shift-JIS has no mapping for it.
pub fn encode_sjis_char(ch: char) -> Option<Vec<u8>> {
    let mut utf8 = [0u8; 4];
    let (bytes, _, had_errors) = SHIFT_JIS.encode(ch.encode_utf8(&mut utf8));
    if had_errors {
        None
    } else {
        Some(bytes.into_owned())
    }
}

/// Decodes without BOM sniffing. Malformed sequences become U+FFFD and the
/// returned flag is `false`.
pub fn decode_sjis(bytes: &[u8]) -> (String, bool) {
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    (text.into_owned(), !had_errors)
}

pub fn is_roundtrip_sjis(value: &str) -> bool {
    match encode_sjis(value) {
        Ok(bytes) => {
            let (decoded, clean) = decode_sjis(&bytes);
            clean && decoded == value
        }
        Err(_) => false,
    }
}

/// Maps a character to the full-width form shown on the PS2 browser.
///
/// The replacement table is consulted first, then accented Latin letters
/// lose their diacritics, so `é` and `č` become `ｅ` and `ｃ`. Characters
/// without a full-width counterpart are returned unchanged; whether they
/// encode is the caller's concern.
pub fn to_fullwidth(ch: char) -> char {
    let ch = REPLACEMENTS
        .get(&ch)
        .copied()
        .unwrap_or_else(|| strip_latin_accent(ch));
    match ch {
        ' ' => IDEOGRAPHIC_SPACE,
        '!'..='~' => char::from_u32(u32::from(ch) + FULLWIDTH_ASCII_OFFSET).unwrap_or(ch),
        '\u{FF61}'..='\u{FF9F}' => {
            HALFWIDTH_KATAKANA[(u32::from(ch) - HALFWIDTH_KATAKANA_START) as usize]
        }
        _ => ch,
    }
}

/// Base letter of a decomposable Latin letter. Only the Latin blocks are
/// touched, so kana keep their (han)dakuten.
fn strip_latin_accent(ch: char) -> char {
    if !matches!(ch, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}') {
        return ch;
    }
    let mut utf8 = [0u8; 4];
    match ch.encode_utf8(&mut utf8).nfd().next() {
        Some(base) if base.is_ascii_alphabetic() => base,
        _ => ch,
    }
}

/// Narrows full-width ASCII and the ideographic space for display.
///
/// Feeding the result back through [`to_fullwidth`] yields the original
/// characters, which is what lets an unchanged line re-encode to the same
/// bytes. Full-width forms whose ASCII counterpart the replacement table
/// rewrites (`－`, `＇`) are left wide for that reason.
pub fn to_halfwidth_display(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            IDEOGRAPHIC_SPACE => ' ',
            '\u{FF01}'..='\u{FF5E}' => {
                match char::from_u32(u32::from(ch) - FULLWIDTH_ASCII_OFFSET) {
                    Some(narrow) if !REPLACEMENTS.contains_key(&narrow) => narrow,
                    _ => ch,
                }
            }
            _ => ch,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_fullwidth_widens_printable_ascii_and_space() {
        assert_eq!(to_fullwidth('A'), 'Ａ');
        assert_eq!(to_fullwidth('z'), 'ｚ');
        assert_eq!(to_fullwidth('0'), '０');
        assert_eq!(to_fullwidth('~'), '～');
        assert_eq!(to_fullwidth(' '), '\u{3000}');
    }

    #[test]
    fn to_fullwidth_applies_replacement_table_first() {
        assert_eq!(to_fullwidth('-'), 'ー');
        assert_eq!(to_fullwidth('\''), '’');
        assert_eq!(to_fullwidth('₃'), '３');
        assert_eq!(to_fullwidth('é'), 'ｅ');
        assert_eq!(to_fullwidth('Ü'), 'Ｕ');
    }

    #[test]
    fn to_fullwidth_strips_accents_beyond_latin1() {
        assert_eq!(to_fullwidth('č'), 'ｃ');
        assert_eq!(to_fullwidth('ő'), 'ｏ');
        assert_eq!(to_fullwidth('Ş'), 'Ｓ');
        assert_eq!(to_fullwidth('ł'), 'ｌ');
        assert_eq!(to_fullwidth('ệ'), 'ｅ');
        assert_eq!(to_fullwidth('×'), '×');
    }

    #[test]
    fn to_fullwidth_maps_halfwidth_katakana() {
        assert_eq!(to_fullwidth('ｶ'), 'カ');
        assert_eq!(to_fullwidth('ｰ'), 'ー');
        assert_eq!(to_fullwidth('ﾟ'), '゜');
        assert_eq!(to_fullwidth('｡'), '。');
    }

    #[test]
    fn to_fullwidth_keeps_kana_and_kanji() {
        assert_eq!(to_fullwidth('テ'), 'テ');
        assert_eq!(to_fullwidth('ガ'), 'ガ');
        assert_eq!(to_fullwidth('漢'), '漢');
    }

    #[test]
    fn halfwidth_display_reverses_ascii_widening() {
        let wide: String = "SAVE DATA!".chars().map(to_fullwidth).collect();
        assert_eq!(wide, "ＳＡＶＥ\u{3000}ＤＡＴＡ！");
        assert_eq!(to_halfwidth_display(&wide), "SAVE DATA!");
        assert_eq!(to_halfwidth_display("テスト"), "テスト");
    }

    #[test]
    fn halfwidth_display_keeps_forms_the_table_would_rewrite() {
        let stored = "Ａ－Ｂ＇Ｃ";
        let shown = to_halfwidth_display(stored);
        assert_eq!(shown, "A－B＇C");
        let rewidened: String = shown.chars().map(to_fullwidth).collect();
        assert_eq!(rewidened, stored);
        assert_eq!(
            encode_sjis(&rewidened).unwrap(),
            vec![0x82, 0x60, 0x81, 0x7C, 0x82, 0x61, 0xFA, 0x56, 0x82, 0x62]
        );
    }

    #[test]
    fn encode_sjis_produces_double_byte_katakana() {
        assert_eq!(
            encode_sjis("テスト").unwrap(),
            vec![0x83, 0x65, 0x83, 0x58, 0x83, 0x67]
        );
        assert_eq!(encode_sjis("\u{3000}").unwrap(), vec![0x81, 0x40]);
    }

    #[test]
    fn encode_sjis_reports_first_unsupported_character() {
        let err = encode_sjis("AB😀C").unwrap_err();
        assert_eq!(err.character, '😀');
        assert!(encode_sjis_char('😀').is_none());
    }

    #[test]
    fn decode_sjis_flags_malformed_input() {
        let (text, clean) = decode_sjis(&[0x82, 0xA0, 0x82]);
        assert!(!clean);
        assert!(text.starts_with('あ'));
        assert!(text.contains('\u{FFFD}'));

        let (text, clean) = decode_sjis(&[0x82, 0xA0]);
        assert!(clean);
        assert_eq!(text, "あ");
    }

    #[test]
    fn roundtrip_check_rejects_unencodable_text() {
        assert!(is_roundtrip_sjis("セーブデータ"));
        assert!(!is_roundtrip_sjis("😀"));
    }
}
