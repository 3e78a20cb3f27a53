//! The two-line title block of `icon.sys`.
//!
//! The title lives in a fixed region (0xC0..0x104 by default) as Shift-JIS
//! text. Line 1 starts at the block offset; Line 2 follows immediately after
//! it. The byte at 0x06 records where Line 1 ends. Nothing else in the file
//! is read or written here.

use serde::{Deserialize, Serialize};

use crate::sjis;

/// Offset of the byte holding Line 1's encoded length.
pub const TITLE_SPLIT_OFFSET_POS: usize = 0x06;
pub const DEFAULT_TITLE_BLOCK_OFFSET: usize = 0xC0;
pub const DEFAULT_TITLE_BLOCK_LEN: usize = 68;
pub const TITLE_LINE_CHAR_LIMIT: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TitleBlockError {
    #[error("line is {chars} characters long, the limit is {limit}")]
    LineTooLong { chars: usize, limit: usize },
    #[error("text too long for this file: title needs {needed} bytes, block holds {available}")]
    BlockOverflow { needed: usize, available: usize },
    #[error(
        "title block at 0x{offset:X} with length {len} is unusable: it must not overflow or cover the split offset byte at 0x06"
    )]
    InvalidLayout { offset: usize, len: usize },
}

/// Where the title block sits inside an `icon.sys` buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TitleBlockLayout {
    #[serde(default = "TitleBlockLayout::default_offset")]
    pub offset: usize,
    #[serde(default = "TitleBlockLayout::default_block_len")]
    pub block_len: usize,
}

impl Default for TitleBlockLayout {
    fn default() -> Self {
        Self {
            offset: DEFAULT_TITLE_BLOCK_OFFSET,
            block_len: DEFAULT_TITLE_BLOCK_LEN,
        }
    }
}

/// One decoded title line.
///
/// `text` is always displayable. When `clean` is false the stored bytes were
/// not valid Shift-JIS (or the split offset was out of range) and `text` is a
/// best-effort preview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedLine {
    pub text: String,
    pub clean: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedTitle {
    pub line1: DecodedLine,
    pub line2: DecodedLine,
    /// The raw byte found at 0x06, before any clamping.
    pub split_offset: u8,
}

impl DecodedTitle {
    pub fn is_clean(&self) -> bool {
        self.line1.clean && self.line2.clean
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine {
    pub bytes: Vec<u8>,
    pub char_count: usize,
}

impl TitleBlockLayout {
    pub const fn new(offset: usize, block_len: usize) -> Self {
        Self { offset, block_len }
    }

    const fn default_offset() -> usize {
        DEFAULT_TITLE_BLOCK_OFFSET
    }

    const fn default_block_len() -> usize {
        DEFAULT_TITLE_BLOCK_LEN
    }

    /// One past the last block byte. Saturates for layouts `validate` rejects.
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.block_len)
    }

    pub fn validate(&self) -> Result<(), TitleBlockError> {
        let invalid = TitleBlockError::InvalidLayout {
            offset: self.offset,
            len: self.block_len,
        };
        let end = self.offset.checked_add(self.block_len).ok_or_else(|| invalid.clone())?;
        if (self.offset..end).contains(&TITLE_SPLIT_OFFSET_POS) {
            return Err(invalid);
        }
        Ok(())
    }

    /// Reads both title lines without touching `buffer`.
    ///
    /// A short buffer reads as zero padding and never fails.
    pub fn decode(&self, buffer: &[u8]) -> DecodedTitle {
        let split_offset = buffer.get(TITLE_SPLIT_OFFSET_POS).copied().unwrap_or(0);
        let split = usize::from(split_offset);
        let split_in_range = split <= self.block_len;
        let split = split.min(self.block_len);

        let start = self.offset.min(buffer.len());
        let end = self.end().min(buffer.len());
        let block = &buffer[start..end];

        let (line1_bytes, line2_bytes) = block.split_at(split.min(block.len()));

        let mut line1 = decode_line(line1_bytes);
        let line2 = decode_line(line2_bytes);

        if !split_in_range {
            log::warn!(
                "split offset {split_offset} exceeds title block length {}, clamped",
                self.block_len
            );
            line1.clean = false;
        }

        DecodedTitle {
            line1,
            line2,
            split_offset,
        }
    }

    /// Returns a copy of `buffer` with both lines written and the split offset
    /// recomputed. On error `buffer` is untouched and nothing is returned.
    pub fn encode(
        &self,
        buffer: &[u8],
        line1: &str,
        line2: &str,
    ) -> Result<Vec<u8>, TitleBlockError> {
        self.validate()?;

        let line1 = encode_title_line(line1)?;
        let line2 = encode_title_line(line2)?;

        let needed = line1.bytes.len() + line2.bytes.len();
        if needed > self.block_len {
            return Err(TitleBlockError::BlockOverflow {
                needed,
                available: self.block_len,
            });
        }

        let mut out = buffer.to_vec();
        let min_len = self.end().max(TITLE_SPLIT_OFFSET_POS + 1);
        if out.len() < min_len {
            out.resize(min_len, 0);
        }

        let block = &mut out[self.offset..self.end()];
        block.fill(0);
        block[..line1.bytes.len()].copy_from_slice(&line1.bytes);
        block[line1.bytes.len()..needed].copy_from_slice(&line2.bytes);

        // At most 16 double-byte characters, always fits the one-byte field.
        out[TITLE_SPLIT_OFFSET_POS] = line1.bytes.len() as u8;
        Ok(out)
    }
}

fn decode_line(bytes: &[u8]) -> DecodedLine {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let (text, clean) = sjis::decode_sjis(&bytes[..end]);
    if !clean {
        log::warn!("title line contains malformed Shift-JIS: {:02X?}", &bytes[..end]);
    }
    DecodedLine {
        text: sjis::to_halfwidth_display(&text),
        clean,
    }
}

/// Encodes one title line as full-width Shift-JIS.
///
/// Control characters are dropped, everything else is widened where a
/// full-width form exists and characters Shift-JIS cannot represent become
/// [`sjis::UNSUPPORTED_CHAR_PLACEHOLDER`]. More than
/// [`TITLE_LINE_CHAR_LIMIT`] characters is an error rather than a truncation.
pub fn encode_title_line(text: &str) -> Result<EncodedLine, TitleBlockError> {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
    if chars.len() > TITLE_LINE_CHAR_LIMIT {
        return Err(TitleBlockError::LineTooLong {
            chars: chars.len(),
            limit: TITLE_LINE_CHAR_LIMIT,
        });
    }

    let mut bytes = Vec::with_capacity(chars.len() * 2);
    for &ch in &chars {
        let wide = sjis::to_fullwidth(ch);
        match sjis::encode_sjis_char(wide) {
            Some(encoded) => bytes.extend_from_slice(&encoded),
            None => {
                log::debug!("no Shift-JIS form for {wide:?}, using placeholder");
                if let Some(encoded) = sjis::encode_sjis_char(sjis::UNSUPPORTED_CHAR_PLACEHOLDER) {
                    bytes.extend_from_slice(&encoded);
                }
            }
        }
    }

    Ok(EncodedLine {
        bytes,
        char_count: chars.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON_SYS_LEN: usize = 964;

    fn blank_icon_sys() -> Vec<u8> {
        let mut buffer = vec![0u8; ICON_SYS_LEN];
        buffer[..4].copy_from_slice(b"PS2D");
        buffer
    }

    fn patterned_icon_sys() -> Vec<u8> {
        (0..ICON_SYS_LEN).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn encode_example_save_data_layout() {
        let layout = TitleBlockLayout::default();
        let out = layout.encode(&blank_icon_sys(), "SAVE DATA", "").unwrap();

        assert_eq!(out[TITLE_SPLIT_OFFSET_POS], 18);
        let expected = sjis::encode_sjis("ＳＡＶＥ\u{3000}ＤＡＴＡ").unwrap();
        assert_eq!(&out[0xC0..0xD2], expected.as_slice());
        assert!(out[0xD2..0x104].iter().all(|&b| b == 0));
    }

    #[test]
    fn decode_recovers_text_written_by_encode() {
        let layout = TitleBlockLayout::default();
        let out = layout.encode(&blank_icon_sys(), "テスト", "DATA").unwrap();

        let decoded = layout.decode(&out);
        assert_eq!(decoded.line1.text, "テスト");
        assert_eq!(decoded.line2.text, "DATA");
        assert_eq!(decoded.split_offset, 6);
        assert!(decoded.is_clean());
    }

    #[test]
    fn decode_trims_zero_padding_in_each_line() {
        let mut buffer = blank_icon_sys();
        let line1 = sjis::encode_sjis("セーブ").unwrap();
        buffer[0xC0..0xC0 + line1.len()].copy_from_slice(&line1);
        // Split past the end of the text: the zero run still ends Line 1.
        buffer[TITLE_SPLIT_OFFSET_POS] = 10;
        let line2 = sjis::encode_sjis("データ").unwrap();
        buffer[0xCA..0xCA + line2.len()].copy_from_slice(&line2);

        let decoded = TitleBlockLayout::default().decode(&buffer);
        assert_eq!(decoded.line1.text, "セーブ");
        assert_eq!(decoded.line2.text, "データ");
    }

    #[test]
    fn decode_degrades_gracefully_on_malformed_bytes() {
        let mut buffer = blank_icon_sys();
        buffer[TITLE_SPLIT_OFFSET_POS] = 3;
        buffer[0xC0..0xC3].copy_from_slice(&[0x82, 0xA0, 0x82]);
        buffer[0xC3..0xC5].copy_from_slice(&[0x82, 0xA2]);

        let decoded = TitleBlockLayout::default().decode(&buffer);
        assert!(!decoded.line1.clean);
        assert!(decoded.line1.text.starts_with('あ'));
        assert!(decoded.line2.clean);
        assert_eq!(decoded.line2.text, "い");
        assert!(!decoded.is_clean());
    }

    #[test]
    fn decode_clamps_split_offset_beyond_block() {
        let mut buffer = blank_icon_sys();
        buffer[TITLE_SPLIT_OFFSET_POS] = 200;
        let text = sjis::encode_sjis("ＡＢ").unwrap();
        buffer[0xC0..0xC4].copy_from_slice(&text);

        let decoded = TitleBlockLayout::default().decode(&buffer);
        assert_eq!(decoded.split_offset, 200);
        assert_eq!(decoded.line1.text, "AB");
        assert!(!decoded.line1.clean);
        assert_eq!(decoded.line2.text, "");
    }

    #[test]
    fn decode_tolerates_short_buffers() {
        let decoded = TitleBlockLayout::default().decode(&[0u8; 4]);
        assert_eq!(decoded.split_offset, 0);
        assert_eq!(decoded.line1.text, "");
        assert_eq!(decoded.line2.text, "");
        assert!(decoded.is_clean());
    }

    #[test]
    fn encode_does_not_touch_bytes_outside_block_and_split_field() {
        let layout = TitleBlockLayout::default();
        let original = patterned_icon_sys();
        let out = layout.encode(&original, "メモリーカード", "Slot 1").unwrap();

        assert_eq!(out.len(), original.len());
        for (index, (before, after)) in original.iter().zip(out.iter()).enumerate() {
            if index == TITLE_SPLIT_OFFSET_POS || (layout.offset..layout.end()).contains(&index) {
                continue;
            }
            assert_eq!(before, after, "byte 0x{index:X} changed");
        }
    }

    #[test]
    fn encode_leaves_input_buffer_untouched() {
        let layout = TitleBlockLayout::default();
        let original = patterned_icon_sys();
        let copy = original.clone();
        let _ = layout.encode(&original, "NEW", "TITLE").unwrap();
        assert_eq!(original, copy);
    }

    #[test]
    fn split_offset_tracks_line1_byte_length() {
        let layout = TitleBlockLayout::default();
        for line1 in ["", "A", "ドラゴン", "Mixed カナ 1"] {
            let out = layout.encode(&blank_icon_sys(), line1, "x").unwrap();
            let encoded = encode_title_line(line1).unwrap();
            assert_eq!(usize::from(out[TITLE_SPLIT_OFFSET_POS]), encoded.bytes.len());
        }
    }

    #[test]
    fn reencoding_kept_lines_is_idempotent() {
        let layout = TitleBlockLayout::default();
        let first = layout.encode(&patterned_icon_sys(), "Save-01", "ゲーム").unwrap();

        let decoded = layout.decode(&first);
        let second = layout
            .encode(&first, &decoded.line1.text, &decoded.line2.text)
            .unwrap();
        let third = layout
            .encode(&second, &decoded.line1.text, &decoded.line2.text)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn sixteen_full_width_chars_fit_with_empty_line2() {
        let layout = TitleBlockLayout::default();
        let line1 = "あ".repeat(16);
        let out = layout.encode(&blank_icon_sys(), &line1, "").unwrap();
        assert_eq!(out[TITLE_SPLIT_OFFSET_POS], 32);
        assert_eq!(layout.decode(&out).line1.text, line1);
    }

    #[test]
    fn seventeen_chars_is_line_too_long() {
        let err = encode_title_line(&"A".repeat(17)).unwrap_err();
        assert_eq!(
            err,
            TitleBlockError::LineTooLong {
                chars: 17,
                limit: TITLE_LINE_CHAR_LIMIT
            }
        );

        let layout = TitleBlockLayout::default();
        let err = layout
            .encode(&blank_icon_sys(), "ok", &"い".repeat(17))
            .unwrap_err();
        assert!(matches!(err, TitleBlockError::LineTooLong { chars: 17, .. }));
    }

    #[test]
    fn two_full_lines_fit_in_default_block() {
        let layout = TitleBlockLayout::default();
        let line = "ABCDEFGHIJKLMNOP";
        let out = layout.encode(&blank_icon_sys(), line, line).unwrap();
        assert_eq!(out[TITLE_SPLIT_OFFSET_POS], 32);
        assert!(out[0xC0 + 64..0x104].iter().all(|&b| b == 0));

        let decoded = layout.decode(&out);
        assert_eq!(decoded.line1.text, line);
        assert_eq!(decoded.line2.text, line);
    }

    #[test]
    fn combined_length_over_block_is_block_overflow() {
        // Two legal lines top out at 64 bytes, so overflow needs a narrower block.
        let layout = TitleBlockLayout::new(0xC0, 62);
        let original = blank_icon_sys();
        let err = layout
            .encode(&original, &"あ".repeat(16), &"い".repeat(16))
            .unwrap_err();
        assert_eq!(
            err,
            TitleBlockError::BlockOverflow {
                needed: 64,
                available: 62
            }
        );

        let err = TitleBlockLayout::new(0xC0, 36)
            .encode(&original, &"あ".repeat(16), "ABC")
            .unwrap_err();
        assert_eq!(
            err,
            TitleBlockError::BlockOverflow {
                needed: 38,
                available: 36
            }
        );
    }

    #[test]
    fn unsupported_characters_become_placeholder() {
        let encoded = encode_title_line("A😀B").unwrap();
        assert_eq!(encoded.char_count, 3);
        let mut expected = sjis::encode_sjis("Ａ").unwrap();
        expected.extend_from_slice(&[0x81, 0x40]);
        expected.extend(sjis::encode_sjis("Ｂ").unwrap());
        assert_eq!(encoded.bytes, expected);
    }

    #[test]
    fn control_characters_are_dropped_before_counting() {
        let encoded = encode_title_line("AB\u{0007}C\n").unwrap();
        assert_eq!(encoded.char_count, 3);
        assert_eq!(encoded.bytes, sjis::encode_sjis("ＡＢＣ").unwrap());
    }

    #[test]
    fn layout_overlapping_split_byte_is_rejected() {
        let layout = TitleBlockLayout::new(0x00, 68);
        assert_eq!(
            layout.validate(),
            Err(TitleBlockError::InvalidLayout {
                offset: 0,
                len: 68
            })
        );
        assert!(layout.encode(&blank_icon_sys(), "A", "B").is_err());
        assert!(TitleBlockLayout::new(0x07, 68).validate().is_ok());
    }

    #[test]
    fn layout_past_address_space_is_rejected_without_panicking() {
        let layout = TitleBlockLayout::new(usize::MAX, 68);
        assert_eq!(
            layout.validate(),
            Err(TitleBlockError::InvalidLayout {
                offset: usize::MAX,
                len: 68
            })
        );
        assert_eq!(layout.end(), usize::MAX);

        let decoded = layout.decode(&blank_icon_sys());
        assert_eq!(decoded.line1.text, "");
        assert_eq!(decoded.line2.text, "");
        assert!(layout.encode(&blank_icon_sys(), "A", "B").is_err());
    }

    #[test]
    fn kept_lines_with_fullwidth_minus_and_apostrophe_keep_their_bytes() {
        let layout = TitleBlockLayout::default();
        let mut buffer = blank_icon_sys();
        // "Ａ－Ｂ" then "＇Ｃ", using the full-width forms 81 7C and FA 56.
        let line1 = [0x82, 0x60, 0x81, 0x7C, 0x82, 0x61];
        let line2 = [0xFA, 0x56, 0x82, 0x62];
        buffer[TITLE_SPLIT_OFFSET_POS] = line1.len() as u8;
        buffer[0xC0..0xC6].copy_from_slice(&line1);
        buffer[0xC6..0xCA].copy_from_slice(&line2);

        let decoded = layout.decode(&buffer);
        assert!(decoded.is_clean());
        let out = layout
            .encode(&buffer, &decoded.line1.text, &decoded.line2.text)
            .unwrap();
        assert_eq!(out, buffer);
    }

    #[test]
    fn encode_extends_truncated_buffer() {
        let layout = TitleBlockLayout::default();
        let out = layout.encode(&[1, 2, 3], "A", "").unwrap();
        assert_eq!(out.len(), layout.end());
        assert_eq!(&out[..3], &[1, 2, 3]);
        assert_eq!(out[TITLE_SPLIT_OFFSET_POS], 2);
    }
}
