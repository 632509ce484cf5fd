//! Metrics for the built-in Helvetica base font. The viewer supplies the
//! glyphs, so no font file is embedded; the advance-width tables below are
//! the standard Helvetica AFM data and make text measurement (centering,
//! underlines, link rectangles) deterministic. Text is drawn through the
//! WinAnsi code page, declared on the font dictionary, and [`encode_text`]
//! maps characters onto exactly that byte range.

pub const FONT_RESOURCE: &str = "F1";
pub const BASE_FONT: &str = "Helvetica";
pub const FONT_ENCODING: &str = "WinAnsiEncoding";

const ASCENDER: f32 = 718.0;
const DESCENDER: f32 = -207.0;
const DEFAULT_WIDTH: u16 = 556;

/// Advance widths for the printable ASCII range (32..=126), in 1/1000 em.
#[rustfmt::skip]
const WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

/// Advance widths for the Latin-1 supplement (160..=255), in 1/1000 em.
#[rustfmt::skip]
const LATIN_WIDTHS: [u16; 96] = [
    // nbsp ¡ ¢ £ ¤ ¥ ¦ § ¨ © ª « ¬ shy ® ¯
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // ° ± ² ³ ´ µ ¶ · ¸ ¹ º » ¼ ½ ¾ ¿
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // À Á Â Ã Ä Å Æ Ç È É Ê Ë Ì Í Î Ï
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // Ð Ñ Ò Ó Ô Õ Ö × Ø Ù Ú Û Ü Ý Þ ß
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // à á â ã ä å æ ç è é ê ë ì í î ï
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // ð ñ ò ó ô õ ö ÷ ø ù ú û ü ý þ ÿ
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// The typographic characters cp1252 adds in 0x80..=0x9F on top of Latin-1,
/// as (byte, advance width) pairs. Encoding and measurement share this table
/// so the two can never disagree.
fn winansi_extension(c: char) -> Option<(u8, u16)> {
    let entry = match c {
        '\u{20ac}' => (0x80, 556),
        '\u{201a}' => (0x82, 222),
        '\u{0192}' => (0x83, 556),
        '\u{201e}' => (0x84, 333),
        '\u{2026}' => (0x85, 1000),
        '\u{2020}' => (0x86, 556),
        '\u{2021}' => (0x87, 556),
        '\u{02c6}' => (0x88, 333),
        '\u{2030}' => (0x89, 1000),
        '\u{0160}' => (0x8a, 667),
        '\u{2039}' => (0x8b, 333),
        '\u{0152}' => (0x8c, 1000),
        '\u{017d}' => (0x8e, 611),
        '\u{2018}' => (0x91, 222),
        '\u{2019}' => (0x92, 222),
        '\u{201c}' => (0x93, 333),
        '\u{201d}' => (0x94, 333),
        '\u{2022}' => (0x95, 350),
        '\u{2013}' => (0x96, 556),
        '\u{2014}' => (0x97, 1000),
        '\u{02dc}' => (0x98, 333),
        '\u{2122}' => (0x99, 1000),
        '\u{0161}' => (0x9a, 500),
        '\u{203a}' => (0x9b, 333),
        '\u{0153}' => (0x9c, 944),
        '\u{017e}' => (0x9e, 500),
        '\u{0178}' => (0x9f, 667),
        _ => return None,
    };
    Some(entry)
}

fn char_width(c: char) -> u16 {
    let code = c as u32;
    match code {
        32..=126 => WIDTHS[(code - 32) as usize],
        160..=255 => LATIN_WIDTHS[(code - 160) as usize],
        _ => match winansi_extension(c) {
            Some((_, width)) => width,
            None => DEFAULT_WIDTH,
        },
    }
}

/// Rendered width of a single line at the given size, in points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 * size / 1000.0
}

/// Distance from the top of the line box down to the baseline.
pub fn ascent(size: f32) -> f32 {
    ASCENDER * size / 1000.0
}

pub fn line_height(size: f32) -> f32 {
    (ASCENDER - DESCENDER) * size / 1000.0
}

/// Maps text onto the WinAnsi code page: ASCII and Latin-1 pass through,
/// the cp1252 typographic range is translated, everything else becomes '?'.
/// Measurement uses the same mapping, so measured and drawn text always
/// agree.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            match code {
                32..=126 | 160..=255 => code as u8,
                _ => match winansi_extension(c) {
                    Some((byte, _)) => byte,
                    None => b'?',
                },
            }
        })
        .collect()
}
