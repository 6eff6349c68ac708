//! 3x5 bitmap font. Each glyph row is three bits, MSB leftmost.

pub const GLYPH_W: usize = 3;
pub const GLYPH_H: usize = 5;
/// Horizontal advance per character, including one column of spacing.
pub const ADVANCE: usize = GLYPH_W + 1;

#[rustfmt::skip]
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b011, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

#[rustfmt::skip]
const LETTERS: [[u8; 5]; 26] = [
    [0b010, 0b101, 0b111, 0b101, 0b101], // A
    [0b110, 0b101, 0b110, 0b101, 0b110], // B
    [0b011, 0b100, 0b100, 0b100, 0b011], // C
    [0b110, 0b101, 0b101, 0b101, 0b110], // D
    [0b111, 0b100, 0b110, 0b100, 0b111], // E
    [0b111, 0b100, 0b110, 0b100, 0b100], // F
    [0b011, 0b100, 0b101, 0b101, 0b011], // G
    [0b101, 0b101, 0b111, 0b101, 0b101], // H
    [0b111, 0b010, 0b010, 0b010, 0b111], // I
    [0b001, 0b001, 0b001, 0b101, 0b010], // J
    [0b101, 0b101, 0b110, 0b101, 0b101], // K
    [0b100, 0b100, 0b100, 0b100, 0b111], // L
    [0b101, 0b111, 0b111, 0b101, 0b101], // M
    [0b110, 0b101, 0b101, 0b101, 0b101], // N
    [0b010, 0b101, 0b101, 0b101, 0b010], // O
    [0b110, 0b101, 0b110, 0b100, 0b100], // P
    [0b010, 0b101, 0b101, 0b110, 0b011], // Q
    [0b110, 0b101, 0b110, 0b101, 0b101], // R
    [0b011, 0b100, 0b010, 0b001, 0b110], // S
    [0b111, 0b010, 0b010, 0b010, 0b010], // T
    [0b101, 0b101, 0b101, 0b101, 0b111], // U
    [0b101, 0b101, 0b101, 0b101, 0b010], // V
    [0b101, 0b101, 0b111, 0b111, 0b101], // W
    [0b101, 0b101, 0b010, 0b101, 0b101], // X
    [0b101, 0b101, 0b010, 0b010, 0b010], // Y
    [0b111, 0b001, 0b010, 0b100, 0b111], // Z
];

const COLON: [u8; 5] = [0b000, 0b010, 0b000, 0b010, 0b000];
const BANG: [u8; 5] = [0b010, 0b010, 0b010, 0b000, 0b010];
const BLANK: [u8; 5] = [0; 5];

/// Glyph rows for `c`, case-insensitive. `None` for characters with no glyph.
pub fn glyph(c: char) -> Option<[u8; 5]> {
    match c.to_ascii_uppercase() {
        d @ '0'..='9' => Some(DIGITS[d as usize - '0' as usize]),
        l @ 'A'..='Z' => Some(LETTERS[l as usize - 'A' as usize]),
        ':' => Some(COLON),
        '!' => Some(BANG),
        ' ' => Some(BLANK),
        _ => None,
    }
}

/// Whether the font cell at (`col`, `row`) of `rows` is lit.
pub fn lit(rows: &[u8; 5], col: usize, row: usize) -> bool {
    (rows[row] >> (GLYPH_W - 1 - col)) & 1 == 1
}

/// Width of `text` in font cells.
pub fn text_width(text: &str) -> usize {
    (text.chars().count() * ADVANCE).saturating_sub(1)
}
