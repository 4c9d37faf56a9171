//! Standard-14 Helvetica: `WinAnsiEncoding` and advance widths
//!
//! Widths are the Adobe AFM values in 1/1000 em for codes 0x20..=0xFF.
//! Codes `WinAnsiEncoding` leaves undefined are zero; the encoder never
//! produces them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Advance width of `text` in points when set at `size`
    pub fn width(self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, size)).sum()
    }

    pub fn char_width(self, c: char, size: f32) -> f32 {
        let table = match self {
            Self::Regular => &HELVETICA,
            Self::Bold => &HELVETICA_BOLD,
        };
        let code = usize::from(encode(c));
        let units = code
            .checked_sub(0x20)
            .and_then(|i| table.get(i))
            .copied()
            .unwrap_or(0);
        f32::from(units) * size / 1000.0
    }
}

/// Encode for the standard fonts' `WinAnsiEncoding`. Characters outside it
/// become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode).collect()
}

fn encode(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' | '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(c)).unwrap_or(b'?'),
        '\u{20AC}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        _ => b'?',
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn ascii_passes_through() {
        assert_eq!(win_ansi("User: (hi)"), b"User: (hi)".to_vec());
    }

    #[test]
    fn latin1_and_quotes_are_mapped() {
        assert_eq!(win_ansi("é"), vec![0xE9]);
        assert_eq!(win_ansi("\u{201C}x\u{201D}"), vec![0x93, b'x', 0x94]);
    }

    #[test]
    fn unmappable_becomes_question_mark() {
        assert_eq!(win_ansi("日本"), b"??".to_vec());
        assert_eq!(win_ansi("\u{7}"), b"?".to_vec());
    }

    #[test]
    fn afm_widths() {
        assert!(close(Font::Regular.width("W", 1000.0), 944.0));
        assert!(close(Font::Regular.width("i", 1000.0), 222.0));
        assert!(close(Font::Regular.width("@", 1000.0), 1015.0));
        assert!(close(Font::Bold.width("i", 1000.0), 278.0));
        assert!(close(Font::Regular.width("é", 1000.0), 556.0));
        assert!(close(Font::Bold.width("User:", 10.0), 25.56));
    }

    #[test]
    fn unmappable_is_measured_as_question_mark() {
        assert!(close(
            Font::Regular.width("日", 10.0),
            Font::Regular.width("?", 10.0)
        ));
    }
}
