//! Helvetica font metrics and line wrapping.
//!
//! Widths are the standard Adobe metrics for the base-14 Helvetica faces, in
//! thousandths of the font size. The oblique face shares the regular widths.

/// Printable ASCII (32..=126) widths for Helvetica.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Printable ASCII (32..=126) widths for Helvetica-Bold.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

/// A face of the Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
    /// Helvetica-Oblique.
    Oblique,
}

impl Font {
    /// Every face, in resource order.
    pub const ALL: [Self; 3] = [Self::Regular, Self::Bold, Self::Oblique];

    /// PostScript name of the face.
    #[must_use]
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Oblique => "Helvetica-Oblique",
        }
    }

    /// Name of the font resource in page content streams.
    #[must_use]
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Oblique => "F3",
        }
    }

    fn table(self) -> &'static [u16; 95] {
        match self {
            Self::Regular | Self::Oblique => &HELVETICA,
            Self::Bold => &HELVETICA_BOLD,
        }
    }
}

/// Width of one character in thousandths of the font size.
#[must_use]
pub fn char_width(font: Font, c: char) -> u16 {
    match u8::try_from(c) {
        Ok(byte @ 32..=126) => font.table()[usize::from(byte - 32)],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` in points at the given size.
#[must_use]
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(font, c))).sum();
    f64::from(units) * size / 1000.0
}

/// Wrap `text` into lines no wider than `max_width` points.
///
/// Newlines start a new line and are kept, so an empty paragraph yields an
/// empty line. Runs of spaces collapse. A word wider than the line is broken
/// between characters.
#[must_use]
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font, size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let mut chunk = current.clone();
                    chunk.push(c);
                    if !current.is_empty() && text_width(&chunk, font, size) > max_width {
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    } else {
                        current = chunk;
                    }
                }
            }
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_widths() {
        assert_eq!(char_width(Font::Regular, ' '), 278);
        assert_eq!(char_width(Font::Regular, 'W'), 944);
        assert_eq!(char_width(Font::Regular, 'i'), 222);
        assert_eq!(char_width(Font::Bold, 'i'), 278);
        assert_eq!(char_width(Font::Oblique, 'm'), 833);
        assert_eq!(char_width(Font::Regular, 'é'), FALLBACK_WIDTH);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w10 = text_width("Minutes", Font::Bold, 10.0);
        let w20 = text_width("Minutes", Font::Bold, 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-9);
        // "ab" = 556 + 556 units at 10pt
        assert!((text_width("ab", Font::Regular, 10.0) - 11.12).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = wrap_text("Call to Order", Font::Regular, 11.0, 400.0);
        assert_eq!(lines, vec!["Call to Order"]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "The committee reviewed the quarterly figures and agreed to revisit \
                    the capital budget at the next meeting after the audit is complete.";
        let lines = wrap_text(text, Font::Regular, 11.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 11.0) <= 200.0, "too wide: {line}");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        let lines = wrap_text("first\n\n[14:05] Bob: said", Font::Regular, 11.0, 400.0);
        assert_eq!(lines, vec!["first", "", "[14:05] Bob: said"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let word = "x".repeat(100);
        let lines = wrap_text(&word, Font::Regular, 10.0, 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 50.0);
        }
    }

    #[test]
    fn test_wrap_empty_text() {
        assert_eq!(wrap_text("", Font::Regular, 11.0, 100.0), vec![String::new()]);
    }
}
