//! PDF 1.4 serialization of a [`Layout`].
//!
//! The writer only needs the base-14 Helvetica faces, so no fonts are
//! embedded. Text is encoded with `WinAnsiEncoding`; characters outside it
//! are written as `?`.

use std::fmt::Write as _;

use super::layout::{DrawOp, Layout, Rgb};
use super::metrics::Font;

/// Object numbers of the fixed objects.
const CATALOG: usize = 1;
const PAGES: usize = 2;
const INFO: usize = 3;
const FIRST_FONT: usize = 4;

/// Map a character to its `WinAnsiEncoding` code.
#[must_use]
pub fn win_ansi(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => u8::try_from(c).unwrap_or(b'?'),
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        '\t' => b' ',
        _ => b'?',
    }
}

/// Encode `text` as a PDF literal string body (without the parentheses).
///
/// The result is plain ASCII: delimiters are escaped and bytes above 0x7e
/// are written as octal escapes.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi(c) {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            byte @ 0x20..=0x7e => out.push(char::from(byte)),
            byte => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

/// Format a coordinate with at most two decimals.
fn num(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn color(rgb: Rgb) -> String {
    format!(
        "{} {} {}",
        num(f64::from(rgb.0) / 255.0),
        num(f64::from(rgb.1) / 255.0),
        num(f64::from(rgb.2) / 255.0)
    )
}

/// Render the drawing operations of one page as a content stream.
fn content_stream(ops: &[DrawOp], page_height: f64) -> String {
    let mut out = String::new();
    for op in ops {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font,
                size,
                color: rgb,
            } => {
                let _ = writeln!(
                    out,
                    "BT {} rg /{} {} Tf {} {} Td ({}) Tj ET",
                    color(*rgb),
                    font.resource_name(),
                    num(*size),
                    num(*x),
                    num(page_height - y),
                    escape_text(text)
                );
            }
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color: rgb,
            } => {
                let _ = writeln!(
                    out,
                    "{} rg {} {} {} {} re f",
                    color(*rgb),
                    num(*x),
                    num(page_height - y - height),
                    num(*width),
                    num(*height)
                );
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                color: rgb,
            } => {
                let _ = writeln!(
                    out,
                    "0.5 w {} RG {} {} {} {} re S",
                    color(*rgb),
                    num(*x),
                    num(page_height - y - height),
                    num(*width),
                    num(*height)
                );
            }
        }
    }
    out
}

/// Accumulates numbered objects and their byte offsets.
struct Writer {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl Writer {
    fn new() -> Self {
        let mut buf = Vec::new();
        // Header plus a comment of high bytes marking the file as binary.
        buf.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Append object `number`, which must be the next one in sequence.
    fn object(&mut self, number: usize, body: &str) {
        debug_assert_eq!(number, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, number: usize, content: &str) {
        let body = format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        );
        self.object(number, &body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut table = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = write!(table, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {count} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        );
        self.buf.extend_from_slice(table.as_bytes());
        self.buf
    }
}

/// Serialize `layout` as a PDF document titled `title`.
#[must_use]
pub fn write_pdf(layout: &Layout, title: &str) -> Vec<u8> {
    let mut writer = Writer::new();
    let first_page = FIRST_FONT + Font::ALL.len();
    let page_numbers: Vec<usize> = (0..layout.pages.len())
        .map(|i| first_page + 2 * i)
        .collect();

    writer.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));

    let kids = page_numbers
        .iter()
        .map(|n| format!("{n} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        PAGES,
        &format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} /MediaBox [0 0 {} {}] >>",
            layout.pages.len(),
            num(layout.page_size.width()),
            num(layout.page_size.height())
        ),
    );

    writer.object(
        INFO,
        &format!(
            "<< /Title ({}) /Producer (minutebook {}) >>",
            escape_text(title),
            env!("CARGO_PKG_VERSION")
        ),
    );

    let mut fonts = String::new();
    for (i, font) in Font::ALL.iter().enumerate() {
        let number = FIRST_FONT + i;
        writer.object(
            number,
            &format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_name()
            ),
        );
        let _ = write!(fonts, "/{} {number} 0 R ", font.resource_name());
    }

    for (page, number) in layout.pages.iter().zip(&page_numbers) {
        let contents = number + 1;
        writer.object(
            *number,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /Resources << /Font << {}>> >> /Contents {contents} 0 R >>",
                fonts
            ),
        );
        writer.stream(contents, &content_stream(&page.ops, layout.page_size.height()));
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::layout::{Page, PageSize};

    fn text_op(text: &str) -> DrawOp {
        DrawOp::Text {
            x: 72.0,
            y: 100.0,
            text: text.to_string(),
            font: Font::Bold,
            size: 12.0,
            color: Rgb::BLACK,
        }
    }

    fn sample_layout(pages: usize) -> Layout {
        Layout {
            page_size: PageSize::A4,
            pages: (0..pages)
                .map(|i| Page {
                    ops: vec![text_op(&format!("Page {i}"))],
                })
                .collect(),
        }
    }

    fn find(haystack: &[u8], needle: &str) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("a—b"), "a\\227b");
        assert_eq!(escape_text("会议"), "??");
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi('A'), b'A');
        assert_eq!(win_ansi('€'), 0x80);
        assert_eq!(win_ansi('’'), 0x92);
        assert_eq!(win_ansi('ü'), 0xfc);
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(72.0), "72");
        assert_eq!(num(595.28), "595.28");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(1.0 / 3.0), "0.33");
    }

    #[test]
    fn test_content_stream_flips_y() {
        let stream = content_stream(&[text_op("Hi")], 841.89);
        assert_eq!(stream, "BT 0 0 0 rg /F2 12 Tf 72 741.89 Td (Hi) Tj ET\n");

        let stream = content_stream(
            &[DrawOp::FillRect {
                x: 72.0,
                y: 100.0,
                width: 50.0,
                height: 20.0,
                color: Rgb::HEADER,
            }],
            800.0,
        );
        assert_eq!(stream, "0.03 0.32 0.61 rg 72 680 50 20 re f\n");
    }

    #[test]
    fn test_document_structure() {
        let pdf = write_pdf(&sample_layout(3), "Board (Q2)");

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(find(&pdf, "/Count 3").is_some());
        assert!(find(&pdf, "/BaseFont /Helvetica-Oblique").is_some());
        assert!(find(&pdf, "/Title (Board \\(Q2\\))").is_some());
        assert!(find(&pdf, "(Page 2) Tj").is_some());
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = write_pdf(&sample_layout(2), "Offsets");
        let text = String::from_utf8_lossy(&pdf);

        let startxref = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap();
        assert!(pdf[startxref..].starts_with(b"xref\n"));

        let entries: Vec<usize> = text[text.find("xref\n").unwrap()..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        // catalog, pages, info, 3 fonts, and a page + contents per page
        assert_eq!(entries.len(), 6 + 2 * 2);
        for (i, offset) in entries.iter().enumerate() {
            let header = format!("{} 0 obj\n", i + 1);
            assert!(pdf[*offset..].starts_with(header.as_bytes()), "object {}", i + 1);
        }
    }

    #[test]
    fn test_stream_length_matches_content() {
        let pdf = write_pdf(&sample_layout(1), "One");
        let text = String::from_utf8_lossy(&pdf);
        let start = text.find("<< /Length ").unwrap() + "<< /Length ".len();
        let length: usize = text[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let body_start = text[start..].find("stream\n").unwrap() + start + "stream\n".len();
        assert_eq!(&text[body_start + length..body_start + length + 9], "endstream");
    }
}
