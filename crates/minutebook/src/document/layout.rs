//! Paginated layout of a meeting's minutes document.
//!
//! [`layout_meeting`] walks the meeting in a fixed order and emits drawing
//! operations page by page. Coordinates are in points with the origin at the
//! top-left corner of the page; text `y` is the baseline. Before each block
//! the composer checks whether the block fits above the bottom margin and
//! starts a new page if it does not.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::metrics::{text_width, wrap_text, Font};
use crate::meeting::Meeting;

/// Page margin on every side.
pub const MARGIN: f64 = 72.0;
/// Indent of agenda notes relative to the margin.
pub const INDENT: f64 = 20.0;

/// Advance per line of body text.
const LINE: f64 = 15.0;
/// Padding inside table cells.
const CELL_PADDING: f64 = 5.0;
/// Font size of table cells.
const CELL_FONT_SIZE: f64 = 10.0;
/// Advance per line inside a table cell.
const CELL_LINE: f64 = CELL_FONT_SIZE * 1.15;

const NO_NOTES: &str = "No detailed notes were recorded for this item.";

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4, 210 x 297 mm.
    #[default]
    #[serde(alias = "a4")]
    A4,
    /// US Letter, 8.5 x 11 in.
    #[serde(alias = "letter")]
    Letter,
}

impl PageSize {
    /// Page width in points.
    #[must_use]
    pub fn width(self) -> f64 {
        match self {
            Self::A4 => 595.28,
            Self::Letter => 612.0,
        }
    }

    /// Page height in points.
    #[must_use]
    pub fn height(self) -> f64 {
        match self {
            Self::A4 => 841.89,
            Self::Letter => 792.0,
        }
    }

    /// Width between the left and right margins.
    #[must_use]
    pub fn content_width(self) -> f64 {
        self.width() - 2.0 * MARGIN
    }

    /// Lowest baseline allowed on a page.
    #[must_use]
    pub fn limit(self) -> f64 {
        self.height() - MARGIN
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A4 => write!(f, "A4"),
            Self::Letter => write!(f, "Letter"),
        }
    }
}

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self(255, 255, 255);
    /// Fill of table header rows.
    pub const HEADER: Self = Self(7, 82, 156);
    /// Table grid lines.
    pub const GRID: Self = Self(200, 200, 200);
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single line of text; `y` is the baseline.
    Text {
        /// Left edge.
        x: f64,
        /// Baseline.
        y: f64,
        /// Content.
        text: String,
        /// Face.
        font: Font,
        /// Size in points.
        size: f64,
        /// Fill color.
        color: Rgb,
    },
    /// A filled rectangle; `y` is the top edge.
    FillRect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Fill color.
        color: Rgb,
    },
    /// A rectangle outline; `y` is the top edge.
    StrokeRect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Stroke color.
        color: Rgb,
    },
}

/// The operations of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Operations in drawing order.
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text lines on this page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Paper size of every page.
    pub page_size: PageSize,
    /// Pages in order; never empty.
    pub pages: Vec<Page>,
}

/// Height of `n` stacked lines.
#[allow(clippy::cast_precision_loss)]
fn stacked(n: usize, line: f64) -> f64 {
    n as f64 * line
}

/// Whole cell lines that fit in `room` points.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lines_fitting(room: f64) -> usize {
    if room < CELL_LINE {
        0
    } else {
        (room / CELL_LINE).floor() as usize
    }
}

/// A table to lay out: a title row, a column header row, and body rows.
struct Table<'a> {
    title: &'a str,
    columns: &'a [&'a str],
    /// Fraction of the content width taken by each column.
    widths: &'a [f64],
    rows: Vec<Vec<String>>,
}

struct Composer {
    page_size: PageSize,
    pages: Vec<Page>,
    y: f64,
}

impl Composer {
    fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            pages: vec![Page::default()],
            y: MARGIN,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = MARGIN;
    }

    /// Start a new page unless `needed` points fit below the cursor.
    ///
    /// A block taller than a whole page is placed at the top of the current
    /// page when nothing has been drawn below the top margin yet.
    fn ensure(&mut self, needed: f64) {
        if self.y + needed > self.page_size.limit() && self.y > MARGIN {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text_at(&mut self, x: f64, y: f64, text: impl Into<String>, font: Font, size: f64, color: Rgb) {
        self.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            font,
            size,
            color,
        });
    }

    fn text(&mut self, x: f64, text: impl Into<String>, font: Font, size: f64) {
        self.text_at(x, self.y, text, font, size, Rgb::BLACK);
    }

    fn title(&mut self, title: &str) {
        let size = 22.0;
        let lines = wrap_text(title, Font::Bold, size, self.page_size.content_width());
        for (i, line) in lines.iter().enumerate() {
            let x = (self.page_size.width() - text_width(line, Font::Bold, size)) / 2.0;
            self.text_at(x, self.y + stacked(i, 26.0), line.clone(), Font::Bold, size, Rgb::BLACK);
        }
        self.y += 30.0 + stacked(lines.len().saturating_sub(1), 26.0);
    }

    fn heading(&mut self, text: &str) {
        self.text(MARGIN, text, Font::Bold, 14.0);
        self.y += 20.0;
    }

    fn table(&mut self, table: &Table<'_>) {
        let content_width = self.page_size.content_width();
        let widths: Vec<f64> = table.widths.iter().map(|w| w * content_width).collect();
        let header_height = 2.0 * (CELL_LINE + 2.0 * CELL_PADDING);

        let rows: Vec<Vec<Vec<String>>> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&widths)
                    .map(|(cell, width)| {
                        wrap_text(cell, Font::Regular, CELL_FONT_SIZE, width - 2.0 * CELL_PADDING)
                    })
                    .collect()
            })
            .collect();
        let heights: Vec<f64> = rows
            .iter()
            .map(|cells| {
                let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
                stacked(lines, CELL_LINE) + 2.0 * CELL_PADDING
            })
            .collect();

        let first_row = heights.first().copied().unwrap_or(0.0);
        self.ensure(header_height + first_row.min(stacked(1, CELL_LINE) + 2.0 * CELL_PADDING));
        self.table_header(table, &widths);

        for (cells, height) in rows.iter().zip(heights) {
            if self.y + height <= self.page_size.limit() {
                self.row(cells, &widths, 0, usize::MAX);
                continue;
            }
            let fresh_room = self.page_size.limit() - MARGIN - header_height;
            if height <= fresh_room {
                self.new_page();
                self.table_header(table, &widths);
                self.row(cells, &widths, 0, usize::MAX);
                continue;
            }

            // Taller than a page: continue the row line by line.
            let total = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let mut start = 0;
            while start < total {
                let room = self.page_size.limit() - self.y - 2.0 * CELL_PADDING;
                let fit = lines_fitting(room);
                if fit == 0 {
                    self.new_page();
                    self.table_header(table, &widths);
                    continue;
                }
                let end = (start + fit).min(total);
                self.row(cells, &widths, start, end);
                start = end;
                if start < total {
                    self.new_page();
                    self.table_header(table, &widths);
                }
            }
        }
    }

    /// Draw lines `start..end` of a body row as one band of cells.
    fn row(&mut self, cells: &[Vec<String>], widths: &[f64], start: usize, end: usize) {
        let band: Vec<&[String]> = cells
            .iter()
            .map(|lines| {
                let from = start.min(lines.len());
                &lines[from..end.min(lines.len())]
            })
            .collect();
        let lines = band.iter().map(|b| b.len()).max().unwrap_or(0).max(1);
        let height = stacked(lines, CELL_LINE) + 2.0 * CELL_PADDING;

        let mut x = MARGIN;
        for (lines, width) in band.iter().zip(widths) {
            self.cell(x, *width, height, lines, Font::Regular, Rgb::BLACK, None);
            x += width;
        }
        self.y += height;
    }

    fn table_header(&mut self, table: &Table<'_>, widths: &[f64]) {
        let height = CELL_LINE + 2.0 * CELL_PADDING;
        let full_width: f64 = widths.iter().sum();
        self.cell(
            MARGIN,
            full_width,
            height,
            &[table.title.to_string()],
            Font::Bold,
            Rgb::WHITE,
            Some(Rgb::HEADER),
        );
        self.y += height;

        let mut x = MARGIN;
        for (column, width) in table.columns.iter().zip(widths) {
            self.cell(
                x,
                *width,
                height,
                &[(*column).to_string()],
                Font::Bold,
                Rgb::WHITE,
                Some(Rgb::HEADER),
            );
            x += width;
        }
        self.y += height;
    }

    #[allow(clippy::too_many_arguments)]
    fn cell(
        &mut self,
        x: f64,
        width: f64,
        height: f64,
        lines: &[String],
        font: Font,
        color: Rgb,
        fill: Option<Rgb>,
    ) {
        let top = self.y;
        if let Some(fill) = fill {
            self.push(DrawOp::FillRect {
                x,
                y: top,
                width,
                height,
                color: fill,
            });
        }
        self.push(DrawOp::StrokeRect {
            x,
            y: top,
            width,
            height,
            color: Rgb::GRID,
        });
        for (i, line) in lines.iter().enumerate() {
            let baseline = top + CELL_PADDING + stacked(i, CELL_LINE) + CELL_FONT_SIZE * 0.8;
            self.text_at(x + CELL_PADDING, baseline, line.clone(), font, CELL_FONT_SIZE, color);
        }
    }

    fn finish(self) -> Layout {
        Layout {
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

/// Lay out the minutes document for `meeting`.
///
/// `generated_at` is printed in the document header; identical inputs
/// produce identical layouts.
#[must_use]
pub fn layout_meeting(meeting: &Meeting, generated_at: NaiveDateTime, page_size: PageSize) -> Layout {
    let mut doc = Composer::new(page_size);
    let content_width = page_size.content_width();

    doc.title(&meeting.title);

    let end_time = meeting
        .end_time
        .map_or_else(|| "N/A".to_string(), |t| t.format("%H:%M").to_string());
    let details = [
        format!("Date: {}", meeting.date.format("%a %b %d %Y")),
        format!("Time: {} - {end_time}", meeting.start_time.format("%H:%M")),
        format!("Location: {}", meeting.location),
        format!(
            "Generated on: {}",
            generated_at.format("%-m/%-d/%Y, %-I:%M:%S %p")
        ),
    ];
    for detail in details {
        doc.text(MARGIN, detail, Font::Regular, 11.0);
        doc.y += LINE;
    }
    doc.y += 10.0;

    doc.ensure(30.0 + stacked(meeting.attendees.len(), LINE));
    doc.heading("Attendees");
    for attendee in &meeting.attendees {
        doc.ensure(LINE);
        doc.text(
            MARGIN,
            format!("- {} ({})", attendee.name, attendee.status.label()),
            Font::Regular,
            11.0,
        );
        doc.y += LINE;
    }
    doc.y += 10.0;

    doc.ensure(30.0);
    doc.heading("Minutes by Agenda Item");
    for item in &meeting.agenda {
        let title = format!("{} (Presenter: {})", item.title, item.presenter);
        let title_lines = wrap_text(&title, Font::Bold, 12.0, content_width);
        let notes_room = if item.has_notes() { 30.0 } else { 0.0 };
        doc.ensure(20.0 + stacked(title_lines.len(), LINE) + notes_room);
        for line in title_lines {
            doc.text(MARGIN, line, Font::Bold, 12.0);
            doc.y += LINE;
        }
        doc.y += 5.0;

        if item.has_notes() {
            let note_lines = wrap_text(&item.notes, Font::Regular, 11.0, content_width - INDENT);
            doc.ensure(stacked(note_lines.len(), LINE));
            for line in note_lines {
                doc.ensure(LINE);
                doc.text(MARGIN + INDENT, line, Font::Regular, 11.0);
                doc.y += LINE;
            }
            doc.y += 10.0;
        } else {
            doc.text(MARGIN + INDENT, NO_NOTES, Font::Oblique, 10.0);
            doc.y += 20.0;
        }
    }

    if !meeting.decisions.is_empty() {
        let rows = meeting
            .decisions
            .iter()
            .map(|d| {
                vec![
                    d.motion.clone(),
                    meeting.attendee_name(&d.mover_id).to_string(),
                    meeting.attendee_name(&d.seconder_id).to_string(),
                    d.outcome.label().to_string(),
                ]
            })
            .collect();
        doc.table(&Table {
            title: "Decisions Log",
            columns: &["Motion", "Moved By", "Seconded By", "Outcome"],
            widths: &[0.46, 0.18, 0.18, 0.18],
            rows,
        });
        doc.y += 20.0;
    }

    if !meeting.action_items.is_empty() {
        let rows = meeting
            .action_items
            .iter()
            .map(|a| {
                vec![
                    a.description.clone(),
                    meeting.attendee_name(&a.owner_id).to_string(),
                    a.due_date
                        .map_or_else(|| "N/A".to_string(), |d| d.format("%-m/%-d/%Y").to_string()),
                ]
            })
            .collect();
        doc.table(&Table {
            title: "Action Items",
            columns: &["Task", "Assigned To", "Due Date"],
            widths: &[0.56, 0.24, 0.20],
            rows,
        });
        doc.y += 30.0;
    }

    doc.ensure(60.0);
    doc.text(MARGIN, "Record by: ___________________________", Font::Regular, 11.0);
    doc.y += 40.0;
    doc.text(MARGIN, "Approved by: __________________________", Font::Regular, 11.0);

    doc.finish()
}
