//! Flow layout of a transcript onto fixed-size pages
//!
//! Letter pages with one-inch margins, 10/12pt body text, images at a
//! fixed two-inch square. Lines are wrapped by Helvetica advance widths.
//! Breaks happen wherever the next item no longer fits; nothing is split
//! across pages except paragraphs between lines.

use super::font::Font;
use crate::store::Exchange;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;
pub const FONT_SIZE: f32 = 10.0;
pub const LEADING: f32 = 12.0;
pub const IMAGE_SIZE: f32 = 144.0;
/// Width of the text frame between the margins
pub const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Gap between the image and the text around it
const IMAGE_PADDING: f32 = 6.0;

pub const USER_LABEL: &str = "User:";
pub const BOT_LABEL: &str = "Bot:";

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// One line of text; `label` is drawn bold in front of `text`
    Line {
        x: f32,
        y: f32,
        label: Option<&'static str>,
        text: String,
    },
    /// The image of exchange `exchange`, lower-left corner at (x, y)
    Image {
        x: f32,
        y: f32,
        size: f32,
        exchange: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
}

/// Lay out every exchange in order. Always yields at least one page.
pub fn layout(exchanges: &[Exchange]) -> Vec<Page> {
    let mut cursor = Cursor::new();
    for (index, exchange) in exchanges.iter().enumerate() {
        cursor.paragraph(USER_LABEL, exchange.input());
        cursor.paragraph(BOT_LABEL, exchange.response());
        if exchange.image().is_some() {
            cursor.image(index);
        }
        cursor.blank_line();
    }
    cursor.finish()
}

/// Width taken by a bold label and the space after it
pub fn label_width(label: &str) -> f32 {
    Font::Bold.width(label, FONT_SIZE) + Font::Regular.width(" ", FONT_SIZE)
}

/// Greedy word wrap by measured width. `first` is the width available to
/// the first line in points, `rest` to the following ones. Hard newlines
/// are kept; words wider than a line are cut between characters.
pub fn wrap(text: &str, first: f32, rest: f32) -> Vec<String> {
    let font = Font::Regular;
    let space = font.width(" ", FONT_SIZE);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0f32;
    let mut capacity = first;

    for (i, raw_line) in text.split('\n').enumerate() {
        if i > 0 {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
            capacity = rest;
        }
        for mut word in raw_line.split_whitespace() {
            loop {
                let width = font.width(word, FONT_SIZE);
                let needed = if current.is_empty() {
                    width
                } else {
                    current_width + space + width
                };
                if needed <= capacity {
                    if !current.is_empty() {
                        current.push(' ');
                        current_width += space;
                    }
                    current.push_str(word);
                    current_width += width;
                    break;
                }
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                    capacity = rest;
                    continue;
                }
                // A single word wider than the whole line
                let (head, tail) = word.split_at(fitting_prefix(word, capacity));
                current.push_str(head);
                current_width = font.width(head, FONT_SIZE);
                word = tail;
                if word.is_empty() {
                    break;
                }
            }
        }
    }
    lines.push(current);
    lines
}

/// Byte length of the longest prefix of `word` within `capacity` points,
/// never less than one character
fn fitting_prefix(word: &str, capacity: f32) -> usize {
    let mut width = 0.0f32;
    for (i, c) in word.char_indices() {
        width += Font::Regular.char_width(c, FONT_SIZE);
        if width > capacity {
            return if i == 0 { c.len_utf8() } else { i };
        }
    }
    word.len()
}

struct Cursor {
    pages: Vec<Page>,
    current: Page,
    /// Top of the remaining space on the current page
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_space(&mut self, height: f32) {
        let at_top = self.current.items.is_empty();
        if self.y - height < MARGIN && !at_top {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line(&mut self, label: Option<&'static str>, text: String) {
        self.ensure_space(LEADING);
        self.current.items.push(Item::Line {
            x: MARGIN,
            y: self.y - FONT_SIZE,
            label,
            text,
        });
        self.y -= LEADING;
    }

    fn paragraph(&mut self, label: &'static str, text: &str) {
        let lines = wrap(text, TEXT_WIDTH - label_width(label), TEXT_WIDTH);
        for (i, line) in lines.into_iter().enumerate() {
            self.line((i == 0).then_some(label), line);
        }
    }

    fn image(&mut self, exchange: usize) {
        let height = IMAGE_SIZE + 2.0 * IMAGE_PADDING;
        self.ensure_space(height);
        self.current.items.push(Item::Image {
            x: (PAGE_WIDTH - IMAGE_SIZE) / 2.0,
            y: self.y - IMAGE_PADDING - IMAGE_SIZE,
            size: IMAGE_SIZE,
            exchange,
        });
        self.y -= height;
    }

    fn blank_line(&mut self) {
        self.y -= LEADING;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
