use std::borrow::Cow;

use crate::extraction::BBox;
use crate::parsing::options::OptionSplit;

/// What a positioned item carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// A word as extracted, unescaped.
    Text(String),
    /// Inline image markup, e.g. a rasterized drawing as `<img>`.
    Image(String),
}

/// A word or image placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedItem {
    pub bbox: BBox,
    pub kind: ItemKind,
}

impl PositionedItem {
    pub fn text(bbox: BBox, text: impl Into<String>) -> Self {
        PositionedItem {
            bbox,
            kind: ItemKind::Text(text.into()),
        }
    }

    pub fn image(bbox: BBox, markup: impl Into<String>) -> Self {
        PositionedItem {
            bbox,
            kind: ItemKind::Image(markup.into()),
        }
    }

    /// Content as it appears in the markup channel.
    pub fn markup(&self) -> Cow<'_, str> {
        match &self.kind {
            ItemKind::Text(t) => escape_html(t),
            ItemKind::Image(m) => Cow::Borrowed(m),
        }
    }
}

/// Group items into visual lines, top to bottom, each sorted left to right.
///
/// An item joins the open line while its top lies less than `threshold`
/// away from the top of the line's first item.
pub fn group_lines(mut items: Vec<PositionedItem>, threshold: f32) -> Vec<Vec<PositionedItem>> {
    items.sort_by(|a, b| {
        a.bbox
            .y_min
            .total_cmp(&b.bbox.y_min)
            .then(a.bbox.x_min.total_cmp(&b.bbox.x_min))
    });

    let mut lines = Vec::new();
    let mut current: Vec<PositionedItem> = Vec::new();
    let mut line_top = 0.0_f32;

    for item in items {
        if !current.is_empty() && (item.bbox.y_min - line_top).abs() >= threshold {
            lines.push(close_line(std::mem::take(&mut current)));
        }
        if current.is_empty() {
            line_top = item.bbox.y_min;
        }
        current.push(item);
    }
    if !current.is_empty() {
        lines.push(close_line(current));
    }

    lines
}

fn close_line(mut line: Vec<PositionedItem>) -> Vec<PositionedItem> {
    line.sort_by(|a, b| a.bbox.x_min.total_cmp(&b.bbox.x_min));
    line
}

#[derive(Debug, Clone)]
struct Anchor {
    plain_start: usize,
    markup_start: usize,
    word: String,
}

/// One line of source content seen through two channels: plain text for
/// matching markers, markup for building output (keeps inline images).
#[derive(Debug, Clone)]
pub struct SourceLine {
    plain: String,
    markup: String,
    /// Word positions in both channels; `None` when the channels are equal.
    anchors: Option<Vec<Anchor>>,
}

impl SourceLine {
    /// A line whose plain and markup channels are the same text.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim().to_string();
        SourceLine {
            plain: text.clone(),
            markup: text,
            anchors: None,
        }
    }

    /// Build both channels from one grouped visual line.
    pub fn from_items(items: &[PositionedItem]) -> Self {
        let mut plain = String::new();
        let mut markup = String::new();
        let mut anchors = Vec::new();

        for item in items {
            let piece = item.markup();
            if piece.trim().is_empty() {
                continue;
            }
            if !markup.is_empty() {
                markup.push(' ');
            }

            if let ItemKind::Text(raw) = &item.kind {
                let word = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                if !plain.is_empty() {
                    plain.push(' ');
                }
                anchors.push(Anchor {
                    plain_start: plain.len(),
                    markup_start: markup.len(),
                    word: word.clone(),
                });
                plain.push_str(&word);
                markup.push_str(&escape_html(&word));
            } else {
                markup.push_str(piece.trim());
            }
        }

        SourceLine {
            plain,
            markup,
            anchors: Some(anchors),
        }
    }

    pub fn plain(&self) -> &str {
        &self.plain
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn is_blank(&self) -> bool {
        self.plain.trim().is_empty() && self.markup.trim().is_empty()
    }

    /// Markup offset corresponding to a byte offset in the plain channel.
    pub fn markup_offset(&self, plain_offset: usize) -> usize {
        let Some(anchors) = &self.anchors else {
            return plain_offset.min(self.markup.len());
        };
        if plain_offset >= self.plain.len() {
            return self.markup.len();
        }
        match anchors
            .iter()
            .rev()
            .find(|a| a.plain_start <= plain_offset)
        {
            Some(anchor) => {
                let local = (plain_offset - anchor.plain_start).min(anchor.word.len());
                let prefix = anchor.word.get(..local).unwrap_or(&anchor.word);
                anchor.markup_start + escape_html(prefix).len()
            }
            None => 0,
        }
    }

    /// Apply a split computed on the plain channel to the markup channel.
    ///
    /// With `lead_into_first`, markup before the first marker (e.g. an
    /// image left of "A.") is kept with the first option instead of the stem.
    pub fn project(&self, split: &OptionSplit, lead_into_first: bool) -> (String, Vec<String>) {
        let mut bounds: Vec<usize> = split
            .options
            .iter()
            .map(|r| self.markup_offset(r.start))
            .collect();
        if lead_into_first {
            if let Some(first) = bounds.first_mut() {
                *first = 0;
            }
        }

        let stem_end = bounds.first().copied().unwrap_or(self.markup.len());
        let stem = self.markup[..stem_end].trim().to_string();
        let options = bounds
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = bounds.get(i + 1).copied().unwrap_or(self.markup.len());
                self.markup[start..end].trim().to_string()
            })
            .collect();

        (stem, options)
    }
}

/// Escape text for inclusion in HTML markup.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
