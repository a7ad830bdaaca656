//! Natural breakpoints for each document type.
//!
//! A [`SplitStrategy`] turns a document's text into an ordered list of
//! [`Unit`]s: slides, sections, weeks or paragraphs. The splitter packs units
//! into chunks and only cuts inside a unit when it cannot fit in one chunk.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{ChunkType, DocType};

static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n").expect("unreachable error: failed to compile blank line pattern")
});

/// `Chapter 2`, `Section 3.1`, `Part IV`, markdown headers, and short
/// capitalised numbered headings such as `2.1 Problem Types`.
static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?i:chapter|section)[ \t]+\d+(?:\.\d+)*\b|(?i:part)[ \t]+(?:\d+|[IVXLC]+)\b|#{1,6}[ \t]+\S|\d+(?:\.\d+)*\.?[ \t]+[A-Z][^\n]{0,80}$)[^\n]*",
    )
    .expect("unreachable error: failed to compile section heading pattern")
});

/// `Week 3`, `WEEK 3: ...`, `Weeks 4-5`, at the start of a line.
static WEEK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*weeks?[ \t]+(\d+)(?:[ \t]*[-–][ \t]*(\d+))?\b[^\n]*")
        .expect("unreachable error: failed to compile week marker pattern")
});

/// Widest `Weeks a-b` range taken at face value; wider ranges keep only `a`.
const MAX_WEEK_SPAN: u32 = 52;

/// Local context carried by a unit into the chunks built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UnitLabel {
    pub section_title: Option<String>,
    pub week: Option<WeekMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WeekMarker {
    pub first: u32,
    pub last: u32,
    pub title: String,
}

/// A contiguous, trimmed slice of the document between two breakpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unit<'a> {
    pub text: &'a str,
    pub label: UnitLabel,
}

/// Which breakpoints a document is split on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitStrategy {
    /// Blank-line-delimited slides.
    Slide,
    /// Chapter and section headings.
    Section,
    /// Syllabus week markers.
    Week,
    /// Blank-line-delimited paragraphs.
    Paragraph,
}

impl SplitStrategy {
    /// Select the strategy for a document type.
    pub fn for_doc_type(doc_type: DocType) -> Self {
        match doc_type {
            DocType::Lecture => SplitStrategy::Slide,
            DocType::Textbook => SplitStrategy::Section,
            DocType::Syllabus => SplitStrategy::Week,
            _ => SplitStrategy::Paragraph,
        }
    }

    /// The tag carried by chunks produced with this strategy.
    pub fn chunk_type(self) -> ChunkType {
        match self {
            SplitStrategy::Slide => ChunkType::Slide,
            SplitStrategy::Section => ChunkType::Section,
            SplitStrategy::Week => ChunkType::Week,
            SplitStrategy::Paragraph => ChunkType::Paragraph,
        }
    }

    /// Split `text` into units.
    ///
    /// Returns `None` when the strategy relies on markers and the text has
    /// none; callers fall back to [`SplitStrategy::Paragraph`].
    pub(crate) fn units(self, text: &str) -> Option<Vec<Unit<'_>>> {
        match self {
            SplitStrategy::Slide | SplitStrategy::Paragraph => Some(blocks(text)),
            SplitStrategy::Section => sections(text),
            SplitStrategy::Week => weeks(text),
        }
    }
}

fn unlabelled(text: &str) -> Unit<'_> {
    Unit { text, label: UnitLabel::default() }
}

fn blocks(text: &str) -> Vec<Unit<'_>> {
    BLANK_LINES
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(unlabelled)
        .collect()
}

/// Cut `text` at each marker start. Text before the first marker becomes an
/// unlabelled unit.
fn cut_at<'a>(text: &'a str, starts: &[(usize, UnitLabel)]) -> Vec<Unit<'a>> {
    let mut units = Vec::with_capacity(starts.len() + 1);

    if let Some((first, _)) = starts.first() {
        let preamble = text[..*first].trim();
        if !preamble.is_empty() {
            units.push(unlabelled(preamble));
        }
    }

    for (i, (start, label)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(text.len(), |(next, _)| *next);
        let body = text[*start..end].trim();
        if !body.is_empty() {
            units.push(Unit { text: body, label: label.clone() });
        }
    }

    units
}

fn sections(text: &str) -> Option<Vec<Unit<'_>>> {
    let starts: Vec<(usize, UnitLabel)> = SECTION_HEADING
        .find_iter(text)
        .map(|heading| {
            let title = heading.as_str().trim().trim_start_matches('#').trim().to_string();
            (heading.start(), UnitLabel { section_title: Some(title), week: None })
        })
        .collect();

    if starts.is_empty() { None } else { Some(cut_at(text, &starts)) }
}

fn weeks(text: &str) -> Option<Vec<Unit<'_>>> {
    let starts: Vec<(usize, UnitLabel)> = WEEK_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let line = caps.get(0)?;
            let first = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let last = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|last| *last >= first && *last - first <= MAX_WEEK_SPAN)
                .unwrap_or(first);
            let marker = WeekMarker { first, last, title: line.as_str().trim().to_string() };
            Some((line.start(), UnitLabel { section_title: None, week: Some(marker) }))
        })
        .collect();

    if starts.is_empty() { None } else { Some(cut_at(text, &starts)) }
}
