//! Word-budget packing of breakpoint units into overlapping chunks.
//!
//! The [`Splitter`] works on a flat sequence of words drawn from the units
//! produced by a [`SplitStrategy`]. Every chunk is a contiguous word range
//! `[start, end)`; the words before `new_start` are the overlap copied from
//! the previous chunk. Chunk text is rebuilt from the original unit slices,
//! so line breaks inside a unit survive and units are joined by a blank line.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use crate::breakpoints::{SplitStrategy, Unit, UnitLabel};
use crate::config::ChunkerConfig;
use crate::document::{ChunkType, Metadata};

/// Trailing characters ignored when looking for sentence punctuation.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '\u{201D}', '\u{2019}', '*', '_'];

/// A chunk's text and shape before identifiers and metadata are attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Piece {
    pub content: String,
    pub word_count: usize,
    /// Leading words repeated from the previous piece.
    pub overlap_words: usize,
    pub chunk_type: ChunkType,
    /// Chunk-local metadata such as `section_title` or `week`.
    pub local: Metadata,
}

#[derive(Debug, Clone, Copy)]
struct Word {
    unit: usize,
    start: usize,
    end: usize,
    paragraph_end: bool,
    sentence_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    new_start: usize,
    end: usize,
}

/// Splits document text into [`Piece`]s obeying the size and overlap contract.
#[derive(Debug, Clone)]
pub(crate) struct Splitter {
    target: usize,
    overlap: usize,
    min: usize,
    max: usize,
    /// Longest overlap taken when the final sentence exceeds `overlap`.
    reach: usize,
}

impl Splitter {
    /// Create a splitter from a validated configuration.
    pub fn new(config: &ChunkerConfig) -> Self {
        Self {
            target: config.target_words,
            overlap: config.overlap_words,
            min: config.min_words,
            max: config.max_words(),
            reach: config
                .min_words
                .min(config.max_words() - config.min_words)
                .max(config.overlap_words),
        }
    }

    /// Split `text` with `strategy`, falling back to paragraphs when the
    /// strategy finds no breakpoints.
    pub fn split(&self, text: &str, strategy: SplitStrategy) -> Vec<Piece> {
        let (units, chunk_type) = match strategy.units(text) {
            Some(units) => (units, strategy.chunk_type()),
            None => {
                debug!(?strategy, "no breakpoints found, falling back to paragraphs");
                let units = SplitStrategy::Paragraph.units(text).unwrap_or_default();
                (units, ChunkType::Paragraph)
            }
        };

        let words = index_words(&units);
        let unit_ends = unit_boundaries(&words, units.len());
        self.pack(&words, &unit_ends)
            .into_iter()
            .map(|span| Piece {
                content: render(&units, &words, span.start, span.end),
                word_count: span.end - span.start,
                overlap_words: span.new_start - span.start,
                chunk_type,
                local: local_metadata(&units, &words, span),
            })
            .collect()
    }

    fn pack(&self, words: &[Word], unit_ends: &[(usize, usize)]) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        let mut buf_start = 0;
        let mut new_start = 0;
        let mut cursor = 0;
        let mut needs_overlap = false;

        for &(unit_start, unit_end) in unit_ends {
            let mut s = unit_start;
            while s < unit_end {
                let w = unit_end - s;

                if needs_overlap {
                    if let Some(prev) = spans.last() {
                        buf_start = self.overlap_start(words, prev.start, prev.end);
                    }
                    new_start = s;
                    cursor = s;
                    needs_overlap = false;
                }

                let total = cursor - buf_start;
                let has_new = cursor > new_start;

                if has_new && total + w > self.target && total >= self.min {
                    spans.push(Span { start: buf_start, new_start, end: cursor });
                    needs_overlap = true;
                    continue;
                }

                if total + w <= self.max {
                    cursor = unit_end;
                    s = unit_end;
                    continue;
                }

                // The unit cannot fit: fill the buffer up to the hard maximum.
                let cut = self.fill_cut(words, s, s + (self.max - total), total);
                spans.push(Span { start: buf_start, new_start, end: cut });
                needs_overlap = true;
                s = cut;
            }
        }

        if cursor > new_start {
            spans.push(Span { start: buf_start, new_start, end: cursor });
        }
        spans
    }

    /// Pick where to cut a unit that overflows the buffer: the last paragraph
    /// break, else the last sentence break, in `(s, limit]` that still leaves
    /// the chunk at `min` words; else exactly at `limit`.
    fn fill_cut(&self, words: &[Word], s: usize, limit: usize, total: usize) -> usize {
        let lowest = (s + self.min.saturating_sub(total)).max(s + 1);
        if lowest > limit {
            return limit;
        }
        let last_break = |is_break: fn(&Word) -> bool| {
            (lowest..=limit).rev().find(|&q| words.get(q - 1).is_some_and(is_break))
        };
        last_break(|w| w.paragraph_end)
            .or_else(|| last_break(|w| w.sentence_end))
            .unwrap_or(limit)
    }

    /// Start of the overlap for the chunk after `[start, end)`.
    ///
    /// Whole sentences only: the longest suffix of at most `overlap` words
    /// that begins a sentence. When the last sentence alone is longer, the
    /// overlap reaches back to its start if that is within `reach` words.
    /// Text with no sentence start in reach gets no overlap.
    fn overlap_start(&self, words: &[Word], start: usize, end: usize) -> usize {
        if self.overlap == 0 {
            return end;
        }
        let starts_sentence =
            |p: usize| p == 0 || words.get(p - 1).is_some_and(|w| w.sentence_end);
        let window = |limit: usize| end.saturating_sub(limit).max(start)..end;

        window(self.overlap)
            .find(|&p| starts_sentence(p))
            .or_else(|| window(self.reach).rev().find(|&p| starts_sentence(p)))
            .unwrap_or(end)
    }
}

fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches(CLOSERS).ends_with(['.', '!', '?'])
}

/// Flatten units into one word sequence with byte offsets into each unit.
fn index_words(units: &[Unit<'_>]) -> Vec<Word> {
    let mut words = Vec::new();
    for (unit, Unit { text, .. }) in units.iter().enumerate() {
        let first = words.len();
        let mut start = None;
        let mut newlines = 0;

        for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            if c.is_whitespace() {
                if let Some(begin) = start.take() {
                    words.push(Word {
                        unit,
                        start: begin,
                        end: i,
                        paragraph_end: false,
                        sentence_end: ends_sentence(&text[begin..i]),
                    });
                    newlines = 0;
                }
                if c == '\n' {
                    newlines += 1;
                }
            } else {
                if start.is_none() && newlines >= 2 && words.len() > first {
                    if let Some(prev) = words.last_mut() {
                        prev.paragraph_end = true;
                        prev.sentence_end = true;
                    }
                }
                if start.is_none() {
                    start = Some(i);
                    newlines = 0;
                }
            }
        }

        if words.len() > first {
            if let Some(last) = words.last_mut() {
                last.paragraph_end = true;
                last.sentence_end = true;
            }
        }
    }
    words
}

/// `[start, end)` word ranges of each non-empty unit, in order.
fn unit_boundaries(words: &[Word], unit_count: usize) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = Vec::with_capacity(unit_count);
    for (i, word) in words.iter().enumerate() {
        match ranges.last_mut() {
            Some(range) if words[range.0].unit == word.unit => range.1 = i + 1,
            _ => ranges.push((i, i + 1)),
        }
    }
    ranges
}

fn render(units: &[Unit<'_>], words: &[Word], start: usize, end: usize) -> String {
    let mut out = String::new();
    let mut i = start;
    while i < end {
        let unit = words[i].unit;
        let mut j = i;
        while j + 1 < end && words[j + 1].unit == unit {
            j += 1;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&units[unit].text[words[i].start..words[j].end]);
        i = j + 1;
    }
    out
}

/// Chunk-local fields drawn from the units that contribute new words.
fn local_metadata(units: &[Unit<'_>], words: &[Word], span: Span) -> Metadata {
    let mut labels: Vec<&UnitLabel> = Vec::new();
    let mut last_unit = None;
    for word in &words[span.new_start..span.end] {
        if last_unit != Some(word.unit) {
            labels.push(&units[word.unit].label);
            last_unit = Some(word.unit);
        }
    }

    let mut local = Metadata::new();
    if let Some(title) = labels.iter().find_map(|label| label.section_title.as_ref()) {
        local.insert("section_title".to_string(), Value::from(title.as_str()));
    }

    let markers: Vec<_> = labels.iter().filter_map(|label| label.week.as_ref()).collect();
    if let Some(first) = markers.first() {
        local.insert("week".to_string(), Value::from(first.first));
        local.insert("week_title".to_string(), Value::from(first.title.as_str()));

        let weeks: BTreeSet<u32> =
            markers.iter().flat_map(|marker| marker.first..=marker.last).collect();
        local.insert("weeks".to_string(), Value::from(weeks.into_iter().collect::<Vec<_>>()));
    }
    local
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(target: usize, min: usize, overlap: usize) -> Splitter {
        let config = ChunkerConfig::builder()
            .target_words(target)
            .min_words(min)
            .overlap_words(overlap)
            .build()
            .unwrap();
        Splitter::new(&config)
    }

    /// `count` sentences of `len` words each, numbered so every word is unique.
    fn sentences(count: usize, len: usize, tag: &str) -> String {
        (0..count)
            .map(|s| {
                let words: Vec<String> = (0..len).map(|w| format!("{tag}{s}w{w}")).collect();
                format!("{}.", words.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn small_unit_is_one_chunk() {
        let pieces = splitter(20, 10, 4).split(&sentences(3, 5, "a"), SplitStrategy::Slide);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].word_count, 15);
        assert_eq!(pieces[0].overlap_words, 0);
        assert_eq!(pieces[0].chunk_type, ChunkType::Slide);
    }

    #[test]
    fn units_pack_until_target_then_overlap() {
        // Six slides of ten words; target 20, max 24, overlap up to 4.
        let text: Vec<String> = (0..6).map(|i| sentences(2, 5, &format!("s{i}"))).collect();
        let pieces = splitter(20, 10, 4).split(&text.join("\n\n"), SplitStrategy::Slide);

        assert_eq!(pieces[0].word_count, 20);
        assert_eq!(pieces[0].overlap_words, 0);
        for piece in &pieces {
            assert!(piece.word_count <= 24);
            assert_eq!(piece.content.split_whitespace().count(), piece.word_count);
        }
        for pair in pieces.windows(2) {
            let prev: Vec<&str> = pair[0].content.split_whitespace().collect();
            let next: Vec<&str> = pair[1].content.split_whitespace().collect();
            let ov = pair[1].overlap_words;
            // Five-word sentences exceed the budget of four, so the overlap
            // reaches back to the start of the last sentence.
            assert_eq!(ov, 5);
            assert_eq!(&next[..ov], &prev[prev.len() - ov..]);
            assert!(prev[prev.len() - ov - 1].ends_with('.'));
        }
    }

    #[test]
    fn overlap_starts_at_a_sentence() {
        // Sentences of three words: an overlap budget of four takes one sentence.
        let text = sentences(12, 3, "x");
        let pieces = splitter(20, 10, 4).split(&text, SplitStrategy::Paragraph);
        assert!(pieces.len() > 1);
        assert_eq!(pieces[1].overlap_words, 3);
        assert!(pieces[1].content.starts_with('x'));
        let first_word = pieces[1].content.split_whitespace().next().unwrap();
        assert!(first_word.ends_with("w0"));
    }

    #[test]
    fn oversized_unit_is_filled_to_the_maximum() {
        // One unbroken 60-word unit, sentences of five words.
        let pieces = splitter(20, 10, 4).split(&sentences(12, 5, "b"), SplitStrategy::Slide);
        let sizes: Vec<usize> = pieces.iter().map(|p| p.word_count).collect();
        assert!(sizes.iter().all(|&s| s <= 24));
        for piece in &pieces[..pieces.len() - 1] {
            assert!(piece.word_count >= 10);
        }
        let new_words: usize = pieces.iter().map(|p| p.word_count - p.overlap_words).sum();
        assert_eq!(new_words, 60);
    }

    #[test]
    fn unpunctuated_text_gets_no_partial_sentence_overlap() {
        let text: Vec<String> = (0..50).map(|i| format!("t{i}")).collect();
        let pieces = splitter(20, 10, 4).split(&text.join(" "), SplitStrategy::Paragraph);
        assert_eq!(pieces[0].word_count, 24);
        assert_eq!(pieces[1].overlap_words, 0);
        assert!(pieces[1].content.starts_with("t24 t25"));
    }

    #[test]
    fn long_transcript_overlap_never_starts_mid_sentence() {
        // One unbroken slide of 1500 words with a single late sentence end.
        let mut words: Vec<String> = (0..1500).map(|i| format!("t{i}")).collect();
        words[1099].push('.');
        let splitter = Splitter::new(&ChunkerConfig::default());
        let pieces = splitter.split(&words.join(" "), SplitStrategy::Slide);

        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].word_count, 1100);
        // The last sentence of the first chunk is 1100 words, beyond reach.
        assert_eq!(pieces[1].overlap_words, 0);
        assert!(pieces[1].content.starts_with("t1100 "));
    }

    #[test]
    fn long_final_sentence_is_carried_whole() {
        // 700 words then one 300-word sentence: too long for the 200-word
        // budget, so the whole sentence is repeated.
        let text = format!("{} {}\n\n{}", sentences(70, 10, "a"), sentences(1, 300, "b"), sentences(60, 10, "c"));
        let splitter = Splitter::new(&ChunkerConfig::default());
        let pieces = splitter.split(&text, SplitStrategy::Slide);

        assert_eq!(pieces[0].word_count, 1000);
        assert_eq!(pieces[1].overlap_words, 300);
        assert!(pieces[1].content.starts_with("b0w0 "));
    }

    #[test]
    fn full_size_unit_after_a_chunk_still_overlaps() {
        // A 1000-word slide followed by a 1200-word slide.
        let text = format!("{}\n\n{}", sentences(100, 10, "a"), sentences(120, 10, "b"));
        let splitter = Splitter::new(&ChunkerConfig::default());
        let pieces = splitter.split(&text, SplitStrategy::Slide);

        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].word_count, 1000);
        for pair in pieces.windows(2) {
            let prev: Vec<&str> = pair[0].content.split_whitespace().collect();
            let next: Vec<&str> = pair[1].content.split_whitespace().collect();
            let ov = pair[1].overlap_words;
            assert_eq!(ov, 200);
            assert_eq!(&next[..ov], &prev[prev.len() - ov..]);
            assert!(pair[1].word_count <= 1200);
        }
        assert_eq!(pieces[1].word_count, 1200);
        let new_words: usize = pieces.iter().map(|p| p.word_count - p.overlap_words).sum();
        assert_eq!(new_words, 2200);
    }

    #[test]
    fn short_interior_buffer_merges_forward() {
        // A 6-word slide followed by a 20-word slide: emitting the 6 words
        // alone would leave an interior chunk below the minimum.
        let text = format!("{}\n\n{}\n\n{}", sentences(1, 6, "a"), sentences(4, 5, "b"), sentences(4, 5, "c"));
        let pieces = splitter(20, 10, 4).split(&text, SplitStrategy::Slide);
        for piece in &pieces[..pieces.len() - 1] {
            assert!(piece.word_count >= 10, "interior chunk of {} words", piece.word_count);
        }
        assert!(pieces[0].content.starts_with("a0w0"));
    }

    #[test]
    fn section_titles_and_weeks_become_local_metadata() {
        let text = "Week 1: Intro\nRead the framework notes.\n\nWeek 2: Problems\nRead the problem notes.";
        let pieces = splitter(20, 10, 4).split(text, SplitStrategy::Week);
        assert_eq!(pieces.len(), 1);
        let local = &pieces[0].local;
        assert_eq!(local["week"], Value::from(1));
        assert_eq!(local["week_title"], Value::from("Week 1: Intro"));
        assert_eq!(local["weeks"], serde_json::json!([1, 2]));
        assert!(pieces[0].content.contains("\n\nWeek 2: Problems"));
    }

    #[test]
    fn week_ranges_expand_into_sorted_weeks() {
        let text = "Weeks 4-5: Domains\nRead chapter four.\n\nWeek 2: Review\nRead the summary.";
        let pieces = splitter(20, 10, 4).split(text, SplitStrategy::Week);
        assert_eq!(pieces[0].local["week"], Value::from(4));
        assert_eq!(pieces[0].local["weeks"], serde_json::json!([2, 4, 5]));
    }

    #[test]
    fn missing_markers_fall_back_to_paragraphs() {
        let pieces = splitter(20, 10, 4).split("No headings here at all.", SplitStrategy::Section);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].chunk_type, ChunkType::Paragraph);
        assert!(pieces[0].local.is_empty());
    }

    #[test]
    fn line_breaks_inside_a_unit_are_preserved() {
        let pieces = splitter(20, 10, 4).split("Title line\n- bullet one\n- bullet two", SplitStrategy::Slide);
        assert_eq!(pieces[0].content, "Title line\n- bullet one\n- bullet two");
    }

    #[test]
    fn sentence_detection_ignores_closing_quotes() {
        assert!(ends_sentence("done.\""));
        assert!(ends_sentence("really?)"));
        assert!(!ends_sentence("e.g"));
        assert!(!ends_sentence("word"));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(splitter(20, 10, 4).split("  \n\n ", SplitStrategy::Paragraph).is_empty());
    }
}
