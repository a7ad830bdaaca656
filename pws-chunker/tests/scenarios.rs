//! End-to-end chunking scenarios over realistic documents.

use std::sync::Arc;

use pws_chunker::{
    ChunkType, Chunker, ChunkingPipeline, Curriculum, DocType, MetadataEnricher, SourceDocument,
    classify,
};
use serde_json::{Value, json};

/// `count` sentences of `len` words, numbered so every word is unique.
fn prose(count: usize, len: usize, tag: &str) -> String {
    (0..count)
        .map(|s| {
            let words: Vec<String> = (0..len).map(|w| format!("{tag}{s}x{w}")).collect();
            format!("{}.", words.join(" "))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn pipeline() -> ChunkingPipeline {
    ChunkingPipeline::builder().build().unwrap()
}

#[test]
fn empty_document_produces_no_chunks() {
    assert!(pipeline().chunk(&SourceDocument::new("empty.txt", "   ")).is_empty());
}

#[test]
fn short_document_is_skipped() {
    let chunks = pipeline().chunk(&SourceDocument::new("N01_Framework.txt", "Too short to index."));
    assert!(chunks.is_empty());
}

#[test]
fn small_lecture_is_a_single_slide() {
    let text = prose(60, 10, "s");
    let chunks = pipeline().chunk(&SourceDocument::new("N01_Framework_for_Innovation.txt", text));

    assert_eq!(chunks.len(), 1);
    let chunk = &chunks[0];
    assert_eq!(chunk.word_count, 600);
    assert!(!chunk.has_overlap);
    assert_eq!(chunk.chunk_type, ChunkType::Slide);
    assert_eq!(chunk.doc_type, DocType::Lecture);
    assert_eq!(chunk.metadata["lecture_id"], json!("N01"));
    assert_eq!(chunk.metadata["title"], json!("Framework for Innovation"));
}

#[test]
fn oversized_section_splits_with_overlap() {
    let text = format!("Chapter 1 Foundations\n{}", prose(300, 10, "b"));
    let chunks = pipeline().chunk(&SourceDocument::new("PWS_INNOVATION_BOOK.txt", text));

    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        assert!(chunk.word_count <= 1200);
        assert_eq!(chunk.doc_type, DocType::Textbook);
        assert_eq!(chunk.chunk_type, ChunkType::Section);
        assert_eq!(chunk.metadata["section_title"], json!("Chapter 1 Foundations"));
        assert_eq!(chunk.metadata["author"], json!("Lawrence Aronhime"));
    }
    assert!(chunks[0].word_count >= 500);
    assert!(chunks[1].word_count >= 500);

    for pair in chunks.windows(2) {
        let prev: Vec<&str> = pair[0].content.split_whitespace().collect();
        let next: Vec<&str> = pair[1].content.split_whitespace().collect();
        let k = pair[1].overlap_word_count;
        assert!(pair[1].has_overlap);
        assert!(k > 0 && k <= 200);
        assert_eq!(&next[..k], &prev[prev.len() - k..]);
        // overlap starts on a sentence boundary
        assert!(prev[prev.len() - k - 1].ends_with('.'));
    }
}

#[test]
fn full_size_slide_after_a_full_chunk_keeps_its_overlap() {
    let text = format!("{}\n\n{}", prose(100, 10, "a"), prose(120, 10, "b"));
    let chunks = pipeline().chunk(&SourceDocument::new("N01_Framework.txt", text));

    assert_eq!(chunks.len(), 3);
    for pair in chunks.windows(2) {
        let prev: Vec<&str> = pair[0].content.split_whitespace().collect();
        let next: Vec<&str> = pair[1].content.split_whitespace().collect();
        let k = pair[1].overlap_word_count;
        assert!(pair[1].has_overlap);
        assert!(k > 0 && k <= 500);
        assert!(pair[1].word_count <= 1200);
        assert_eq!(&next[..k], &prev[prev.len() - k..]);
        assert!(prev[prev.len() - k - 1].ends_with('.'));
    }
}

#[test]
fn unpunctuated_transcript_is_not_overlapped_mid_sentence() {
    let words: Vec<String> = (0..1500).map(|i| format!("u{i}")).collect();
    let chunks = pipeline().chunk(&SourceDocument::new("N04_Transcript.txt", words.join(" ")));

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].word_count, 1200);
    assert!(!chunks[1].has_overlap);
    assert_eq!(chunks[1].overlap_word_count, 0);
    assert!(chunks[1].content.starts_with("u1200 "));
}

#[test]
fn unrecognized_file_gets_default_metadata() {
    assert_eq!(classify("xyz123.txt"), DocType::General);

    let enricher = MetadataEnricher::new(Arc::new(Curriculum::builtin()), 15);
    let metadata = enricher.enrich("xyz123.txt", "some text", DocType::General);
    assert_eq!(metadata.title, "xyz123.txt");
    assert!(metadata.frameworks_mentioned.is_empty());
    assert!(metadata.tools_introduced.is_empty());

    let chunks = pipeline().chunk(&SourceDocument::new("xyz123.txt", prose(20, 8, "g")));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_type, ChunkType::Paragraph);
    assert_eq!(chunks[0].metadata["title"], json!("xyz123.txt"));
    assert_eq!(chunks[0].metadata["frameworks_mentioned"], json!([]));
}

#[test]
fn syllabus_chunks_carry_week_numbers() {
    let text = format!(
        "Course overview. {}\n\nWeek 1: Framework for Innovation\n{}\n\nWeek 2: Un-defined Problems\n{}",
        prose(20, 10, "o"),
        prose(70, 10, "a"),
        prose(70, 10, "b"),
    );
    let chunks = pipeline().chunk(&SourceDocument::new("Course_Syllabus.md", text));

    assert!(chunks.len() >= 2);
    assert!(chunks.iter().all(|c| c.chunk_type == ChunkType::Week));
    let weeks: Vec<&Value> = chunks.iter().filter_map(|c| c.metadata.get("week")).collect();
    assert!(weeks.contains(&&json!(1)));
    assert!(weeks.contains(&&json!(2)));
}

#[test]
fn textbook_without_headings_falls_back_to_paragraphs() {
    let text = format!("{}\n\n{}", prose(30, 10, "p"), prose(30, 10, "q"));
    let chunks = pipeline().chunk(&SourceDocument::new("Extended Research.md", text));
    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| c.chunk_type == ChunkType::Paragraph));
    assert_eq!(chunks[0].doc_type, DocType::Textbook);
}

#[test]
fn substitute_curriculum_is_used() {
    let curriculum = Curriculum::from_json_str(
        r#"{"entries": [{"key": "N01", "title": "Design Sprints", "doc_type": "lecture", "week": 1}]}"#,
    )
    .unwrap();
    let pipeline = ChunkingPipeline::builder().curriculum(Arc::new(curriculum)).build().unwrap();
    let chunks = pipeline.chunk(&SourceDocument::new("N01_Sprints.txt", prose(20, 8, "d")));
    assert_eq!(chunks[0].metadata["title"], json!("Design Sprints"));
    assert_eq!(chunks[0].metadata["lecture_id"], json!("N01"));
}

#[test]
fn identical_content_has_identical_ids() {
    let text = prose(30, 10, "i");
    let a = pipeline().chunk(&SourceDocument::new("a.txt", text.clone()));
    let b = pipeline().chunk(&SourceDocument::new("b.txt", text));
    assert_eq!(a[0].id, b[0].id);
    assert_eq!(a[0].id.len(), 64);
}
