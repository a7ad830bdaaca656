//! Property tests for the chunk size, overlap and coverage contract.

use pws_chunker::{Chunk, Chunker, ChunkerConfig, ChunkingPipeline, SourceDocument, count_words};
use proptest::prelude::*;

const TARGET: usize = 20;
const MIN: usize = 10;
const OVERLAP: usize = 4;
const MAX: usize = 24;

fn pipeline() -> ChunkingPipeline {
    let config = ChunkerConfig::builder()
        .target_words(TARGET)
        .min_words(MIN)
        .overlap_words(OVERLAP)
        .min_content_chars(1)
        .build()
        .unwrap();
    ChunkingPipeline::builder().config(config).build().unwrap()
}

/// Document shapes: paragraphs of sentences of 1..=10 words, so every
/// sentence fits within an overlap of `MIN` words.
fn arb_shape() -> impl Strategy<Value = Vec<Vec<usize>>> {
    proptest::collection::vec(proptest::collection::vec(1usize..11, 1..6), 1..12)
}

/// Render a shape into text where every word is unique.
fn render(shape: &[Vec<usize>]) -> String {
    let mut n = 0;
    shape
        .iter()
        .map(|paragraph| {
            paragraph
                .iter()
                .map(|&len| {
                    let words: Vec<String> = (0..len)
                        .map(|_| {
                            n += 1;
                            format!("w{n}")
                        })
                        .collect();
                    format!("{}.", words.join(" "))
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn document(shape: &[Vec<usize>], lecture: bool) -> SourceDocument {
    let name = if lecture { "N05_Innovation_Domains.txt" } else { "notes.txt" };
    SourceDocument::new(name, render(shape))
}

fn words(chunk: &Chunk) -> Vec<&str> {
    chunk.content.split_whitespace().collect()
}

/// **Property 1: Determinism**
/// *For any* document, chunking it twice SHALL yield identical chunks.
mod prop_determinism {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn chunking_twice_is_identical(shape in arb_shape(), lecture in any::<bool>()) {
            let pipeline = pipeline();
            let doc = document(&shape, lecture);
            prop_assert_eq!(pipeline.chunk(&doc), pipeline.chunk(&doc));
        }
    }
}

/// **Property 2: Coverage**
/// *For any* document, the chunks' words with each overlap prefix removed
/// SHALL reproduce the document's word sequence exactly.
mod prop_coverage {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn chunks_reconstruct_document(shape in arb_shape(), lecture in any::<bool>()) {
            let doc = document(&shape, lecture);
            let chunks = pipeline().chunk(&doc);

            let rebuilt: Vec<&str> = chunks
                .iter()
                .flat_map(|chunk| words(chunk).into_iter().skip(chunk.overlap_word_count))
                .collect();
            let original: Vec<&str> = doc.content.split_whitespace().collect();
            prop_assert_eq!(rebuilt, original);
        }
    }
}

/// **Property 3: Size bound**
/// *For any* document, every chunk SHALL hold at most `max` words and every
/// chunk but the last at least `min` words.
mod prop_size_bound {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn chunks_stay_within_bounds(shape in arb_shape(), lecture in any::<bool>()) {
            let chunks = pipeline().chunk(&document(&shape, lecture));
            prop_assert!(!chunks.is_empty());

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.word_count, count_words(&chunk.content));
                prop_assert!(chunk.word_count <= MAX, "chunk {} has {} words", i, chunk.word_count);
                if i + 1 < chunks.len() {
                    prop_assert!(chunk.word_count >= MIN, "chunk {} has {} words", i, chunk.word_count);
                }
            }
        }
    }
}

/// **Property 4: Overlap integrity**
/// *For any* document, each chunk after the first SHALL begin with whole
/// sentences copied from the end of its predecessor, at most `min` words.
mod prop_overlap_integrity {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn overlap_is_a_suffix_of_the_previous_chunk(shape in arb_shape(), lecture in any::<bool>()) {
            let chunks = pipeline().chunk(&document(&shape, lecture));
            prop_assert_eq!(chunks[0].overlap_word_count, 0);
            prop_assert!(!chunks[0].has_overlap);

            for pair in chunks.windows(2) {
                let (prev, next) = (words(&pair[0]), words(&pair[1]));
                let k = pair[1].overlap_word_count;
                prop_assert!(pair[1].has_overlap);
                prop_assert!(k >= 1 && k <= MIN, "overlap of {} words", k);
                prop_assert_eq!(&next[..k], &prev[prev.len() - k..]);
                prop_assert!(k == prev.len() || prev[prev.len() - k - 1].ends_with('.'));
                if prev.iter().rev().take(OVERLAP).skip(1).any(|w| w.ends_with('.')) {
                    prop_assert!(k <= OVERLAP);
                }
            }
        }
    }
}

/// **Property 5: Index consistency**
/// *For any* document, chunk indices SHALL run `0..total` without gaps and
/// every chunk SHALL carry the same total and a content-derived id.
mod prop_index_consistency {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn indices_are_dense(shape in arb_shape(), lecture in any::<bool>()) {
            let chunks = pipeline().chunk(&document(&shape, lecture));
            let total = chunks.len();
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.chunk_index, i);
                prop_assert_eq!(chunk.total_chunks, total);
                prop_assert_eq!(&chunk.id, &pws_chunker::content_id(&chunk.content));
            }
        }
    }
}
