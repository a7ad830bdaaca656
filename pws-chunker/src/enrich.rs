//! Document-level metadata enrichment.
//!
//! Enrichment has two tiers: a static lookup in the injected [`Curriculum`]
//! and dynamic extraction from the document text (keywords, taxonomy
//! mentions, prior-art bibliographic hints). It never fails; unknown
//! documents get a default record.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::curriculum::{Curriculum, CurriculumEntry, Taxonomy};
use crate::document::{DocType, Metadata};

const DEFAULT_DIFFICULTY: &str = "intermediate";
const DEFAULT_TOPIC_CLUSTER: &str = "General";
const AUTHOR_WINDOW: usize = 1000;
const YEAR_WINDOW: usize = 2000;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "can", "this", "that",
    "these", "those",
];

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z]{4,}\b").expect("unreachable error: failed to compile keyword pattern")
});

static BOOK_AUTHOR: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"\bby ([A-Z][A-Za-z. \t]+)")
            .expect("unreachable error: failed to compile author pattern"),
        Regex::new(r"Author:[ \t]*([A-Z][A-Za-z. \t]+)")
            .expect("unreachable error: failed to compile author pattern"),
    ]
});

static PUBLICATION_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:19|20)\d{2}\b").expect("unreachable error: failed to compile year pattern")
});

/// Enriched metadata shared by every chunk of one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    pub title: String,
    pub file_name: String,
    pub doc_type: DocType,
    pub difficulty: String,
    pub problem_types: Vec<String>,
    pub frameworks_mentioned: Vec<String>,
    pub tools_introduced: Vec<String>,
    pub prerequisites: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecture_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_lectures: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<String>,

    pub related_frameworks: Vec<String>,
    pub related_methods: Vec<String>,
    pub related_problem_types: Vec<String>,
    pub authors_mentioned: Vec<String>,
    pub topic_cluster: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<u32>,
}

impl DocumentMetadata {
    /// The record given to a document the curriculum does not know.
    pub fn default_for(file_name: &str, doc_type: DocType) -> Self {
        Self {
            title: file_name.to_string(),
            file_name: file_name.to_string(),
            doc_type,
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            problem_types: Vec::new(),
            frameworks_mentioned: Vec::new(),
            tools_introduced: Vec::new(),
            prerequisites: Vec::new(),
            learning_objectives: Vec::new(),
            keywords: Vec::new(),
            lecture_id: None,
            module: None,
            week: None,
            author: None,
            year: None,
            related_lectures: Vec::new(),
            cognitive_level: None,
            estimated_minutes: None,
            concepts: Vec::new(),
            related_frameworks: Vec::new(),
            related_methods: Vec::new(),
            related_problem_types: Vec::new(),
            authors_mentioned: Vec::new(),
            topic_cluster: DEFAULT_TOPIC_CLUSTER.to_string(),
            book_title: None,
            book_author: None,
            publication_year: None,
        }
    }

    fn apply_entry(&mut self, entry: &CurriculumEntry) {
        self.title = entry.title.clone();
        if let Some(difficulty) = &entry.difficulty {
            self.difficulty = difficulty.clone();
        }
        self.problem_types = entry.problem_types.clone();
        self.frameworks_mentioned = entry.frameworks_mentioned.clone();
        self.tools_introduced = entry.tools_introduced.clone();
        self.prerequisites = entry.prerequisites.clone();
        self.learning_objectives = entry.learning_objectives.clone();
        self.keywords = entry.keywords.clone();
        if entry.doc_type == Some(DocType::Lecture) {
            self.lecture_id = Some(entry.key.clone());
        }
        self.module = entry.module.clone();
        self.week = entry.week;
        self.author = entry.author.clone();
        self.year = entry.year;
        self.related_lectures = entry.related_lectures.clone();
        self.cognitive_level = entry.cognitive_level.clone();
        self.estimated_minutes = entry.estimated_minutes;
        self.concepts = entry.concepts.clone();
    }

    /// Convert into the chunk metadata map.
    pub fn to_metadata(&self) -> Metadata {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => Metadata::new(),
        }
    }
}

/// Attaches curriculum and content-derived metadata to documents.
#[derive(Debug, Clone)]
pub struct MetadataEnricher {
    curriculum: Arc<Curriculum>,
    max_keywords: usize,
}

impl MetadataEnricher {
    pub fn new(curriculum: Arc<Curriculum>, max_keywords: usize) -> Self {
        Self { curriculum, max_keywords }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Build the metadata record for one document.
    ///
    /// `doc_type` is the classifier's tag and is reported as is, even when the
    /// matching curriculum entry declares a different type.
    pub fn enrich(&self, file_name: &str, content: &str, doc_type: DocType) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::default_for(file_name, doc_type);
        if let Some(entry) = self.curriculum.lookup(file_name) {
            metadata.apply_entry(entry);
        }

        merge_keywords(&mut metadata.keywords, extract_keywords(content, self.max_keywords));
        apply_relations(&mut metadata, self.curriculum.taxonomy(), content);

        if doc_type == DocType::PriorArt {
            apply_book_details(&mut metadata, file_name, content);
        }
        metadata
    }
}

/// The `top_n` most frequent words of four or more letters, stop words
/// excluded. Ties keep first-occurrence order.
pub fn extract_keywords(content: &str, top_n: usize) -> Vec<String> {
    if top_n == 0 {
        return Vec::new();
    }

    let lowered = content.to_lowercase();
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for found in KEYWORD.find_iter(&lowered) {
        let word = found.as_str();
        if STOP_WORDS.contains(&word) {
            continue;
        }
        match positions.get(word) {
            Some(&at) => order[at].1 += 1,
            None => {
                positions.insert(word, order.len());
                order.push((word, 1));
            }
        }
    }

    // stable: equal counts stay in first-occurrence order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.into_iter().take(top_n).map(|(word, _)| word.to_string()).collect()
}

fn merge_keywords(keywords: &mut Vec<String>, extracted: Vec<String>) {
    let mut seen: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    for word in extracted {
        if seen.insert(word.clone()) {
            keywords.push(word);
        }
    }
}

fn mentions(terms: &[String], lowered: &str) -> Vec<String> {
    terms.iter().filter(|term| lowered.contains(&term.to_lowercase())).cloned().collect()
}

fn apply_relations(metadata: &mut DocumentMetadata, taxonomy: &Taxonomy, content: &str) {
    let lowered = content.to_lowercase();
    metadata.related_frameworks = mentions(&taxonomy.frameworks, &lowered);
    metadata.related_methods = mentions(&taxonomy.methods, &lowered);
    metadata.related_problem_types = mentions(&taxonomy.problem_types, &lowered);
    metadata.authors_mentioned = mentions(&taxonomy.authors, &lowered);
    metadata.topic_cluster = taxonomy
        .topic_clusters
        .iter()
        .find(|cluster| cluster.cues.iter().any(|cue| lowered.contains(&cue.to_lowercase())))
        .map_or_else(|| DEFAULT_TOPIC_CLUSTER.to_string(), |cluster| cluster.name.clone());
}

fn apply_book_details(metadata: &mut DocumentMetadata, file_name: &str, content: &str) {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    metadata.book_title = Some(title_case(&stem.replace(['_', '-'], " ")));

    let head = prefix(content, AUTHOR_WINDOW);
    metadata.book_author = BOOK_AUTHOR
        .iter()
        .find_map(|pattern| pattern.captures(head))
        .and_then(|caps| caps.get(1))
        .map(|author| author.as_str().trim().to_string())
        .filter(|author| !author.is_empty());

    metadata.publication_year = PUBLICATION_YEAR
        .find(prefix(content, YEAR_WINDOW))
        .and_then(|year| year.as_str().parse().ok());
}

/// At most `max_chars` characters from the start of `text`.
fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
