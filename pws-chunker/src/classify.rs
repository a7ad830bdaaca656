//! Document-type classification from file names and paths.
//!
//! Classification is a total, pure function: every name maps to exactly one
//! [`DocType`]. Rules are checked in a fixed priority order and the first
//! match wins; anything unmatched is [`DocType::General`].

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::DocType;

/// One letter followed by a short lecture number, e.g. `N02_UnDefined_Problems`.
static LECTURE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]\d{1,3}(?:[_\-. ]|$)")
        .expect("unreachable error: failed to compile lecture id pattern")
});

/// Substring rules, most specific first. Lecture identifiers are checked
/// before all of these.
const RULES: &[(DocType, &[&str])] = &[
    (DocType::Syllabus, &["syllabus"]),
    (DocType::PriorArt, &["prior-art", "prior_art", "prior art"]),
    (DocType::Textbook, &["innovation_book", "extended research", "textbook", "book"]),
    (DocType::Reference, &["beautiful question", "minto", "reference"]),
    (DocType::Example, &["case", "nato", "example"]),
    (DocType::Framework, &["framework", "theory"]),
    (DocType::Tool, &["tool", "method"]),
    (DocType::Lecture, &["lecture", ".pptx"]),
];

/// Directory names that mark a whole subtree as prior art.
const PRIOR_ART_DIRS: &[&str] = &["library", "prior-art", "prior_art"];

/// Classify a document by its file name.
pub fn classify(file_name: &str) -> DocType {
    if LECTURE_ID.is_match(file_name.trim()) {
        return DocType::Lecture;
    }

    let lowered = file_name.to_lowercase();
    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(doc_type, _)| *doc_type)
        .unwrap_or(DocType::General)
}

/// Classify a document by its full path.
///
/// The file name decides first. A name that classifies as
/// [`DocType::General`] is then checked against its directories, so that
/// documents filed under e.g. `prior-art/` or `frameworks/` inherit that type.
pub fn classify_path(path: &Path) -> DocType {
    let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    let by_name = classify(&name);
    if by_name != DocType::General {
        return by_name;
    }

    let Some(parent) = path.parent() else {
        return by_name;
    };
    let mut dirs: Vec<String> = parent
        .components()
        .map(|component| component.as_os_str().to_string_lossy().to_lowercase())
        .collect();
    // The innermost directory is the most specific.
    dirs.reverse();

    for dir in &dirs {
        if PRIOR_ART_DIRS.iter().any(|marker| dir.contains(marker)) {
            return DocType::PriorArt;
        }
        let by_dir = classify(dir);
        if by_dir != DocType::General {
            return by_dir;
        }
    }

    DocType::General
}
