//! The known curriculum: static metadata keyed by document identifier.
//!
//! A [`Curriculum`] is plain immutable data. The enricher receives it at
//! construction time, so substituting a different course only means loading
//! a different JSON file with [`Curriculum::from_path`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::DocType;
use crate::error::{ChunkError, Result};

static LECTURE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[Nn](\d+)").expect("unreachable error: failed to compile lecture key pattern")
});

/// Static metadata for one known document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurriculumEntry {
    /// Lookup key, e.g. `N02` for lectures.
    pub key: String,
    /// Case-insensitive file name fragments that select this entry.
    pub patterns: Vec<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub problem_types: Vec<String>,
    pub frameworks_mentioned: Vec<String>,
    pub tools_introduced: Vec<String>,
    pub related_lectures: Vec<String>,
    pub prerequisites: Vec<String>,
    pub learning_objectives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognitive_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,
    pub keywords: Vec<String>,
    pub concepts: Vec<String>,
}

/// A named group of cue words used to assign a topic cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicCluster {
    pub name: String,
    pub cues: Vec<String>,
}

/// Vocabulary searched for in document content to derive relationship tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Taxonomy {
    pub frameworks: Vec<String>,
    pub methods: Vec<String>,
    pub problem_types: Vec<String>,
    pub authors: Vec<String>,
    /// Checked in order; the first cluster with a matching cue wins.
    pub topic_clusters: Vec<TopicCluster>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            frameworks: strings(&[
                "Three Box Solution",
                "Scenario Analysis",
                "TRIZ",
                "Jobs-to-be-Done",
                "Mom Test",
                "Trending to Absurd",
                "Beautiful Questions",
                "Red Teaming",
                "Nested Hierarchies",
                "Extensive Search",
                "Intensive Search",
                "Lateral Thinking",
                "Creative Destruction",
                "Disruptive Innovation",
                "Minto Pyramid",
                "Portfolio Management",
                "Blue Ocean Strategy",
                "Design Thinking",
                "Lean Startup",
                "Agile Innovation",
                "Open Innovation",
            ]),
            methods: strings(&[
                "Brainstorming",
                "Mind Mapping",
                "SCAMPER",
                "Six Thinking Hats",
                "Fishbone Diagram",
                "Five Whys",
                "Customer Journey Mapping",
                "Value Proposition Canvas",
                "Business Model Canvas",
                "Empathy Mapping",
                "Persona Development",
                "A/B Testing",
                "Rapid Prototyping",
            ]),
            problem_types: strings(&["un-defined", "ill-defined", "well-defined", "wicked"]),
            authors: strings(&[
                "Clayton Christensen",
                "Peter Drucker",
                "Eric Ries",
                "Steve Blank",
                "Geoffrey Moore",
                "Rita McGrath",
                "Vijay Govindarajan",
                "Kim & Mauborgne",
                "Tim Brown",
                "Alex Osterwalder",
            ]),
            topic_clusters: vec![
                cluster("Discovery & Exploration", &["discovery", "exploration", "search"]),
                cluster("Validation & Testing", &["validation", "testing", "experiment"]),
                cluster("Execution & Scaling", &["execution", "implementation", "scale"]),
                cluster("Innovation & Disruption", &["disruption", "innovation", "breakthrough"]),
            ],
        }
    }
}

/// The static lookup table consulted by the enricher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Curriculum {
    entries: Vec<CurriculumEntry>,
    #[serde(default)]
    taxonomy: Taxonomy,
}

impl Curriculum {
    /// Create a curriculum, checking that keys are present and unique.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Curriculum`] on an empty or duplicate key.
    pub fn new(entries: Vec<CurriculumEntry>, taxonomy: Taxonomy) -> Result<Self> {
        let curriculum = Self { entries, taxonomy };
        curriculum.validate()?;
        Ok(curriculum)
    }

    /// A curriculum with no entries. Every document gets default metadata.
    pub fn empty() -> Self {
        Self { entries: Vec::new(), taxonomy: Taxonomy::default() }
    }

    /// Parse a curriculum from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Json`] for malformed JSON and
    /// [`ChunkError::Curriculum`] for empty or duplicate keys.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let curriculum: Self = serde_json::from_str(json)?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    /// Read and parse a curriculum JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.key.trim().is_empty() {
                return Err(ChunkError::Curriculum(format!(
                    "entry '{}' has an empty key",
                    entry.title
                )));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(ChunkError::Curriculum(format!("duplicate key '{}'", entry.key)));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[CurriculumEntry] {
        &self.entries
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Find an entry by its exact key.
    pub fn get(&self, key: &str) -> Option<&CurriculumEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Normalised lecture key (`N%02d`) at the start of a file name, if any.
    pub fn lecture_key(file_name: &str) -> Option<String> {
        let caps = LECTURE_KEY.captures(file_name.trim())?;
        let number: u32 = caps.get(1)?.as_str().parse().ok()?;
        Some(format!("N{number:02}"))
    }

    /// Find the entry describing `file_name`.
    ///
    /// A lecture key at the start of the name is matched first; otherwise the
    /// first entry with a pattern contained in the name wins.
    pub fn lookup(&self, file_name: &str) -> Option<&CurriculumEntry> {
        if let Some(entry) = Self::lecture_key(file_name).and_then(|key| self.get(&key)) {
            return Some(entry);
        }

        let lowered = file_name.to_lowercase();
        self.entries.iter().find(|entry| {
            entry
                .patterns
                .iter()
                .any(|pattern| !pattern.is_empty() && lowered.contains(&pattern.to_lowercase()))
        })
    }

    /// The curriculum the navigator was built for: lectures N01–N10, the two
    /// course textbooks and the canonical frameworks.
    pub fn builtin() -> Self {
        let mut entries = builtin_lectures();
        entries.extend(builtin_textbooks());
        entries.extend(builtin_frameworks());
        Self { entries, taxonomy: Taxonomy::default() }
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

fn cluster(name: &str, cues: &[&str]) -> TopicCluster {
    TopicCluster { name: name.to_string(), cues: strings(cues) }
}

#[allow(clippy::too_many_arguments)]
fn lecture(
    key: &str,
    title: &str,
    module: &str,
    difficulty: &str,
    cognitive_level: &str,
    estimated_minutes: u32,
    problem_types: &[&str],
    frameworks: &[&str],
    tools: &[&str],
    related: &[&str],
    prerequisites: &[&str],
    objectives: &[&str],
    keywords: &[&str],
    concepts: &[&str],
) -> CurriculumEntry {
    let week = key.trim_start_matches('N').parse().ok();
    CurriculumEntry {
        key: key.to_string(),
        title: title.to_string(),
        doc_type: Some(DocType::Lecture),
        module: Some(module.to_string()),
        week,
        difficulty: Some(difficulty.to_string()),
        problem_types: strings(problem_types),
        frameworks_mentioned: strings(frameworks),
        tools_introduced: strings(tools),
        related_lectures: strings(related),
        prerequisites: strings(prerequisites),
        learning_objectives: strings(objectives),
        cognitive_level: Some(cognitive_level.to_string()),
        estimated_minutes: Some(estimated_minutes),
        keywords: strings(keywords),
        concepts: strings(concepts),
        ..Default::default()
    }
}

fn builtin_lectures() -> Vec<CurriculumEntry> {
    vec![
        lecture(
            "N01",
            "Framework for Innovation",
            "introduction",
            "foundational",
            "understanding",
            45,
            &["all"],
            &["creative_destruction", "innovation_types", "entrepreneurship", "schumpeter_theory"],
            &[],
            &["N02", "N03", "N04"],
            &[],
            &[
                "Understand creative destruction",
                "Define innovation vs invention",
                "Identify entrepreneurial opportunities",
                "Analyze disruption patterns",
            ],
            &["innovation", "entrepreneurship", "creative destruction", "schumpeter", "capitalism", "disruption"],
            &["Creative Destruction", "Innovation", "Invention", "Entrepreneurship", "Economic Change"],
        ),
        lecture(
            "N02",
            "Un-defined Problems",
            "problem_types",
            "foundational",
            "applying",
            60,
            &["un-defined"],
            &["strategic_foresight", "scenario_analysis", "futures_studies"],
            &["trending_to_absurd", "scenario_analysis", "nested_hierarchies", "red_teaming", "beautiful_questions"],
            &["N01", "N03", "N04"],
            &["N01"],
            &[
                "Identify un-defined problems",
                "Apply scenario analysis methodology",
                "Use trending to absurd technique",
                "Develop nested hierarchies",
                "Practice red teaming",
            ],
            &["un-defined", "scenario analysis", "future", "uncertainty", "weak signals", "trends", "foresight"],
            &[
                "Un-defined Problems",
                "Scenario Analysis",
                "Trending to Absurd",
                "Red Teaming",
                "Nested Hierarchies",
                "Strategic Foresight",
            ],
        ),
        lecture(
            "N03",
            "Ill-defined Problems",
            "problem_types",
            "intermediate",
            "analyzing",
            60,
            &["ill-defined"],
            &["diffusion_theory", "jobs_to_be_done", "innovation_diffusion", "rogers_adoption_curve"],
            &["extensive_searching", "intensive_searching", "trend_analysis", "needs_finding"],
            &["N02", "N04", "N05", "N07"],
            &["N01", "N02"],
            &[
                "Distinguish ill-defined problems",
                "Apply extensive and intensive searching",
                "Identify market opportunities",
                "Use diffusion theory for analysis",
                "Apply jobs-to-be-done framework",
            ],
            &["ill-defined", "searching", "trends", "opportunities", "needs", "diffusion", "adoption", "market"],
            &[
                "Ill-defined Problems",
                "Extensive Searching",
                "Intensive Searching",
                "Diffusion Theory",
                "Jobs-to-be-Done",
                "Innovation Adoption",
            ],
        ),
        lecture(
            "N04",
            "Wicked Problems",
            "problem_types",
            "advanced",
            "analyzing",
            60,
            &["wicked"],
            &["wicked_problem_theory", "design_thinking", "systems_thinking"],
            &[],
            &["N02", "N03", "N05"],
            &["N01", "N02"],
            &[
                "Define wicked problems",
                "Understand problem complexity",
                "Apply wicked problem frameworks",
                "Recognize wicked problem characteristics",
            ],
            &["wicked problems", "complexity", "rittel", "webber", "social problems", "unsolvable", "systems"],
            &["Wicked Problems", "Problem Complexity", "Rittel and Webber", "Social Systems", "Problem Formulation"],
        ),
        lecture(
            "N05",
            "Innovation Domains",
            "application",
            "intermediate",
            "applying",
            60,
            &["all"],
            &["domain_analysis", "sector_analysis"],
            &[],
            &["N01", "N02", "N03", "N06"],
            &["N01", "N02", "N03"],
            &[
                "Apply frameworks to specific domains",
                "Analyze industry-specific challenges",
                "Transfer methodologies across domains",
                "Understand sector dynamics",
            ],
            &["domains", "industries", "application", "sectors", "verticals", "markets"],
            &["Innovation Domains", "Sector Analysis", "Domain Transfer", "Industry Dynamics"],
        ),
        lecture(
            "N06",
            "Portfolio Management",
            "strategy",
            "advanced",
            "evaluating",
            60,
            &["all"],
            &["portfolio_approach", "three_box_solution", "innovation_portfolio", "ambidextrous_organization"],
            &["portfolio_mapping", "resource_allocation"],
            &["N05", "N07"],
            &["N01", "N02", "N03"],
            &[
                "Build innovation portfolios",
                "Balance risk and opportunity",
                "Apply three box solution",
                "Manage organizational ambidexterity",
            ],
            &["portfolio", "strategy", "allocation", "balance", "three box", "govindarajan", "trimble"],
            &[
                "Portfolio Management",
                "Three Box Solution",
                "Resource Allocation",
                "Strategic Balance",
                "Ambidextrous Organization",
            ],
        ),
        lecture(
            "N07",
            "Well-defined Problems",
            "problem_types",
            "intermediate",
            "applying",
            60,
            &["well-defined"],
            &["lean_startup", "running_lean", "customer_development"],
            &["mvp", "validation_board", "pirate_metrics", "mom_test"],
            &["N03", "N06", "N08"],
            &["N01", "N02", "N03"],
            &[
                "Identify well-defined problems",
                "Apply lean methodologies",
                "Validate solutions quickly",
                "Build MVPs effectively",
                "Use mom test for validation",
            ],
            &["well-defined", "lean", "validation", "mvp", "execution", "customer", "testing"],
            &["Well-defined Problems", "Lean Startup", "MVP", "Customer Validation", "Mom Test", "Pirate Metrics"],
        ),
        lecture(
            "N08",
            "Prior Art & Research",
            "research",
            "intermediate",
            "analyzing",
            45,
            &["all"],
            &["literature_review", "systematic_review"],
            &["patent_search", "academic_databases", "citation_analysis"],
            &["N07", "N09"],
            &["N01"],
            &[
                "Conduct prior art searches",
                "Review academic literature",
                "Identify existing solutions",
                "Analyze patent landscapes",
            ],
            &["prior art", "research", "patents", "literature", "existing solutions", "search", "review"],
            &["Prior Art", "Literature Review", "Patent Search", "Existing Solutions", "Research Methods"],
        ),
        lecture(
            "N09",
            "Term Report Guidelines",
            "assessment",
            "intermediate",
            "creating",
            30,
            &["all"],
            &[],
            &[],
            &["N01", "N08"],
            &["N01", "N02", "N03", "N07"],
            &[
                "Structure innovation reports",
                "Document methodology",
                "Present findings effectively",
                "Follow academic conventions",
            ],
            &["report", "documentation", "assignment", "deliverable", "writing", "presentation"],
            &["Report Structure", "Documentation", "Methodology", "Academic Writing"],
        ),
        lecture(
            "N10",
            "January Term Project",
            "capstone",
            "advanced",
            "creating",
            45,
            &["all"],
            &[],
            &[],
            &["N09"],
            &["N01", "N02", "N03", "N06", "N07"],
            &[
                "Apply complete PWS methodology",
                "Execute capstone project",
                "Demonstrate mastery",
                "Integrate all frameworks",
            ],
            &["capstone", "project", "integration", "application", "synthesis"],
            &["Capstone Project", "Methodology Integration", "Problem Solving", "Application"],
        ),
    ]
}

fn builtin_textbooks() -> Vec<CurriculumEntry> {
    vec![
        CurriculumEntry {
            key: "pws_innovation_book".to_string(),
            patterns: strings(&["pws_innovation_book", "innovation book"]),
            title: "PWS Innovation Book".to_string(),
            doc_type: Some(DocType::Textbook),
            difficulty: Some("intermediate".to_string()),
            author: Some("Lawrence Aronhime".to_string()),
            problem_types: strings(&["all"]),
            frameworks_mentioned: strings(&["problem_theory", "pws_methodology", "innovation_frameworks"]),
            keywords: strings(&["innovation", "problems worth solving", "methodology", "frameworks", "textbook"]),
            ..Default::default()
        },
        CurriculumEntry {
            key: "extended_research".to_string(),
            patterns: strings(&["extended research", "extended_research"]),
            title: "Extended Research Foundation".to_string(),
            doc_type: Some(DocType::Textbook),
            difficulty: Some("advanced".to_string()),
            problem_types: strings(&["all"]),
            frameworks_mentioned: strings(&[
                "creative_destruction",
                "innovators_dilemma",
                "diffusion_theory",
                "behavioral_economics",
            ]),
            keywords: strings(&["research", "theory", "frameworks", "foundations", "academic", "literature"]),
            ..Default::default()
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn framework(
    key: &str,
    patterns: &[&str],
    title: &str,
    author: &str,
    year: u32,
    difficulty: &str,
    problem_types: &[&str],
    keywords: &[&str],
) -> CurriculumEntry {
    CurriculumEntry {
        key: key.to_string(),
        patterns: strings(patterns),
        title: title.to_string(),
        doc_type: Some(DocType::Framework),
        author: Some(author.to_string()),
        year: Some(year),
        difficulty: Some(difficulty.to_string()),
        problem_types: strings(problem_types),
        keywords: strings(keywords),
        ..Default::default()
    }
}

fn builtin_frameworks() -> Vec<CurriculumEntry> {
    vec![
        framework(
            "creative_destruction",
            &["creative_destruction", "creative destruction"],
            "Creative Destruction",
            "Joseph Schumpeter",
            1942,
            "intermediate",
            &["un-defined", "ill-defined"],
            &["schumpeter", "capitalism", "economic change", "innovation", "disruption", "entrepreneurship"],
        ),
        framework(
            "innovators_dilemma",
            &["innovators_dilemma", "innovator's dilemma", "innovators dilemma"],
            "The Innovator's Dilemma",
            "Clayton Christensen",
            1997,
            "intermediate",
            &["ill-defined"],
            &["christensen", "disruptive innovation", "sustaining innovation", "business", "incumbents"],
        ),
        framework(
            "three_box_solution",
            &["three_box_solution", "three box"],
            "Three Box Solution",
            "Vijay Govindarajan",
            2016,
            "advanced",
            &["all"],
            &["govindarajan", "portfolio", "box1", "box2", "box3", "innovation", "execution"],
        ),
        framework(
            "jobs_to_be_done",
            &["jobs_to_be_done", "jobs-to-be-done", "jtbd"],
            "Jobs-to-be-Done",
            "Clayton Christensen",
            2016,
            "intermediate",
            &["ill-defined", "well-defined"],
            &["jtbd", "customer", "needs", "hiring", "jobs", "milkshake", "progress"],
        ),
    ]
}
