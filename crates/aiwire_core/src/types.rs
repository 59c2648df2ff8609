use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text used for any analysis section the model did not provide.
pub const MISSING_SECTION: &str = "(analysis unavailable)";

/// Coverage region of a news source.
///
/// Known regions round-trip through their display names. Any other tag is kept
/// verbatim in `Other`; an absent, null or empty tag becomes `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Region {
    NorthAmerica,
    Europe,
    China,
    Japan,
    GlobalSouth,
    Global,
    #[default]
    Unknown,
    Other(String),
}

impl Region {
    pub fn as_str(&self) -> &str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::China => "China",
            Region::Japan => "Japan",
            Region::GlobalSouth => "Global South",
            Region::Global => "Global",
            Region::Unknown => "Unknown",
            Region::Other(tag) => tag,
        }
    }
}

impl From<&str> for Region {
    fn from(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_lowercase().as_str() {
            "" | "unknown" => Region::Unknown,
            "north america" => Region::NorthAmerica,
            "europe" => Region::Europe,
            "china" => Region::China,
            "japan" => Region::Japan,
            "global south" => Region::GlobalSouth,
            "global" => Region::Global,
            _ => Region::Other(tag.to_string()),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(Region::from).unwrap_or_default())
    }
}

/// Editorial priority set by the selector. Tags other than `high` and
/// `normal` are kept verbatim in `Other` instead of failing the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Other(tag) => tag,
        }
    }
}

impl From<&str> for Priority {
    fn from(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "normal" => Priority::Normal,
            _ => Priority::Other(tag.to_string()),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(|tag| Priority::from(tag.as_str()))
    }
}

/// One news item as handed over by the collector. `link` is the identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    pub source: String,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl ArticleRecord {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
        region: Region,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source: source.into(),
            region,
            summary: summary.into(),
            priority: None,
        }
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Some(Priority::High)
    }

    /// Attach a finished analysis, consuming the record.
    pub fn with_analysis(self, analysis: AnalysisResult) -> AnalyzedArticle {
        AnalyzedArticle {
            article: self,
            analysis,
        }
    }
}

/// The perspectives every analysis is made of, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Affirmative,
    Critical,
    Market,
    EditorSummary,
    Knowledge,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Affirmative,
        Section::Critical,
        Section::Market,
        Section::EditorSummary,
        Section::Knowledge,
    ];

    /// JSON key used both in the model's answer and in the report.
    pub fn key(&self) -> &'static str {
        match self {
            Section::Affirmative => "affirmative",
            Section::Critical => "critical",
            Section::Market => "market",
            Section::EditorSummary => "editor_summary",
            Section::Knowledge => "knowledge",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Structured multi-perspective analysis of one article.
///
/// Every section is always populated; sections the model left out hold
/// [`MISSING_SECTION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub affirmative: String,
    pub critical: String,
    pub market: String,
    pub editor_summary: String,
    pub knowledge: String,
}

impl AnalysisResult {
    /// Build a result by resolving each section in turn.
    pub fn from_fn(mut resolve: impl FnMut(Section) -> String) -> Self {
        Self {
            affirmative: resolve(Section::Affirmative),
            critical: resolve(Section::Critical),
            market: resolve(Section::Market),
            editor_summary: resolve(Section::EditorSummary),
            knowledge: resolve(Section::Knowledge),
        }
    }

    pub fn get(&self, section: Section) -> &str {
        match section {
            Section::Affirmative => &self.affirmative,
            Section::Critical => &self.critical,
            Section::Market => &self.market,
            Section::EditorSummary => &self.editor_summary,
            Section::Knowledge => &self.knowledge,
        }
    }

    pub fn is_missing(&self, section: Section) -> bool {
        self.get(section) == MISSING_SECTION
    }

    pub fn missing_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.is_missing(*s))
            .collect()
    }
}

/// An article together with its analysis, serialized flat the way the
/// publisher reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    #[serde(flatten)]
    pub article: ArticleRecord,
    pub analysis: AnalysisResult,
}
