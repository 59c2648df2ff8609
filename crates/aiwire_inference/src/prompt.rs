//! Deterministic prompt construction for the per-article analysis call.

use aiwire_core::{ArticleRecord, Error, Result, Section};

pub const DEFAULT_SUMMARY_CHARS: usize = 600;
pub const DEFAULT_LANGUAGE: &str = "Japanese";

/// A ready-to-send prompt and the sections its answer must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    sections: &'static [Section],
}

impl Prompt {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &'static [Section] {
        self.sections
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    summary_chars: usize,
    language: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            summary_chars: DEFAULT_SUMMARY_CHARS,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

fn guidance(section: Section) -> &'static str {
    match section {
        Section::Affirmative => {
            "progress and positive implications for the industry (about 200-300 characters)"
        }
        Section::Critical => {
            "ethical concerns, technical limits and geopolitical risks (about 200-300 characters)"
        }
        Section::Market => {
            "competitive landscape and impact on market share of the companies involved (about 150-250 characters)"
        }
        Section::EditorSummary => "the editor's one-paragraph takeaway (about 100-150 characters)",
        Section::Knowledge => {
            "one background concept a reader needs to follow this story, explained plainly (about 100-200 characters)"
        }
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis.
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}…", text[..byte_idx].trim_end()),
        None => text.to_string(),
    }
}

impl PromptBuilder {
    pub fn new(summary_chars: usize, language: impl Into<String>) -> Self {
        Self {
            summary_chars,
            language: language.into(),
        }
    }

    /// Build the analysis prompt for one article.
    ///
    /// Fails with [`Error::InvalidArticle`] when the title or summary is blank.
    pub fn build(&self, article: &ArticleRecord) -> Result<Prompt> {
        let title = article.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArticle(format!(
                "article {} has no title",
                article.link
            )));
        }
        let summary = article.summary.trim();
        if summary.is_empty() {
            return Err(Error::InvalidArticle(format!(
                "article {} has no summary",
                article.link
            )));
        }

        let mut text = String::new();
        text.push_str(
            "You are the editor-in-chief of a daily briefing on the AI industry. \
             Analyze the following news article from several perspectives.\n\n",
        );
        text.push_str(&format!(
            "Title: {}\nSource: {}\nRegion: {}\nSummary: {}\n\n",
            title,
            article.source.trim(),
            article.region,
            truncate_chars(summary, self.summary_chars)
        ));
        text.push_str(&format!(
            "Write every value in {}. Respond ONLY with a JSON object containing exactly these keys:\n",
            self.language
        ));
        for section in Section::ALL {
            text.push_str(&format!("- \"{}\": {}\n", section.key(), guidance(section)));
        }
        text.push_str("Do not add any text before or after the JSON object.");

        Ok(Prompt {
            text,
            sections: &Section::ALL,
        })
    }
}
