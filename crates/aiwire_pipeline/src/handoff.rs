//! File hand-off with the collector upstream and the publisher downstream.

use std::collections::HashSet;
use std::path::Path;

use aiwire_core::{AnalysisResult, AnalyzedArticle, ArticleRecord, Region, Result};
use tracing::{info, warn};

pub const DEFAULT_INPUT: &str = "collected_news.json";
pub const DEFAULT_OUTPUT: &str = "analysis_report.json";

/// Drop records without the `link` or `source` the publisher keys on.
pub fn drop_incomplete(articles: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    articles
        .into_iter()
        .filter(|a| {
            let complete = !a.link.trim().is_empty() && !a.source.trim().is_empty();
            if !complete {
                warn!("⏭️ Dropping '{}': missing link or source", a.title);
            }
            complete
        })
        .collect()
}

/// Keep the first record for every link, preserving order.
pub fn dedupe_by_link(articles: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let before = articles.len();
    let mut seen = HashSet::new();
    let unique: Vec<_> = articles
        .into_iter()
        .filter(|a| seen.insert(a.link.clone()))
        .collect();
    if unique.len() < before {
        warn!("🧹 Dropped {} duplicate articles", before - unique.len());
    }
    unique
}

/// Read the collector's JSON array of articles.
pub async fn load_articles(path: &Path) -> Result<Vec<ArticleRecord>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let articles: Vec<ArticleRecord> = serde_json::from_str(&raw)?;
    info!("📥 Loaded {} articles from {}", articles.len(), path.display());
    Ok(dedupe_by_link(drop_incomplete(articles)))
}

/// Write analyzed articles as pretty JSON for the publisher.
pub async fn write_report(path: &Path, articles: &[AnalyzedArticle]) -> Result<()> {
    let mut json = serde_json::to_string_pretty(articles)?;
    json.push('\n');
    tokio::fs::write(path, json).await?;
    info!("💾 Wrote {} analyzed articles to {}", articles.len(), path.display());
    Ok(())
}

/// A one-article report with fixed text, for exercising the publisher
/// without any model calls.
pub fn mock_report() -> Vec<AnalyzedArticle> {
    let analysis = AnalysisResult {
        affirmative: "This is an affirmative test analysis. The latest AI technology looks very promising.".to_string(),
        critical: "This is a critical test analysis. Compute consumption remains a challenge.".to_string(),
        market: "Compared with GPT-4, this model performs better on specific tasks.".to_string(),
        editor_summary: "Overall, this technology is likely to have a large impact on the industry.".to_string(),
        knowledge: "An LLM is a large language model.".to_string(),
    };
    let article = ArticleRecord::new(
        "Local test article 1",
        "https://example.com/test1",
        "Test Source",
        Region::Japan,
        "This is the summary of test article 1.",
    );
    vec![article.with_analysis(analysis)]
}
