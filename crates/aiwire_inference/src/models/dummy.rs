use aiwire_core::{GenerativeModel, Result};
use serde_json::json;

/// Offline backend that answers every prompt with a canned, fenced JSON
/// analysis built from the prompt's title line. Useful for dry runs.
#[derive(Debug, Default)]
pub struct DummyModel;

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn title_of(prompt: &str) -> &str {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Title: "))
        .map(str::trim)
        .unwrap_or("this story")
}

#[async_trait::async_trait]
impl GenerativeModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let title = title_of(prompt);
        let answer = json!({
            "affirmative": format!("{} signals steady progress for the industry.", title),
            "critical": format!("{} raises open questions about cost and oversight.", title),
            "market": format!("{} may shift the competitive balance among incumbents.", title),
            "editor_summary": format!("Worth watching: {}.", title),
            "knowledge": "Large language models are neural networks trained on large text corpora.",
        });
        Ok(format!("```json\n{:#}\n```", answer))
    }
}
