use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use aiwire_core::{ArticleRecord, Error, GenerativeModel, Region, Result};
use async_trait::async_trait;

/// A model that replays a fixed script of answers, then repeats `fallback`.
#[derive(Debug)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(answer: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(answer) => answer,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| Error::Inference("script exhausted".to_string())),
        }
    }
}

pub fn article(n: usize) -> ArticleRecord {
    ArticleRecord::new(
        format!("Article {}", n),
        format!("https://news.example/{}", n),
        "Test Source",
        Region::Japan,
        format!("Summary of article {}.", n),
    )
}

pub fn full_answer() -> String {
    r#"```json
{
  "affirmative": "Promising.",
  "critical": "Risky.",
  "market": "Crowded.",
  "editor_summary": "Watch it.",
  "knowledge": "LLMs predict tokens."
}
```"#
        .to_string()
}
