use std::fmt;

use async_trait::async_trait;

use crate::Result;

/// A text-in, text-out generative backend.
#[async_trait]
pub trait GenerativeModel: Send + Sync + fmt::Debug {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Submit one prompt and return the model's raw answer text.
    ///
    /// Transport failures, non-success statuses and empty completions are
    /// returned as errors. Implementations must not retry on their own.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
