use std::fmt;
use std::sync::Arc;

use aiwire_core::{AnalysisResult, GenerativeModel};
use thiserror::Error;
use tracing::debug;

use crate::extract;
use crate::prompt::Prompt;

/// Why a single analysis call produced no result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisFailure {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("could not decode model output: {0}")]
    Decode(String),

    #[error("unexpected model output shape: {0}")]
    Shape(String),
}

/// Classified result of one analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Success(AnalysisResult),
    Failure(AnalysisFailure),
}

impl AnalysisOutcome {
    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            AnalysisOutcome::Success(result) => Some(result),
            AnalysisOutcome::Failure(_) => None,
        }
    }
}

/// Runs one prompt through the backend and turns the answer into an outcome.
///
/// # Invariants
/// - exactly one backend call per `analyze`
/// - never returns an error and never panics on bad model output
pub struct AnalysisEngine {
    model: Arc<dyn GenerativeModel>,
}

impl fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("model", &self.model.name())
            .finish()
    }
}

impl AnalysisEngine {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn analyze(&self, prompt: &Prompt) -> AnalysisOutcome {
        let text = match self.model.generate(prompt.text()).await {
            Ok(text) => text,
            Err(e) => return AnalysisOutcome::Failure(AnalysisFailure::Backend(e.to_string())),
        };
        debug!("📨 {} answered with {} bytes", self.model.name(), text.len());

        match extract::decode_analysis(&text, prompt.sections()) {
            Ok(result) => AnalysisOutcome::Success(result),
            Err(failure) => AnalysisOutcome::Failure(failure),
        }
    }
}
