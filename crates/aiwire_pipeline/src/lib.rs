pub mod handoff;
pub mod logging;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test_utils;

pub use handoff::{dedupe_by_link, load_articles, mock_report, write_report};
pub use logging::{init_logging, Logger};
pub use orchestrator::{Orchestrator, RunReport, RunState};

pub mod prelude {
    pub use super::orchestrator::{Orchestrator, RunReport, RunState};
    pub use aiwire_core::{AnalyzedArticle, ArticleRecord, Error, Result, RunConfig};
}
