pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod types;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use ledger::CostLedger;
pub use models::GenerativeModel;
pub use types::{
    AnalysisResult, AnalyzedArticle, ArticleRecord, Priority, Region, Section, MISSING_SECTION,
};

pub mod prelude {
    pub use super::{
        AnalysisResult, AnalyzedArticle, ArticleRecord, CostLedger, Error, GenerativeModel,
        Region, Result, RunConfig, Section,
    };
}
