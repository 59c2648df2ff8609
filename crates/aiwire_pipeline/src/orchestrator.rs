//! Sequential, budget-gated analysis of a batch of articles.
//!
//! # Run flow
//! ```text
//! for each article, in input order:
//!   1. budget gate closed?  -> BudgetStopped, return what we have
//!   2. build prompt         -> rejected articles are skipped without a call
//!   3. pace, then call the engine once
//!   4. success -> attach analysis, append, charge the flat estimate
//!      failure -> log and skip, nothing charged
//! input exhausted -> Done
//! ```

use aiwire_core::{AnalyzedArticle, ArticleRecord, CostLedger, Result, RunConfig};
use aiwire_inference::{AnalysisEngine, AnalysisOutcome, PromptBuilder};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::logging::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Articles queued, none attempted yet.
    Pending,
    /// An article is being analyzed.
    InProgress,
    /// Every queued article was attempted.
    Done,
    /// The ledger reached its ceiling; the rest of the queue was abandoned.
    BudgetStopped,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::BudgetStopped)
    }

    /// Move to `next` unless the run already ended. Returns whether the state
    /// changed.
    pub fn advance(&mut self, next: RunState) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        debug!("🔀 Run state {:?} -> {:?}", self, next);
        *self = next;
        true
    }
}

/// What one run produced. A short `articles` list is a normal outcome.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: RunState,
    /// Successfully analyzed articles, in input order.
    pub articles: Vec<AnalyzedArticle>,
    pub input_count: usize,
    /// Articles for which a backend call was made.
    pub attempted: usize,
    /// Calls that came back without a usable analysis.
    pub failed: usize,
    /// Articles refused before any call, such as a blank title or summary.
    pub rejected: usize,
    /// Articles never reached, because of the item cap or the budget.
    pub not_attempted: usize,
    pub spent_usd: f64,
    pub budget_usd: f64,
}

impl RunReport {
    fn start(input_count: usize, budget_usd: f64) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            state: RunState::Pending,
            articles: Vec::new(),
            input_count,
            attempted: 0,
            failed: 0,
            rejected: 0,
            not_attempted: 0,
            spent_usd: 0.0,
            budget_usd,
        }
    }

    fn finish(mut self, state: RunState, ledger: &CostLedger) -> Self {
        self.state.advance(state);
        self.spent_usd = ledger.spent_usd();
        self.finished_at = Utc::now();
        self
    }

    pub fn analyzed(&self) -> usize {
        self.articles.len()
    }
}

/// Drives the engine over a batch of articles under a fixed budget.
///
/// The ledger is created fresh for each call to [`Orchestrator::run`] and
/// dropped when it returns; nothing carries over between runs.
#[derive(Debug)]
pub struct Orchestrator {
    engine: AnalysisEngine,
    prompts: PromptBuilder,
    config: RunConfig,
}

impl Orchestrator {
    /// Fails only on invalid configuration.
    pub fn new(engine: AnalysisEngine, prompts: PromptBuilder, config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            prompts,
            config,
        })
    }

    /// Analyze `articles` one at a time. Never fails; per-article problems are
    /// logged and the article is left out of the report.
    pub async fn run(&self, articles: Vec<ArticleRecord>) -> RunReport {
        let mut ledger = CostLedger::new(self.config.budget_usd);
        let mut report = RunReport::start(articles.len(), ledger.ceiling_usd());

        if articles.is_empty() {
            info!("📭 No articles were collected, so there is no analysis today");
            return report.finish(RunState::Done, &ledger);
        }

        let mut queue = articles;
        if queue.len() > self.config.max_articles {
            info!(
                "✂️ Limiting run to {} of {} articles",
                self.config.max_articles,
                queue.len()
            );
            report.not_attempted += queue.len() - self.config.max_articles;
            queue.truncate(self.config.max_articles);
        }

        let total = queue.len();
        info!(
            "🚀 Analyzing {} articles with {} (budget ${:.4}, ${:.4} per call)",
            total,
            self.engine.model_name(),
            ledger.ceiling_usd(),
            self.config.cost_per_call_usd
        );

        report.state.advance(RunState::InProgress);
        let mut stopped = false;
        let mut called_before = false;

        for (index, article) in queue.into_iter().enumerate() {
            let log = Logger::new().with_prefix(format!("[{}/{}]", index + 1, total));

            if !ledger.remaining_budget() {
                let remaining = total - index;
                log.warn(&format!(
                    "💸 Budget reached (${:.4} of ${:.4}), skipping the remaining {} articles",
                    ledger.spent_usd(),
                    ledger.ceiling_usd(),
                    remaining
                ));
                report.not_attempted += remaining;
                stopped = true;
                break;
            }

            let prompt = match self.prompts.build(&article) {
                Ok(prompt) => prompt,
                Err(e) => {
                    log.warn(&format!("⏭️ Skipping {}: {}", article.link, e));
                    report.rejected += 1;
                    continue;
                }
            };

            if called_before && !self.config.pacing.is_zero() {
                log.debug(&format!("⏳ Pacing for {:?}", self.config.pacing));
                tokio::time::sleep(self.config.pacing).await;
            }

            if article.is_high_priority() {
                log.info(&format!("🔎 Analyzing (high priority): {}", article.title));
            } else {
                log.info(&format!("🔎 Analyzing: {}", article.title));
            }
            report.attempted += 1;
            let outcome = self.engine.analyze(&prompt).await;
            called_before = true;

            match outcome {
                AnalysisOutcome::Success(analysis) => {
                    let missing = analysis.missing_sections();
                    if !missing.is_empty() {
                        log.warn(&format!(
                            "📭 Answer lacked {} section(s), filled with placeholders",
                            missing.len()
                        ));
                    }
                    ledger.charge(self.config.cost_per_call_usd);
                    report.articles.push(article.with_analysis(analysis));
                    log.info("✨ Analysis complete");
                }
                AnalysisOutcome::Failure(reason) => {
                    log.error(&format!(
                        "❌ Analysis failed for '{}' ({}): {}",
                        article.title, article.link, reason
                    ));
                    report.failed += 1;
                }
            }
        }

        let end = if stopped {
            RunState::BudgetStopped
        } else {
            RunState::Done
        };
        let report = report.finish(end, &ledger);
        info!(
            "✅ Run {} finished ({:?}): {} analyzed, {} failed, {} rejected, {} not attempted, ${:.4} of ${:.4} spent",
            report.run_id,
            report.state,
            report.analyzed(),
            report.failed,
            report.rejected,
            report.not_attempted,
            report.spent_usd,
            report.budget_usd
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{article, full_answer, ScriptedModel};
    use aiwire_core::{Error, MISSING_SECTION};
    use std::sync::Arc;
    use std::time::Duration;

    fn config(budget_usd: f64) -> RunConfig {
        RunConfig {
            max_articles: 30,
            budget_usd,
            cost_per_call_usd: 0.01,
            pacing: Duration::ZERO,
        }
    }

    fn orchestrator(model: &Arc<ScriptedModel>, config: RunConfig) -> Orchestrator {
        Orchestrator::new(
            AnalysisEngine::new(model.clone()),
            PromptBuilder::default(),
            config,
        )
        .unwrap()
    }

    fn links(report: &RunReport) -> Vec<String> {
        report.articles.iter().map(|a| a.article.link.clone()).collect()
    }

    #[tokio::test]
    async fn test_zero_budget_never_calls_engine() {
        let model = Arc::new(ScriptedModel::always(&full_answer()));
        let report = orchestrator(&model, config(0.0))
            .run(vec![article(1), article(2)])
            .await;

        assert!(report.articles.is_empty());
        assert_eq!(report.state, RunState::BudgetStopped);
        assert_eq!(report.not_attempted, 2);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_input_is_done_without_calls() {
        let model = Arc::new(ScriptedModel::always(&full_answer()));
        let report = orchestrator(&model, config(1.0)).run(Vec::new()).await;

        assert!(report.articles.is_empty());
        assert_eq!(report.state, RunState::Done);
        assert!(report.state.is_terminal());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_budget_for_two_calls_stops_before_third() {
        let model = Arc::new(ScriptedModel::always(&full_answer()));
        let report = orchestrator(&model, config(0.02))
            .run(vec![article(1), article(2), article(3)])
            .await;

        assert_eq!(links(&report), vec![article(1).link, article(2).link]);
        assert_eq!(report.state, RunState::BudgetStopped);
        assert_eq!(report.not_attempted, 1);
        assert_eq!(model.calls(), 2);
        assert_eq!(report.spent_usd, 0.02);
    }

    #[tokio::test]
    async fn test_unparseable_answer_yields_empty_output() {
        let model = Arc::new(ScriptedModel::always("not json at all"));
        let report = orchestrator(&model, config(1.0)).run(vec![article(1)]).await;

        assert!(report.articles.is_empty());
        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.failed, 1);
        assert_eq!(report.spent_usd, 0.0);
    }

    #[tokio::test]
    async fn test_missing_key_is_filled_with_placeholder() {
        let partial = r#"{"affirmative":"a","critical":"c","market":"m","editor_summary":"e"}"#;
        let model = Arc::new(ScriptedModel::new(vec![Ok(full_answer()), Ok(partial.to_string())]));
        let report = orchestrator(&model, config(1.0))
            .run(vec![article(1), article(2)])
            .await;

        assert_eq!(report.analyzed(), 2);
        assert!(report.articles[0].analysis.missing_sections().is_empty());
        assert_eq!(report.articles[1].analysis.knowledge, MISSING_SECTION);
        assert_eq!(report.articles[1].analysis.editor_summary, "e");
    }

    #[tokio::test]
    async fn test_output_is_ordered_subsequence_and_only_successes_are_charged() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(full_answer()),
            Ok("```json\nnope\n```".to_string()),
            Ok(full_answer()),
            Err(Error::Inference("503 Service Unavailable".to_string())),
            Ok(full_answer()),
        ]));
        let input: Vec<_> = (1..=5).map(article).collect();
        let report = orchestrator(&model, config(1.0)).run(input).await;

        assert_eq!(
            links(&report),
            vec![article(1).link, article(3).link, article(5).link]
        );
        assert_eq!(report.attempted, 5);
        assert_eq!(report.failed, 2);
        assert_eq!(report.state, RunState::Done);
        assert!((report.spent_usd - 0.03).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_invalid_article_is_skipped_without_a_call() {
        let mut blank = article(2);
        blank.summary = "  ".to_string();
        let model = Arc::new(ScriptedModel::always(&full_answer()));
        let report = orchestrator(&model, config(1.0))
            .run(vec![article(1), blank, article(3)])
            .await;

        assert_eq!(links(&report), vec![article(1).link, article(3).link]);
        assert_eq!(report.rejected, 1);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_item_cap_limits_attempts() {
        let model = Arc::new(ScriptedModel::always(&full_answer()));
        let capped = RunConfig {
            max_articles: 2,
            ..config(1.0)
        };
        let input: Vec<_> = (1..=5).map(article).collect();
        let report = orchestrator(&model, capped).run(input).await;

        assert_eq!(report.analyzed(), 2);
        assert_eq!(report.not_attempted, 3);
        assert_eq!(report.state, RunState::Done);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_calls() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(full_answer()),
            Ok("garbage".to_string()),
            Ok(full_answer()),
        ]));
        let paced = RunConfig {
            pacing: Duration::from_secs(2),
            ..config(1.0)
        };
        let started = tokio::time::Instant::now();
        let report = orchestrator(&model, paced)
            .run(vec![article(1), article(2), article(3)])
            .await;

        let elapsed = started.elapsed();
        assert_eq!(report.analyzed(), 2);
        assert!(elapsed >= Duration::from_secs(4), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "{:?}", elapsed);
    }

    #[test]
    fn test_terminal_state_is_never_left() {
        let mut state = RunState::Pending;
        assert!(state.advance(RunState::InProgress));
        assert_eq!(state, RunState::InProgress);
        assert!(!state.advance(RunState::InProgress));
        assert!(state.advance(RunState::BudgetStopped));
        assert!(!state.advance(RunState::Done));
        assert_eq!(state, RunState::BudgetStopped);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let model = Arc::new(ScriptedModel::always(&full_answer()));
        let result = Orchestrator::new(
            AnalysisEngine::new(model),
            PromptBuilder::default(),
            RunConfig {
                cost_per_call_usd: -1.0,
                ..RunConfig::default()
            },
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
