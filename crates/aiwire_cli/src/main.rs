use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use aiwire_core::config::{DEFAULT_BUDGET_USD, DEFAULT_COST_PER_CALL_USD, DEFAULT_MAX_ARTICLES};
use aiwire_core::{Error, Result, RunConfig};
use aiwire_inference::prompt::{DEFAULT_LANGUAGE, DEFAULT_SUMMARY_CHARS};
use aiwire_inference::{create_model, AnalysisEngine, Config, PromptBuilder, Provider};
use aiwire_pipeline::handoff::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use aiwire_pipeline::{init_logging, load_articles, mock_report, write_report, Orchestrator};
use clap::Parser;
use tracing::{info, Level};

#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `1h15m30s`, `2s`, `500ms`, `1d` or a bare number of seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let mut total = Duration::ZERO;
        while !rest.is_empty() {
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits_end == 0 {
                let c = rest.chars().next().unwrap_or_default();
                return Err(format!("Invalid character in duration: {}", c));
            }
            let num: u64 = rest[..digits_end]
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;
            rest = &rest[digits_end..];

            let unit_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let unit = rest[..unit_end].trim();
            rest = rest[unit_end..].trim_start();

            let part = match unit {
                "ms" => Some(Duration::from_millis(num)),
                "" | "s" => Some(Duration::from_secs(num)),
                "m" => num.checked_mul(60).map(Duration::from_secs),
                "h" => num.checked_mul(3600).map(Duration::from_secs),
                "d" => num.checked_mul(86400).map(Duration::from_secs),
                other => return Err(format!("Invalid duration unit: {}", other)),
            };
            total = part
                .and_then(|part| total.checked_add(part))
                .ok_or_else(|| "Duration is too large".to_string())?;
        }

        Ok(HumanDuration(total))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Budget-gated multi-perspective analysis of AI news", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyze collected articles and write the report for the publisher
    Analyze(AnalyzeArgs),
    /// Print the analysis prompt for one collected article
    Prompt {
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
        /// Position of the article in the input file
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[command(flatten)]
        prompt: PromptArgs,
    },
    /// Write a one-article mock report without calling any model
    Mock {
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct PromptArgs {
    /// Maximum summary characters sent to the model
    #[arg(long, default_value_t = DEFAULT_SUMMARY_CHARS)]
    summary_chars: usize,
    /// Language the analysis is written in
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,
}

impl PromptArgs {
    fn builder(&self) -> PromptBuilder {
        PromptBuilder::new(self.summary_chars, self.language.clone())
    }
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    #[arg(long, default_value = "deepseek", help = "Model to use for analysis. Available models: deepseek (default), gemini, dummy")]
    model: Provider,
    /// Override the provider's model identifier
    #[arg(long)]
    model_name: Option<String>,
    /// Override the provider's API root
    #[arg(long)]
    base_url: Option<String>,
    /// API key; defaults to DEEPSEEK_API_KEY or GEMINI_API_KEY
    #[arg(long)]
    api_key: Option<String>,
    /// Spend ceiling for the run, in USD
    #[arg(long, default_value_t = DEFAULT_BUDGET_USD)]
    budget: f64,
    /// Flat cost estimate charged per successful call, in USD
    #[arg(long, default_value_t = DEFAULT_COST_PER_CALL_USD)]
    cost_per_call: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_ARTICLES)]
    max_articles: usize,
    /// Pause between backend calls (e.g. 2s, 500ms)
    #[arg(long, default_value = "2s")]
    pacing: HumanDuration,
    /// Transport timeout for one backend call
    #[arg(long, default_value = "60s")]
    timeout: HumanDuration,
    #[command(flatten)]
    prompt: PromptArgs,
}

impl AnalyzeArgs {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            max_articles: self.max_articles,
            budget_usd: self.budget,
            cost_per_call_usd: self.cost_per_call,
            pacing: self.pacing.0,
        }
    }

    fn inference_config(&self) -> Config {
        let api_key = self.api_key.clone().or_else(|| {
            self.model
                .api_key_env()
                .and_then(|var| std::env::var(var).ok())
        });
        Config {
            provider: self.model,
            api_key,
            model_name: self.model_name.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout.0,
        }
    }
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    if !args.input.exists() {
        info!("📭 No news data found at {}, nothing to analyze", args.input.display());
        return Ok(());
    }

    let model = create_model(&args.inference_config())?;
    let orchestrator = Orchestrator::new(
        AnalysisEngine::new(model),
        args.prompt.builder(),
        args.run_config(),
    )?;

    let articles = load_articles(&args.input).await?;
    let report = orchestrator.run(articles).await;
    write_report(&args.output, &report.articles).await?;

    info!("🏁 Analysis completed");
    Ok(())
}

async fn print_prompt(input: PathBuf, index: usize, prompt: PromptArgs) -> Result<()> {
    let articles = load_articles(&input).await?;
    let article = articles.get(index).ok_or_else(|| {
        Error::Config(format!(
            "index {} is out of range, {} holds {} articles",
            index,
            input.display(),
            articles.len()
        ))
    })?;
    let prompt = prompt.builder().build(article)?;
    println!("{}", prompt.text());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO });

    match cli.command {
        Commands::Analyze(args) => analyze(args).await,
        Commands::Prompt {
            input,
            index,
            prompt,
        } => print_prompt(input, index, prompt).await,
        Commands::Mock { output } => {
            write_report(&output, &mock_report()).await?;
            info!("🧪 Created mock report at {}", output.display());
            Ok(())
        }
    }
}
