use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Prepends context prefixes such as `[3/30]` to every log line.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: Vec<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    fn line(&self, message: &str) -> String {
        let prefix = self
            .prefixes
            .iter()
            .map(|p| format!("{} ", p))
            .collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.line(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.line(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.line(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.line(message));
    }
}

/// Install the global fmt subscriber once; later calls only hand out a logger.
pub fn init_logging(level: Level) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            // Another subscriber may have won the race; keep it.
            let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
        });
    }
    Logger::new()
}
