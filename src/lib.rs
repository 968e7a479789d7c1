//! Medical report analysis: rule-based extraction, trend tracking across a
//! patient's history, and chronological patient summaries.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod timeline;

pub use pipeline::analysis::{AnalysisError, AnalysisOrchestrator};
pub use pipeline::extraction::{AnalysisEngine, ExtractionResult, RuleBasedEngine};
pub use pipeline::trends::TrendCalculator;
pub use timeline::{PatientSummary, TimelineAggregator, TimelineError};

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
