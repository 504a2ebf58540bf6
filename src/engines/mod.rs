pub mod metrics;
pub mod orchestrator;

pub use orchestrator::{run_batch, ExperimentOrchestrator, ExperimentSummary, TickerOutcome};
