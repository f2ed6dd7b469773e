mod http;
mod pool;
mod stdio;

pub use http::HttpScorer;
pub use pool::ScoringPool;
pub use stdio::StdioScorer;

use crate::{
    Result,
    config::{ScoringBackend, ScoringConfig},
};
use async_trait::async_trait;
use std::sync::Arc;

/// The external scoring routine (detection + segmentation).
///
/// `init` loads models and is called once per process before any `run`.
/// `run` takes a serialized `InferenceRequest` and returns a serialized
/// result object containing at least `success`.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn init(&self) -> Result<()>;
    async fn run(&self, raw_data: &str) -> Result<String>;

    /// Whether the scorer can still serve `run` after a successful `init`.
    fn is_alive(&self) -> bool {
        true
    }
}

pub fn create_scorer(config: &ScoringConfig) -> Result<Arc<dyn Scorer>> {
    match config.backend {
        ScoringBackend::Stdio => Ok(Arc::new(StdioScorer::new(config)?)),
        ScoringBackend::Http => Ok(Arc::new(HttpScorer::new(config)?)),
    }
}
