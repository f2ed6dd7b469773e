use super::Scorer;
use crate::{
    Error, Result,
    config::ScoringConfig,
    server::{InferenceRequest, InferenceResponse},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, Semaphore};
use tracing::{debug, info};

/// Bounded front for a [`Scorer`].
///
/// Owns the one-time model initialization and the readiness it implies, caps
/// the number of scorer calls in flight, and enforces the per-call timeout.
pub struct ScoringPool {
    scorer: Arc<dyn Scorer>,
    permits: Semaphore,
    workers: usize,
    timeout: Option<Duration>,
    initialized: OnceCell<()>,
}

impl ScoringPool {
    pub fn new(scorer: Arc<dyn Scorer>, workers: usize, timeout: Option<Duration>) -> Self {
        let workers = workers.max(1);
        Self {
            scorer,
            permits: Semaphore::new(workers),
            workers,
            timeout,
            initialized: OnceCell::new(),
        }
    }

    pub fn from_config(scorer: Arc<dyn Scorer>, config: &ScoringConfig) -> Self {
        let timeout = config
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self::new(scorer, config.workers, timeout)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `Scorer::init` unless it already succeeded.
    pub async fn initialize(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                info!("Initializing models...");
                self.scorer.init().await?;
                info!("Models initialized successfully!");
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    /// Models loaded and the scorer still able to serve.
    pub fn is_ready(&self) -> bool {
        self.initialized.initialized() && self.scorer.is_alive()
    }

    pub async fn score(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        if !self.initialized.initialized() {
            return Err(Error::model_unavailable("Models are not loaded"));
        }

        let raw_data = serde_json::to_string(request)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::internal("Scoring pool is closed"))?;
        debug!(
            "Scoring {} image(s), {} of {} workers free",
            request.images.len(),
            self.permits.available_permits(),
            self.workers
        );

        let call = self.scorer.run(&raw_data);
        let result_json = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => call.await?,
        };

        let response: InferenceResponse = serde_json::from_str(&result_json)
            .map_err(|e| Error::invalid_response(e.to_string()))?;
        reconcile(request, response)
    }
}

/// Holds a successful result to one record per image and echoes the caption.
fn reconcile(request: &InferenceRequest, mut response: InferenceResponse) -> Result<InferenceResponse> {
    if !response.success {
        return Ok(response);
    }

    let expected = request.images.len();
    let returned = response
        .results
        .as_ref()
        .map(Vec::len)
        .ok_or_else(|| Error::invalid_response("successful result has no results"))?;
    if returned != expected {
        return Err(Error::invalid_response(format!(
            "scorer returned {} results for {} images",
            returned, expected
        )));
    }

    match response.total_images {
        Some(total) if total != expected => {
            return Err(Error::invalid_response(format!(
                "scorer reported total_images={} for {} images",
                total, expected
            )));
        }
        _ => response.total_images = Some(expected),
    }

    response.caption = Some(request.caption.clone());
    Ok(response)
}
