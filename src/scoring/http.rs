use super::Scorer;
use crate::{Error, Result, config::ScoringConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashMap;
use tracing::debug;

/// Scorer hosted behind a remote HTTP endpoint exposing `POST /init` and `POST /run`.
pub struct HttpScorer {
    base_url: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl HttpScorer {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let base_url = config
            .url
            .clone()
            .ok_or_else(|| Error::config("http scoring backend requires url field"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: config.headers.clone(),
            client: reqwest::Client::new(),
        })
    }

    async fn post(&self, path: &str, body: String) -> Result<(reqwest::StatusCode, String)> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {} ({} bytes)", url, body.len());

        let mut req_builder = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        for (key, value) in &self.headers {
            req_builder = req_builder.header(key, value);
        }

        let response = req_builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn init(&self) -> Result<()> {
        let (status, body) = self
            .post("init", "{}".to_string())
            .await
            .map_err(|e| Error::model_unavailable(format!("Scoring service unreachable: {}", e)))?;

        if !status.is_success() {
            return Err(Error::model_unavailable(format!(
                "Scoring service init failed with {}: {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn run(&self, raw_data: &str) -> Result<String> {
        let (status, body) = self.post("run", raw_data.to_string()).await?;

        if !status.is_success() {
            return Err(Error::inference(format!(
                "Scoring service returned {}: {}",
                status, body
            )));
        }
        Ok(body)
    }
}
