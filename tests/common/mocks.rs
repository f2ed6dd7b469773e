use async_trait::async_trait;
use grounded_sam_gateway::{Error, Result, scoring::Scorer};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock scorer producing one detection record per input image
#[derive(Debug, Default)]
pub struct MockScorer {
    pub requests: Arc<Mutex<Vec<Value>>>,
    pub init_calls: AtomicUsize,
    pub error: Option<String>,
    pub init_error: Option<String>,
    pub raw_output: Option<String>,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_init_error(mut self, error: &str) -> Self {
        self.init_error = Some(error.to_string());
        self
    }

    pub fn with_raw_output(mut self, output: &str) -> Self {
        self.raw_output = Some(output.to_string());
        self
    }

    pub fn get_requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scorer for MockScorer {
    async fn init(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match &self.init_error {
            Some(error) => Err(Error::model_unavailable(error.clone())),
            None => Ok(()),
        }
    }

    async fn run(&self, raw_data: &str) -> Result<String> {
        let request: Value = serde_json::from_str(raw_data)?;
        self.requests.lock().unwrap().push(request.clone());

        if let Some(ref error) = self.error {
            return Err(Error::inference(error.clone()));
        }
        if let Some(ref output) = self.raw_output {
            return Ok(output.clone());
        }

        let images = request["images"].as_array().cloned().unwrap_or_default();
        let masks = if request["return_base64_masks"] == json!(true) {
            json!(["bWFzaw=="])
        } else {
            Value::Null
        };
        let results: Vec<Value> = images
            .iter()
            .enumerate()
            .map(|(index, _)| {
                json!({
                    "image_index": index,
                    "boxes": [[0.1, 0.2, 0.5, 0.6]],
                    "labels": [request["caption"]],
                    "scores": [0.92],
                    "masks": masks
                })
            })
            .collect();

        Ok(json!({
            "success": true,
            "caption": request["caption"],
            "total_images": images.len(),
            "results": results
        })
        .to_string())
    }
}
