use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub caption: String,
    /// Base64 encoded images, forwarded untouched.
    pub images: Vec<String>,
    #[serde(default = "default_box_threshold")]
    pub box_threshold: f64,
    #[serde(default = "default_text_threshold")]
    pub text_threshold: f64,
    #[serde(default)]
    pub return_base64_masks: bool,
}

impl InferenceRequest {
    pub fn new(caption: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            caption: caption.into(),
            images,
            box_threshold: default_box_threshold(),
            text_threshold: default_text_threshold(),
            return_base64_masks: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub success: bool,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub total_images: Option<usize>,
    /// Per-image records; their shape belongs to the scorer.
    #[serde(default)]
    pub results: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    pub inference: String,
    pub health: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub models_loaded: bool,
}

fn default_box_threshold() -> f64 {
    0.35
}

fn default_text_threshold() -> f64 {
    0.25
}
