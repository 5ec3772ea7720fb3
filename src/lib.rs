pub mod config;
pub mod error;
pub mod gemini;
pub mod interpret;
pub mod output;
pub mod resolve;
pub mod state;

use serde::{Deserialize, Serialize};

pub use error::Error;
pub use resolve::{VideoId, resolve};

/// A web page cited by the generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub uri: String,
}

impl GroundingSource {
    /// Title for display, falling back to a generic label
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Source",
        }
    }
}

/// Structured analysis of a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub context: String,
    pub sources: Vec<GroundingSource>,
}
