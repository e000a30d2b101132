use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::extraction::prompts::{CV_EXTRACT_PROMPT, CV_EXTRACT_SYSTEM};
use crate::extraction::ExtractionError;
use crate::llm_client::LlmClient;

/// Longest CV text sent to the model. Longer documents are cut at this many characters.
const MAX_CV_CHARS: usize = 60_000;

/// Turns CV text into a raw extraction payload.
///
/// The payload is returned unparsed; callers validate it with
/// `ExtractedProfileData::from_value`. Carried in `AppState` as
/// `Arc<dyn CvExtractor>`.
#[async_trait]
pub trait CvExtractor: Send + Sync {
    async fn extract(&self, document_text: &str) -> Result<Value, ExtractionError>;
}

pub struct LlmCvExtractor {
    llm: LlmClient,
}

impl LlmCvExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CvExtractor for LlmCvExtractor {
    async fn extract(&self, document_text: &str) -> Result<Value, ExtractionError> {
        let prompt = build_prompt(document_text);
        let payload: Value = self.llm.call_json(&prompt, CV_EXTRACT_SYSTEM).await?;
        info!(
            "CV extraction returned {} top-level keys",
            payload.as_object().map_or(0, |o| o.len())
        );
        Ok(payload)
    }
}

fn build_prompt(document_text: &str) -> String {
    let text = match document_text.char_indices().nth(MAX_CV_CHARS) {
        Some((cut, _)) => {
            warn!(
                "CV text truncated to {MAX_CV_CHARS} of {} characters",
                document_text.chars().count()
            );
            &document_text[..cut]
        }
        None => document_text,
    };
    CV_EXTRACT_PROMPT.replace("{cv_text}", text)
}
