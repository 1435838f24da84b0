//! Extraction: hands a resume file to the AI collaborator and normalizes what comes back.
//!
//! The collaborator is pluggable: `AppState` holds an `Arc<dyn ResumeExtractor>`.
//! Default: `LlmResumeExtractor` (Claude Messages API via `llm_client`).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ExtractionMode;
use crate::llm_client::{DocumentSource, InputBlock, LlmClient, LlmError};
use crate::models::resume::ResumeDocument;
use crate::resume::data_uri::{DataUriError, ResumeDataUri, PDF, TXT};
use crate::resume::normalize::normalize_extracted;
use crate::resume::prompts::{extraction_system, EXTRACTION_PROMPT};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported resume file type '{0}'")]
    UnsupportedType(String),

    #[error("invalid resume payload: {0}")]
    Payload(#[from] DataUriError),

    #[error("could not read PDF text: {0}")]
    PdfText(String),

    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// The extraction collaborator: given a resume file, returns a best-effort
/// JSON guess at its content. No completeness or schema fidelity is promised.
#[async_trait]
pub trait ResumeExtractor: Send + Sync {
    async fn extract(&self, resume: &ResumeDataUri) -> Result<Value, ExtractionError>;
}

/// Runs the collaborator and coerces its answer into the strict document shape.
pub async fn extract_document(
    extractor: &dyn ResumeExtractor,
    resume: &ResumeDataUri,
) -> Result<ResumeDocument, ExtractionError> {
    if !resume.is_accepted_type() {
        return Err(ExtractionError::UnsupportedType(resume.mime_type().to_string()));
    }

    let raw = extractor.extract(resume).await?;
    let document = normalize_extracted(&raw);
    info!(
        "Extracted resume ({}): {} experience, {} education, {} skills, {} projects",
        resume.mime_type(),
        document.experience.len(),
        document.education.len(),
        document.skills.len(),
        document.projects.len()
    );
    Ok(document)
}

// ────────────────────────────────────────────────────────────────────────────
// LlmResumeExtractor
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmResumeExtractor {
    llm: LlmClient,
    mode: ExtractionMode,
}

impl LlmResumeExtractor {
    pub fn new(llm: LlmClient, mode: ExtractionMode) -> Self {
        Self { llm, mode }
    }
}

#[async_trait]
impl ResumeExtractor for LlmResumeExtractor {
    async fn extract(&self, resume: &ResumeDataUri) -> Result<Value, ExtractionError> {
        // Plain text goes to the model as a text document; everything else as base64.
        let text = match (resume.mime_type(), self.mode) {
            (TXT, _) => Some(String::from_utf8_lossy(&resume.decode()?).into_owned()),
            (PDF, ExtractionMode::Text) => Some(pdf_text(resume.decode()?).await?),
            _ => None,
        };
        let source = match &text {
            Some(text) => DocumentSource::Text {
                media_type: TXT,
                data: text,
            },
            None => DocumentSource::Base64 {
                media_type: resume.mime_type(),
                data: resume.base64(),
            },
        };
        debug!(
            "Sending {} resume to the model as a {} document",
            resume.mime_type(),
            if text.is_some() { "text" } else { "base64" }
        );

        let system = extraction_system();
        let content = [
            InputBlock::Document { source },
            InputBlock::Text {
                text: EXTRACTION_PROMPT,
            },
        ];
        Ok(self.llm.call_json::<Value>(&content, &system).await?)
    }
}

/// pdf-extract is CPU-bound and synchronous.
async fn pdf_text(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractionError::PdfText(e.to_string()))?
        .map_err(|e| ExtractionError::PdfText(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractionError::PdfText("no extractable text".to_string()));
    }
    Ok(text)
}

/// Scripted collaborators for tests elsewhere in the crate.
#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Replays queued outcomes in order. Once the queue is empty every call fails.
    #[derive(Default)]
    pub struct ScriptedExtractor {
        outcomes: Mutex<Vec<Result<Value, String>>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedExtractor {
        pub fn new(outcomes: Vec<Result<Value, String>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().rev().collect()),
                ..Default::default()
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResumeExtractor for ScriptedExtractor {
        async fn extract(&self, _resume: &ResumeDataUri) -> Result<Value, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.outcomes.lock().unwrap().pop();
            let message = match next {
                Some(Ok(value)) => return Ok(value),
                Some(Err(message)) => message,
                None => "no scripted outcome".to_string(),
            };
            Err(ExtractionError::Llm(LlmError::Api {
                status: 500,
                message,
            }))
        }
    }

    /// Panics mid-call, after an optional delay.
    pub struct PanickingExtractor {
        delay: Duration,
    }

    impl PanickingExtractor {
        pub fn new(delay: Duration) -> Self {
            Self { delay }
        }
    }

    #[async_trait]
    impl ResumeExtractor for PanickingExtractor {
        async fn extract(&self, _resume: &ResumeDataUri) -> Result<Value, ExtractionError> {
            tokio::time::sleep(self.delay).await;
            panic!("collaborator crashed");
        }
    }
}
