//! Editing sessions: the in-memory form snapshot behind the form and the preview.
//!
//! One session holds one `ResumeDocument`. The form writes it, the preview reads
//! it, and an extraction replaces it wholesale on success. Nothing is persisted:
//! a restart drops every session.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::resume::data_uri::ResumeDataUri;
use crate::resume::extraction::{extract_document, ExtractionError, ResumeExtractor};

/// Undrained notifications beyond this are dropped oldest-first.
const MAX_PENDING_NOTIFICATIONS: usize = 50;

const BUSY_MESSAGE: &str = "A resume extraction is in progress; try again when it completes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A user-visible message about something that settled (the server-side toast).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn extraction_succeeded() -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Success!".to_string(),
            description: "Resume data extracted and pre-filled.".to_string(),
            created_at: Utc::now(),
        }
    }

    fn extraction_failed() -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error".to_string(),
            description:
                "Failed to extract data from resume. Please try again or fill manually."
                    .to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
struct ResumeSession {
    document: ResumeDocument,
    busy: bool,
    revision: u64,
    notifications: Vec<Notification>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResumeSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            document: ResumeDocument::default(),
            busy: false,
            revision: 0,
            notifications: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn set_document(&mut self, document: ResumeDocument) {
        self.document = document;
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
        let overflow = self
            .notifications
            .len()
            .saturating_sub(MAX_PENDING_NOTIFICATIONS);
        self.notifications.drain(..overflow);
    }

    fn snapshot(&self, id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            id,
            document: self.document.clone(),
            busy: self.busy,
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// What the form shows: the document plus the busy flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub document: ResumeDocument,
    pub busy: bool,
    /// Bumped on every change to `document`.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Extracted,
    Failed,
}

/// How an extraction settled. A failure is reported here, never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub outcome: ExtractionOutcome,
    pub snapshot: SessionSnapshot,
    pub notification: Notification,
}

/// Shared, in-memory session map. Cheap to clone.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, ResumeSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionSnapshot {
        let id = Uuid::new_v4();
        let session = ResumeSession::new();
        let snapshot = session.snapshot(id);
        self.sessions.write().await.insert(id, session);
        info!("Created resume session {id}");
        snapshot
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, AppError> {
        let sessions = self.sessions.read().await;
        Ok(get(&sessions, id)?.snapshot(id))
    }

    pub async fn document(&self, id: Uuid) -> Result<ResumeDocument, AppError> {
        let sessions = self.sessions.read().await;
        Ok(get(&sessions, id)?.document.clone())
    }

    /// Form edit. Stored as typed; the preview reads the same document.
    pub async fn replace_document(
        &self,
        id: Uuid,
        document: ResumeDocument,
    ) -> Result<SessionSnapshot, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = get_mut(&mut sessions, id)?;
        if session.busy {
            return Err(AppError::Conflict(BUSY_MESSAGE.to_string()));
        }
        session.set_document(document);
        Ok(session.snapshot(id))
    }

    pub async fn reset(&self, id: Uuid) -> Result<SessionSnapshot, AppError> {
        self.replace_document(id, ResumeDocument::default()).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Deleted resume session {id}"))
            .ok_or_else(|| not_found(id))
    }

    pub async fn drain_notifications(&self, id: Uuid) -> Result<Vec<Notification>, AppError> {
        let mut sessions = self.sessions.write().await;
        Ok(std::mem::take(&mut get_mut(&mut sessions, id)?.notifications))
    }

    /// Marks the session busy. Only one extraction per session may be in flight.
    pub async fn begin_extraction(&self, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let session = get_mut(&mut sessions, id)?;
        if session.busy {
            return Err(AppError::Conflict(BUSY_MESSAGE.to_string()));
        }
        session.busy = true;
        Ok(())
    }

    /// Settles an extraction. On failure the document is left exactly as it was.
    pub async fn finish_extraction(
        &self,
        id: Uuid,
        result: Result<ResumeDocument, ExtractionError>,
    ) -> Result<ExtractionReport, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = get_mut(&mut sessions, id)?;
        session.busy = false;

        let (outcome, notification) = match result {
            Ok(document) => {
                session.set_document(document);
                (ExtractionOutcome::Extracted, Notification::extraction_succeeded())
            }
            Err(e) => {
                warn!("Resume extraction failed for session {id}: {e}");
                (ExtractionOutcome::Failed, Notification::extraction_failed())
            }
        };
        session.notify(notification.clone());

        Ok(ExtractionReport {
            outcome,
            snapshot: session.snapshot(id),
            notification,
        })
    }
}

/// Full extraction cycle for one session: busy → collaborator → settle.
///
/// The collaborator runs in its own task, watched by a detached settling task,
/// so the busy flag clears even if the caller stops waiting or the collaborator
/// panics.
pub async fn run_extraction(
    store: &SessionStore,
    extractor: Arc<dyn ResumeExtractor>,
    id: Uuid,
    resume: ResumeDataUri,
) -> Result<ExtractionReport, AppError> {
    store.begin_extraction(id).await?;

    let task_store = store.clone();
    let settle = tokio::spawn(async move {
        let work =
            tokio::spawn(async move { extract_document(extractor.as_ref(), &resume).await });
        let (result, panicked) = match work.await {
            Ok(result) => (result, false),
            Err(join_error) => (
                Err(ExtractionError::Task(join_error.to_string())),
                join_error.is_panic(),
            ),
        };
        let report = task_store.finish_extraction(id, result).await;
        (report, panicked)
    });

    match settle.await {
        Ok((_, true)) => Err(AppError::Internal(anyhow!(
            "extraction task panicked for session {id}"
        ))),
        Ok((report, false)) => report,
        Err(join_error) => Err(AppError::Internal(anyhow!(
            "extraction settling failed for session {id}: {join_error}"
        ))),
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

fn get(sessions: &HashMap<Uuid, ResumeSession>, id: Uuid) -> Result<&ResumeSession, AppError> {
    sessions.get(&id).ok_or_else(|| not_found(id))
}

fn get_mut(
    sessions: &mut HashMap<Uuid, ResumeSession>,
    id: Uuid,
) -> Result<&mut ResumeSession, AppError> {
    sessions.get_mut(&id).ok_or_else(|| not_found(id))
}
