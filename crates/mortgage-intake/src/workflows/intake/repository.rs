use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationId, IntakeSubmission};

/// Storage abstraction for submitted applications, so the service can be
/// exercised in isolation. Implementations keep most-recent-first order.
pub trait ApplicationRepository: Send + Sync {
    /// Insert at the head of the list.
    fn prepend(&self, application: Application) -> Result<Application, RepositoryError>;
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Feed entry shown on the notifications tab and surfaced as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
}

impl NotificationKind {
    pub const fn accent(self) -> &'static str {
        match self {
            NotificationKind::Info => "blue",
            NotificationKind::Success => "green",
        }
    }
}

/// Append-only notification feed.
pub trait NotificationLog: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
    /// Most recent first, at most `limit` entries.
    fn recent(&self, limit: usize) -> Result<Vec<Notification>, NotificationError>;
}

/// Notification feed error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification log unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook handing finished submissions and support requests to the
/// broker side (e-mail relay, CRM, or an in-memory recorder in tests).
pub trait BrokerGateway: Send + Sync {
    fn dispatch(&self, dispatch: BrokerDispatch) -> Result<(), DispatchError>;
    fn relay_support(&self, request: SupportRequest) -> Result<(), DispatchError>;
}

/// Dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("broker transport unavailable: {0}")]
    Transport(String),
}

/// Plain-text summary of one submission, shaped like the message the broker
/// desk receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerDispatch {
    pub application_id: ApplicationId,
    pub phone: String,
    pub inn: String,
    pub email: String,
    pub children_note: String,
    pub attachments: Vec<AttachmentSummary>,
}

/// Per-document attachment line in the broker summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub document_label: String,
    pub file_count: usize,
}

impl BrokerDispatch {
    pub fn from_submission(application_id: ApplicationId, submission: &IntakeSubmission) -> Self {
        let attachments = [
            ("Passport", submission.passport.len()),
            ("SNILS", submission.snils.len()),
            ("Birth certificate", submission.certificates.len()),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| AttachmentSummary {
            document_label: label.to_string(),
            file_count: count,
        })
        .collect();

        Self {
            application_id,
            phone: submission.phone.clone(),
            inn: submission.details.inn.clone(),
            email: submission.details.email.clone(),
            children_note: submission.disclosure.label().to_string(),
            attachments,
        }
    }

    /// Message body for the broker mailbox.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("New mortgage application {}", self.application_id.0),
            String::new(),
            "Contact details:".to_string(),
            format!("- Phone: {}", self.phone),
            format!("- Email: {}", self.email),
            format!("- INN: {}", self.inn),
            format!("- Children: {}", self.children_note),
        ];
        if !self.attachments.is_empty() {
            lines.push(String::new());
            lines.push("Documents:".to_string());
            for attachment in &self.attachments {
                lines.push(format!(
                    "- {} ({} file(s))",
                    attachment.document_label, attachment.file_count
                ));
            }
        }
        lines.join("\n")
    }
}

/// Message left on the support tab, relayed to the broker desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequest {
    pub phone: String,
    pub message: String,
}
