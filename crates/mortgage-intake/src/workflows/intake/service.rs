use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::auth::SmsCode;
use super::domain::{
    Application, ApplicationHistoryEntry, ApplicationId, ApplicationStatus, ArchiveEntry,
    ChildrenDisclosure, Document, DocumentId, DocumentKind, SessionId, StagedFile,
};
use super::repository::{
    ApplicationRepository, BrokerDispatch, BrokerGateway, DispatchError, Notification,
    NotificationError, NotificationKind, NotificationLog, RepositoryError, SupportRequest,
};
use super::session::{IntakeLimits, IntakeSession, SessionError, WizardStep};
use crate::config::SupportContact;

/// Service owning the wizard sessions and composing the repository, the
/// notification feed, and the broker gateway.
pub struct IntakeService<R, N, B> {
    sessions: Mutex<HashMap<SessionId, IntakeSession>>,
    repository: Arc<R>,
    notifications: Arc<N>,
    broker: Arc<B>,
    limits: IntakeLimits,
    support: SupportContact,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{id:06}"))
}

/// Response to opening a session: the issued code IS the delivery channel.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOpened {
    pub session_id: SessionId,
    pub phone: String,
    pub sms_code: String,
}

/// Result of staging one selection.
#[derive(Debug, Clone, Serialize)]
pub struct StagedDocuments {
    pub kind: DocumentKind,
    pub file_count: usize,
}

/// Snapshot of one session's wizard state for dashboard rendering.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStateView {
    pub step: WizardStep,
    pub step_index: u8,
    pub authenticated: bool,
    pub passport_files: usize,
    pub snils_files: usize,
    pub certificate_files: usize,
    pub disclosure: Option<ChildrenDisclosure>,
    pub submit_ready: bool,
}

impl<R, N, B> IntakeService<R, N, B>
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<N>,
        broker: Arc<B>,
        limits: IntakeLimits,
        support: SupportContact,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            repository,
            notifications,
            broker,
            limits,
            support,
        }
    }

    /// Issue an SMS challenge for `raw_phone` and register the session.
    pub fn open_session(&self, raw_phone: &str) -> Result<SessionOpened, IntakeServiceError> {
        let session =
            IntakeSession::open(raw_phone, self.limits.clone()).map_err(SessionError::from)?;
        Ok(self.register(session))
    }

    /// Same as [`Self::open_session`] with a caller-chosen code, for
    /// deterministic flows (demo, tests).
    pub fn open_session_with_code(
        &self,
        raw_phone: &str,
        code: SmsCode,
    ) -> Result<SessionOpened, IntakeServiceError> {
        let session = IntakeSession::open_with_code(raw_phone, code, self.limits.clone())
            .map_err(SessionError::from)?;
        Ok(self.register(session))
    }

    fn register(&self, session: IntakeSession) -> SessionOpened {
        let session_id = next_session_id();
        let opened = SessionOpened {
            session_id: session_id.clone(),
            phone: session.phone().as_str().to_string(),
            sms_code: session
                .sms_code()
                .map(|code| code.as_str().to_string())
                .unwrap_or_default(),
        };
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(session_id, session);
        opened
    }

    pub fn verify_code(&self, id: &SessionId, entered: &str) -> Result<(), IntakeServiceError> {
        self.with_session(id, |session| session.verify(entered))
    }

    pub fn begin_application(&self, id: &SessionId) -> Result<WizardStep, IntakeServiceError> {
        self.with_session(id, |session| session.begin())
    }

    pub fn advance(&self, id: &SessionId) -> Result<WizardStep, IntakeServiceError> {
        self.with_session(id, |session| session.advance())
    }

    pub fn retreat(&self, id: &SessionId) -> Result<WizardStep, IntakeServiceError> {
        self.with_session(id, |session| session.retreat())
    }

    pub fn stage_documents(
        &self,
        id: &SessionId,
        kind: DocumentKind,
        files: Vec<StagedFile>,
    ) -> Result<StagedDocuments, IntakeServiceError> {
        let file_count = self.with_session(id, |session| session.stage(kind, files))?;
        Ok(StagedDocuments { kind, file_count })
    }

    pub fn choose_disclosure(
        &self,
        id: &SessionId,
        choice: ChildrenDisclosure,
    ) -> Result<(), IntakeServiceError> {
        self.with_session(id, |session| session.choose_disclosure(choice))
    }

    pub fn set_details(
        &self,
        id: &SessionId,
        inn: &str,
        email: &str,
    ) -> Result<(), IntakeServiceError> {
        self.with_session(id, |session| session.set_details(inn, email))
    }

    /// Conclude the wizard: build the application from whatever was staged,
    /// prepend it to the history, post a feed entry, and hand the summary to
    /// the broker. The session lands back on the dashboard, cleared.
    pub fn submit(
        &self,
        id: &SessionId,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, IntakeServiceError> {
        let submission = self.with_session(id, |session| session.finish())?;

        let application_id = next_application_id();
        let mut documents = Vec::new();
        let staged = [
            (DocumentKind::Passport, &submission.passport),
            (DocumentKind::Snils, &submission.snils),
            (DocumentKind::BirthCertificate, &submission.certificates),
        ];
        for (kind, files) in staged {
            if files.is_empty() {
                continue;
            }
            documents.push(Document {
                id: DocumentId(format!("{}-doc-{}", application_id.0, documents.len() + 1)),
                kind,
                files: files.clone(),
                uploaded_at: submitted_at,
            });
        }

        let application = Application {
            id: application_id.clone(),
            status: ApplicationStatus::Pending,
            submitted_at,
            details: submission.details.clone(),
            disclosure: submission.disclosure,
            documents,
        };

        let stored = self.repository.prepend(application)?;

        self.notifications.publish(Notification {
            kind: NotificationKind::Success,
            title: "Documents sent to the broker".to_string(),
            body: format!("Application {} accepted for processing", application_id.0),
            posted_at: submitted_at,
        })?;

        self.broker
            .dispatch(BrokerDispatch::from_submission(application_id, &submission))?;

        Ok(stored)
    }

    /// Relay a support-tab message to the broker desk.
    pub fn support_request(
        &self,
        id: &SessionId,
        message: &str,
    ) -> Result<(), IntakeServiceError> {
        let phone = self.with_session(id, |session| {
            if session.is_authenticated() {
                Ok(session.phone().as_str().to_string())
            } else {
                Err(SessionError::NotAuthenticated)
            }
        })?;

        let message = message.trim();
        if message.is_empty() {
            return Err(IntakeServiceError::EmptySupportMessage);
        }

        self.broker.relay_support(SupportRequest {
            phone,
            message: message.to_string(),
        })?;
        Ok(())
    }

    pub fn wizard_state(&self, id: &SessionId) -> Result<WizardStateView, IntakeServiceError> {
        self.with_session(id, |session| {
            Ok(WizardStateView {
                step: session.step(),
                step_index: session.step().index(),
                authenticated: session.is_authenticated(),
                passport_files: session.staged_count(DocumentKind::Passport),
                snils_files: session.staged_count(DocumentKind::Snils),
                certificate_files: session.staged_count(DocumentKind::BirthCertificate),
                disclosure: session.disclosure(),
                submit_ready: session.submit_ready(),
            })
        })
    }

    /// History tab: applications most-recent-first with display strings.
    pub fn history(&self) -> Result<Vec<ApplicationHistoryEntry>, IntakeServiceError> {
        let applications = self.repository.list()?;
        Ok(applications
            .iter()
            .map(Application::history_entry)
            .collect())
    }

    /// Archive tab: document bundles flattened across all applications.
    pub fn archive(&self) -> Result<Vec<ArchiveEntry>, IntakeServiceError> {
        let applications = self.repository.list()?;
        Ok(applications
            .iter()
            .flat_map(|application| application.documents.iter())
            .map(Document::archive_entry)
            .collect())
    }

    pub fn notifications(&self, limit: usize) -> Result<Vec<Notification>, IntakeServiceError> {
        Ok(self.notifications.recent(limit)?)
    }

    pub fn support_contact(&self) -> &SupportContact {
        &self.support
    }

    fn with_session<T>(
        &self,
        id: &SessionId,
        action: impl FnOnce(&mut IntakeSession) -> Result<T, SessionError>,
    ) -> Result<T, IntakeServiceError> {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let session = sessions
            .get_mut(id)
            .ok_or(IntakeServiceError::UnknownSession)?;
        action(session).map_err(IntakeServiceError::from)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("unknown intake session")]
    UnknownSession,
    #[error("support message is empty")]
    EmptySupportMessage,
}
