//! Mortgage document intake: the phone/SMS gate, the linear upload wizard,
//! and the dashboard reads that surface submitted applications.
//!
//! The wizard itself is a synchronous in-memory state machine
//! ([`IntakeSession`]); the service layer owns the session table and the
//! adapter traits, and the router exposes both over HTTP.

pub mod auth;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, PhoneNumber, SmsChallenge, SmsCode};
pub use domain::{
    Application, ApplicantDetails, ApplicationHistoryEntry, ApplicationId, ApplicationStatus,
    ArchiveEntry, ChildrenDisclosure, Document, DocumentBadge, DocumentId, DocumentKind,
    IntakeSubmission, SessionId, StagedFile,
};
pub use repository::{
    ApplicationRepository, AttachmentSummary, BrokerDispatch, BrokerGateway, DispatchError,
    Notification, NotificationError, NotificationKind, NotificationLog, RepositoryError,
    SupportRequest,
};
pub use router::intake_router;
pub use service::{
    IntakeService, IntakeServiceError, SessionOpened, StagedDocuments, WizardStateView,
};
pub use session::{IntakeLimits, IntakeSession, SessionError, WizardStep};
