use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::SupportContact;
use crate::workflows::intake::auth::SmsCode;
use crate::workflows::intake::domain::{
    Application, ChildrenDisclosure, DocumentKind, SessionId, StagedFile,
};
use crate::workflows::intake::repository::{
    ApplicationRepository, BrokerDispatch, BrokerGateway, DispatchError, Notification,
    NotificationError, NotificationLog, RepositoryError, SupportRequest,
};
use crate::workflows::intake::router::intake_router;
use crate::workflows::intake::service::IntakeService;
use crate::workflows::intake::session::{IntakeLimits, IntakeSession};

pub(super) const TEST_PHONE: &str = "+7 (912) 345-67-89";
pub(super) const TEST_CODE: &str = "4321";

pub(super) fn staged_files(prefix: &str, count: usize) -> Vec<StagedFile> {
    (1..=count)
        .map(|n| StagedFile {
            name: format!("{prefix}-{n:02}.jpg"),
            size_bytes: 245_760,
            media_type: "image/jpeg".to_string(),
        })
        .collect()
}

pub(super) fn limits() -> IntakeLimits {
    IntakeLimits::default()
}

pub(super) fn support_contact() -> SupportContact {
    SupportContact {
        phone: "+7 (800) 555-35-35".to_string(),
        email: "support@intake.example".to_string(),
    }
}

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 15, 10, 30, 0)
        .single()
        .expect("valid timestamp")
}

/// Session that already passed the phone gate.
pub(super) fn verified_session() -> IntakeSession {
    let mut session =
        IntakeSession::open_with_code(TEST_PHONE, SmsCode::fixed(TEST_CODE), limits())
            .expect("valid phone");
    session.verify(TEST_CODE).expect("code matches");
    session
}

/// Session staged all the way to the details step (one child, certificates
/// included), details not yet entered.
pub(super) fn session_at_details() -> IntakeSession {
    let mut session = verified_session();
    session.begin().expect("wizard starts");
    session
        .stage(DocumentKind::Passport, staged_files("passport", 3))
        .expect("passport staged");
    session.advance().expect("to SNILS");
    session
        .stage(DocumentKind::Snils, staged_files("snils", 1))
        .expect("snils staged");
    session.advance().expect("to certificates");
    session
        .choose_disclosure(ChildrenDisclosure::OneChildUnderSeven)
        .expect("disclosure set");
    session
        .stage(DocumentKind::BirthCertificate, staged_files("cert", 2))
        .expect("certificates staged");
    session.advance().expect("to details");
    session
}

pub(super) type TestService = IntakeService<MemoryRepository, MemoryNotifications, MemoryBroker>;

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
    Arc<MemoryBroker>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let broker = Arc::new(MemoryBroker::default());
    let service = Arc::new(IntakeService::new(
        repository.clone(),
        notifications.clone(),
        broker.clone(),
        limits(),
        support_contact(),
    ));
    (service, repository, notifications, broker)
}

/// Open a session with a fixed code and verify it.
pub(super) fn open_verified<R, N, B>(service: &IntakeService<R, N, B>) -> SessionId
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    let opened = service
        .open_session_with_code(TEST_PHONE, SmsCode::fixed(TEST_CODE))
        .expect("session opens");
    service
        .verify_code(&opened.session_id, TEST_CODE)
        .expect("code matches");
    opened.session_id
}

/// Drive a verified session through staging up to the details step.
pub(super) fn walk_to_details<R, N, B>(service: &IntakeService<R, N, B>, id: &SessionId)
where
    R: ApplicationRepository + 'static,
    N: NotificationLog + 'static,
    B: BrokerGateway + 'static,
{
    service.begin_application(id).expect("wizard starts");
    service
        .stage_documents(id, DocumentKind::Passport, staged_files("passport", 3))
        .expect("passport staged");
    service.advance(id).expect("to SNILS");
    service
        .stage_documents(id, DocumentKind::Snils, staged_files("snils", 1))
        .expect("snils staged");
    service.advance(id).expect("to certificates");
    service
        .choose_disclosure(id, ChildrenDisclosure::OneChildUnderSeven)
        .expect("disclosure set");
    service
        .stage_documents(id, DocumentKind::BirthCertificate, staged_files("cert", 2))
        .expect("certificates staged");
    service.advance(id).expect("to details");
}

pub(super) fn intake_router_with_service(service: Arc<TestService>) -> axum::Router {
    intake_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<Vec<Application>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self) -> Vec<Application> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl ApplicationRepository for MemoryRepository {
    fn prepend(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(0, application.clone());
        Ok(application)
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn fetch(
        &self,
        id: &crate::workflows::intake::domain::ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn entries(&self) -> Vec<Notification> {
        self.entries.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationLog for MemoryNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.entries
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Notification>, NotificationError> {
        let guard = self.entries.lock().expect("notification mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryBroker {
    dispatches: Arc<Mutex<Vec<BrokerDispatch>>>,
    support: Arc<Mutex<Vec<SupportRequest>>>,
}

impl MemoryBroker {
    pub(super) fn dispatches(&self) -> Vec<BrokerDispatch> {
        self.dispatches.lock().expect("broker mutex poisoned").clone()
    }

    pub(super) fn support_requests(&self) -> Vec<SupportRequest> {
        self.support.lock().expect("broker mutex poisoned").clone()
    }
}

impl BrokerGateway for MemoryBroker {
    fn dispatch(&self, dispatch: BrokerDispatch) -> Result<(), DispatchError> {
        self.dispatches
            .lock()
            .expect("broker mutex poisoned")
            .push(dispatch);
        Ok(())
    }

    fn relay_support(&self, request: SupportRequest) -> Result<(), DispatchError> {
        self.support
            .lock()
            .expect("broker mutex poisoned")
            .push(request);
        Ok(())
    }
}

/// Repository that always fails, for adapter-error paths.
pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn prepend(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn fetch(
        &self,
        _id: &crate::workflows::intake::domain::ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}
