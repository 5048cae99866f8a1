use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_intake::workflows::intake::{
    Application, ApplicationId, ApplicationRepository, BrokerDispatch, BrokerGateway,
    DispatchError, IntakeLimits, Notification, NotificationError, NotificationLog,
    RepositoryError, SupportRequest,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Applications live in a most-recent-first vector; nothing survives a
/// restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<Vec<Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog for InMemoryNotificationLog {
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

/// Gateway that logs what a production relay would hand to the broker desk.
/// Dispatches are also retained so the demo can print them.
#[derive(Default, Clone)]
pub(crate) struct LoggingBrokerGateway {
    dispatches: Arc<Mutex<Vec<BrokerDispatch>>>,
    support: Arc<Mutex<Vec<SupportRequest>>>,
}

impl LoggingBrokerGateway {
    pub(crate) fn dispatches(&self) -> Vec<BrokerDispatch> {
        self.dispatches.lock().expect("broker mutex poisoned").clone()
    }

    pub(crate) fn support_requests(&self) -> Vec<SupportRequest> {
        self.support.lock().expect("broker mutex poisoned").clone()
    }
}

impl BrokerGateway for LoggingBrokerGateway {
    fn dispatch(&self, dispatch: BrokerDispatch) -> Result<(), DispatchError> {
        info!(application_id = %dispatch.application_id.0, "broker dispatch prepared");
        self.dispatches
            .lock()
            .expect("broker mutex poisoned")
            .push(dispatch);
        Ok(())
    }

    fn relay_support(&self, request: SupportRequest) -> Result<(), DispatchError> {
        info!(phone = %request.phone, "support request relayed");
        self.support
            .lock()
            .expect("broker mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(crate) fn default_intake_limits() -> IntakeLimits {
    IntakeLimits::default()
}
