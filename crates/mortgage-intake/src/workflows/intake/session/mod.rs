//! The upload wizard: a linear state machine walking one client from the
//! phone gate through document staging to final submission. All state is
//! in-memory and synchronous; the machine owns nothing but its own fields.

mod config;
mod rules;

pub use config::IntakeLimits;

use std::mem;

use serde::{Deserialize, Serialize};

use super::auth::{AuthError, PhoneNumber, SmsChallenge, SmsCode};
use super::domain::{ApplicantDetails, ChildrenDisclosure, DocumentKind, IntakeSubmission, StagedFile};

/// One screen in the linear document-collection sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Dashboard,
    Passport,
    Snils,
    Certificates,
    Details,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Dashboard,
            Self::Passport,
            Self::Snils,
            Self::Certificates,
            Self::Details,
        ]
    }

    pub const fn index(self) -> u8 {
        match self {
            Self::Dashboard => 0,
            Self::Passport => 1,
            Self::Snils => 2,
            Self::Certificates => 3,
            Self::Details => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Passport => "passport upload",
            Self::Snils => "SNILS upload",
            Self::Certificates => "birth certificates",
            Self::Details => "INN and email",
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Dashboard => Some(Self::Passport),
            Self::Passport => Some(Self::Snils),
            Self::Snils => Some(Self::Certificates),
            Self::Certificates => Some(Self::Details),
            Self::Details => None,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Dashboard | Self::Passport => Self::Dashboard,
            Self::Snils => Self::Passport,
            Self::Certificates => Self::Snils,
            Self::Details => Self::Certificates,
        }
    }
}

/// Rejections raised while driving the wizard. All of them are recoverable
/// UI-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("phone not verified yet")]
    NotAuthenticated,
    #[error("no files selected")]
    NoFilesSelected,
    #[error("children disclosure must be selected first")]
    DisclosureRequired,
    #[error("{} accepts at most {limit} file(s), got {offered}", .kind.label())]
    FileLimitExceeded {
        kind: DocumentKind,
        limit: usize,
        offered: usize,
    },
    #[error("cannot leave step '{step}': {missing}")]
    StepIncomplete {
        step: &'static str,
        missing: &'static str,
    },
    #[error("the final step concludes by submitting the application")]
    SubmissionRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AuthState {
    AwaitingCode(SmsChallenge),
    Verified(PhoneNumber),
}

/// Per-client wizard state. Created by issuing an SMS challenge; everything
/// else is gated behind a successful verification.
#[derive(Debug, Clone)]
pub struct IntakeSession {
    auth: AuthState,
    limits: IntakeLimits,
    step: WizardStep,
    passport: Vec<StagedFile>,
    snils: Vec<StagedFile>,
    certificates: Vec<StagedFile>,
    disclosure: Option<ChildrenDisclosure>,
    inn: String,
    email: String,
}

impl IntakeSession {
    /// Open a session by issuing a fresh SMS challenge for `raw_phone`.
    pub fn open(raw_phone: &str, limits: IntakeLimits) -> Result<Self, AuthError> {
        let challenge = SmsChallenge::issue(raw_phone)?;
        Ok(Self::from_challenge(challenge, limits))
    }

    /// Open a session with a caller-chosen code, for deterministic flows.
    pub fn open_with_code(
        raw_phone: &str,
        code: SmsCode,
        limits: IntakeLimits,
    ) -> Result<Self, AuthError> {
        let challenge = SmsChallenge::with_code(raw_phone, code)?;
        Ok(Self::from_challenge(challenge, limits))
    }

    fn from_challenge(challenge: SmsChallenge, limits: IntakeLimits) -> Self {
        Self {
            auth: AuthState::AwaitingCode(challenge),
            limits,
            step: WizardStep::Dashboard,
            passport: Vec::new(),
            snils: Vec::new(),
            certificates: Vec::new(),
            disclosure: None,
            inn: String::new(),
            email: String::new(),
        }
    }

    /// The issued code, available while verification is still pending. The
    /// caller is responsible for showing it to the user.
    pub fn sms_code(&self) -> Option<&SmsCode> {
        match &self.auth {
            AuthState::AwaitingCode(challenge) => Some(challenge.code()),
            AuthState::Verified(_) => None,
        }
    }

    pub fn phone(&self) -> &PhoneNumber {
        match &self.auth {
            AuthState::AwaitingCode(challenge) => challenge.phone(),
            AuthState::Verified(phone) => phone,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Verified(_))
    }

    /// Compare the entered code against the issued one; idempotent once
    /// verified.
    pub fn verify(&mut self, entered: &str) -> Result<(), SessionError> {
        match &self.auth {
            AuthState::Verified(_) => Ok(()),
            AuthState::AwaitingCode(challenge) => {
                challenge.verify(entered)?;
                let phone = challenge.phone().clone();
                self.auth = AuthState::Verified(phone);
                Ok(())
            }
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    fn require_auth(&self) -> Result<(), SessionError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    /// Enter the wizard from the dashboard; resuming mid-wizard is a no-op.
    pub fn begin(&mut self) -> Result<WizardStep, SessionError> {
        self.require_auth()?;
        if self.step == WizardStep::Dashboard {
            self.step = WizardStep::Passport;
        }
        Ok(self.step)
    }

    /// Stage a selection for one category, replacing the previous selection.
    /// An over-ceiling selection is rejected wholesale and leaves the
    /// previous selection unchanged.
    pub fn stage(
        &mut self,
        kind: DocumentKind,
        files: Vec<StagedFile>,
    ) -> Result<usize, SessionError> {
        self.require_auth()?;
        rules::check_staging(kind, files.len(), self.disclosure, &self.limits)?;

        let staged = files.len();
        match kind {
            DocumentKind::Passport => self.passport = files,
            DocumentKind::Snils => self.snils = files,
            DocumentKind::BirthCertificate => self.certificates = files,
        }
        Ok(staged)
    }

    /// Select the children branch. Switching to a different choice clears
    /// any certificates staged under the previous one.
    pub fn choose_disclosure(&mut self, choice: ChildrenDisclosure) -> Result<(), SessionError> {
        self.require_auth()?;
        if self.disclosure != Some(choice) {
            self.certificates.clear();
        }
        self.disclosure = Some(choice);
        Ok(())
    }

    pub fn set_details(&mut self, inn: &str, email: &str) -> Result<(), SessionError> {
        self.require_auth()?;
        self.inn = inn.trim().to_string();
        self.email = email.trim().to_string();
        Ok(())
    }

    /// Move to the next step, provided the current step is complete.
    pub fn advance(&mut self) -> Result<WizardStep, SessionError> {
        self.require_auth()?;
        if let Some(missing) = rules::step_blocker(self.step, &self.snapshot()) {
            return Err(SessionError::StepIncomplete {
                step: self.step.label(),
                missing,
            });
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Ok(self.step)
            }
            None => Err(SessionError::SubmissionRequired),
        }
    }

    /// Move one step back. Never rejects and never loses staged state.
    pub fn retreat(&mut self) -> Result<WizardStep, SessionError> {
        self.require_auth()?;
        self.step = self.step.previous();
        Ok(self.step)
    }

    pub fn submit_ready(&self) -> bool {
        self.is_authenticated()
            && self.step == WizardStep::Details
            && rules::step_blocker(WizardStep::Details, &self.snapshot()).is_none()
    }

    /// Conclude the wizard: drain everything staged into an
    /// [`IntakeSubmission`] and reset the session to the dashboard. The
    /// authenticated phone survives the reset.
    pub fn finish(&mut self) -> Result<IntakeSubmission, SessionError> {
        self.require_auth()?;
        if self.step != WizardStep::Details {
            return Err(SessionError::StepIncomplete {
                step: self.step.label(),
                missing: "final step not reached",
            });
        }
        if let Some(missing) = rules::step_blocker(WizardStep::Details, &self.snapshot()) {
            return Err(SessionError::StepIncomplete {
                step: WizardStep::Details.label(),
                missing,
            });
        }
        let disclosure = self.disclosure.ok_or(SessionError::DisclosureRequired)?;

        let submission = IntakeSubmission {
            phone: self.phone().as_str().to_string(),
            details: ApplicantDetails {
                inn: mem::take(&mut self.inn),
                email: mem::take(&mut self.email),
            },
            disclosure,
            passport: mem::take(&mut self.passport),
            snils: mem::take(&mut self.snils),
            certificates: mem::take(&mut self.certificates),
        };
        self.disclosure = None;
        self.step = WizardStep::Dashboard;
        Ok(submission)
    }

    pub fn staged_count(&self, kind: DocumentKind) -> usize {
        match kind {
            DocumentKind::Passport => self.passport.len(),
            DocumentKind::Snils => self.snils.len(),
            DocumentKind::BirthCertificate => self.certificates.len(),
        }
    }

    pub fn disclosure(&self) -> Option<ChildrenDisclosure> {
        self.disclosure
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    fn snapshot(&self) -> rules::StepSnapshot {
        rules::StepSnapshot {
            passport_files: self.passport.len(),
            snils_files: self.snils.len(),
            certificate_files: self.certificates.len(),
            disclosure: self.disclosure,
            inn_present: !self.inn.is_empty(),
            email_present: !self.email.is_empty(),
        }
    }
}
