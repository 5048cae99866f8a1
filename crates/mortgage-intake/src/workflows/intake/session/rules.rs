//! Gating predicates for the wizard: what staging is allowed, and what a
//! step still needs before "next" unlocks.

use super::super::domain::{ChildrenDisclosure, DocumentKind};
use super::config::IntakeLimits;
use super::{SessionError, WizardStep};

pub(crate) fn check_staging(
    kind: DocumentKind,
    offered: usize,
    disclosure: Option<ChildrenDisclosure>,
    limits: &IntakeLimits,
) -> Result<(), SessionError> {
    if offered == 0 {
        return Err(SessionError::NoFilesSelected);
    }

    if kind == DocumentKind::BirthCertificate && disclosure.is_none() {
        return Err(SessionError::DisclosureRequired);
    }

    let limit = limits.ceiling(kind, disclosure);
    if offered > limit {
        return Err(SessionError::FileLimitExceeded {
            kind,
            limit,
            offered,
        });
    }

    Ok(())
}

/// What keeps the current step from advancing, if anything.
pub(crate) struct StepSnapshot {
    pub(crate) passport_files: usize,
    pub(crate) snils_files: usize,
    pub(crate) certificate_files: usize,
    pub(crate) disclosure: Option<ChildrenDisclosure>,
    pub(crate) inn_present: bool,
    pub(crate) email_present: bool,
}

pub(crate) fn step_blocker(step: WizardStep, snapshot: &StepSnapshot) -> Option<&'static str> {
    match step {
        WizardStep::Dashboard => None,
        WizardStep::Passport => (snapshot.passport_files == 0).then_some("passport photos required"),
        WizardStep::Snils => (snapshot.snils_files == 0).then_some("SNILS photo required"),
        WizardStep::Certificates => match snapshot.disclosure {
            None => Some("children disclosure required"),
            Some(ChildrenDisclosure::NoChildren) => None,
            Some(_) => {
                (snapshot.certificate_files == 0).then_some("birth certificate photos required")
            }
        },
        WizardStep::Details => {
            (!snapshot.inn_present || !snapshot.email_present).then_some("INN and email required")
        }
    }
}
