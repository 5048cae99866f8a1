use super::common::*;
use crate::workflows::intake::domain::{ChildrenDisclosure, DocumentKind};
use crate::workflows::intake::session::{SessionError, WizardStep};

#[test]
fn steps_are_ordered_dashboard_to_details() {
    let ordered = WizardStep::ordered();
    assert_eq!(ordered.len(), 5);
    for (expected, step) in ordered.into_iter().enumerate() {
        assert_eq!(step.index() as usize, expected);
    }
}

#[test]
fn begin_enters_the_wizard_and_resumes_in_place() {
    let mut session = verified_session();
    assert_eq!(session.step(), WizardStep::Dashboard);

    assert_eq!(session.begin(), Ok(WizardStep::Passport));

    // Re-entering mid-wizard keeps the current position.
    session
        .stage(DocumentKind::Passport, staged_files("passport", 2))
        .expect("passport staged");
    session.advance().expect("to SNILS");
    assert_eq!(session.begin(), Ok(WizardStep::Snils));
}

#[test]
fn each_step_blocks_until_its_requirement_is_met() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");

    match session.advance() {
        Err(SessionError::StepIncomplete { step, missing }) => {
            assert_eq!(step, "passport upload");
            assert_eq!(missing, "passport photos required");
        }
        other => panic!("expected incomplete passport step, got {other:?}"),
    }

    session
        .stage(DocumentKind::Passport, staged_files("passport", 3))
        .expect("passport staged");
    assert_eq!(session.advance(), Ok(WizardStep::Snils));

    assert!(matches!(
        session.advance(),
        Err(SessionError::StepIncomplete { .. })
    ));
    session
        .stage(DocumentKind::Snils, staged_files("snils", 1))
        .expect("snils staged");
    assert_eq!(session.advance(), Ok(WizardStep::Certificates));

    // The branch step first needs a disclosure choice.
    match session.advance() {
        Err(SessionError::StepIncomplete { missing, .. }) => {
            assert_eq!(missing, "children disclosure required");
        }
        other => panic!("expected disclosure requirement, got {other:?}"),
    }
}

#[test]
fn passport_ceiling_rejects_and_keeps_previous_selection() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");
    session
        .stage(DocumentKind::Passport, staged_files("passport", 3))
        .expect("passport staged");

    match session.stage(DocumentKind::Passport, staged_files("passport", 21)) {
        Err(SessionError::FileLimitExceeded {
            kind,
            limit,
            offered,
        }) => {
            assert_eq!(kind, DocumentKind::Passport);
            assert_eq!(limit, 20);
            assert_eq!(offered, 21);
        }
        other => panic!("expected ceiling rejection, got {other:?}"),
    }
    assert_eq!(
        session.staged_count(DocumentKind::Passport),
        3,
        "rejected selection leaves the previous one unchanged"
    );

    // A fresh in-limit selection replaces, not appends.
    session
        .stage(DocumentKind::Passport, staged_files("retake", 5))
        .expect("replacement staged");
    assert_eq!(session.staged_count(DocumentKind::Passport), 5);
}

#[test]
fn snils_accepts_a_single_file() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");

    assert!(matches!(
        session.stage(DocumentKind::Snils, staged_files("snils", 2)),
        Err(SessionError::FileLimitExceeded { limit: 1, .. })
    ));
    session
        .stage(DocumentKind::Snils, staged_files("snils", 1))
        .expect("single file accepted");
}

#[test]
fn empty_selection_is_rejected() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");
    assert_eq!(
        session.stage(DocumentKind::Passport, Vec::new()),
        Err(SessionError::NoFilesSelected)
    );
}

#[test]
fn certificate_ceiling_follows_the_disclosure() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");

    assert_eq!(
        session.stage(DocumentKind::BirthCertificate, staged_files("cert", 2)),
        Err(SessionError::DisclosureRequired)
    );

    session
        .choose_disclosure(ChildrenDisclosure::OneChildUnderSeven)
        .expect("disclosure set");
    assert!(matches!(
        session.stage(DocumentKind::BirthCertificate, staged_files("cert", 3)),
        Err(SessionError::FileLimitExceeded { limit: 2, .. })
    ));
    session
        .stage(DocumentKind::BirthCertificate, staged_files("cert", 2))
        .expect("two certificates for one child");

    session
        .choose_disclosure(ChildrenDisclosure::TwoChildrenUnderEighteen)
        .expect("disclosure switched");
    session
        .stage(DocumentKind::BirthCertificate, staged_files("cert", 4))
        .expect("four certificates for two children");

    session
        .choose_disclosure(ChildrenDisclosure::NoChildren)
        .expect("disclosure switched");
    assert!(matches!(
        session.stage(DocumentKind::BirthCertificate, staged_files("cert", 1)),
        Err(SessionError::FileLimitExceeded { limit: 0, .. })
    ));
}

#[test]
fn switching_disclosure_clears_staged_certificates() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");
    session
        .choose_disclosure(ChildrenDisclosure::TwoChildrenUnderEighteen)
        .expect("disclosure set");
    session
        .stage(DocumentKind::BirthCertificate, staged_files("cert", 4))
        .expect("certificates staged");

    session
        .choose_disclosure(ChildrenDisclosure::NoChildren)
        .expect("disclosure switched");
    assert_eq!(session.staged_count(DocumentKind::BirthCertificate), 0);

    // Re-selecting the same choice is not a switch and keeps the files.
    session
        .choose_disclosure(ChildrenDisclosure::NoChildren)
        .expect("same choice again");
    assert_eq!(session.disclosure(), Some(ChildrenDisclosure::NoChildren));
}

#[test]
fn no_children_branch_skips_certificate_staging() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");
    session
        .stage(DocumentKind::Passport, staged_files("passport", 1))
        .expect("passport staged");
    session.advance().expect("to SNILS");
    session
        .stage(DocumentKind::Snils, staged_files("snils", 1))
        .expect("snils staged");
    session.advance().expect("to certificates");

    session
        .choose_disclosure(ChildrenDisclosure::NoChildren)
        .expect("disclosure set");
    assert_eq!(session.advance(), Ok(WizardStep::Details));
}

#[test]
fn retreat_walks_back_without_losing_staged_state() {
    let mut session = session_at_details();
    assert_eq!(session.retreat(), Ok(WizardStep::Certificates));
    assert_eq!(session.retreat(), Ok(WizardStep::Snils));
    assert_eq!(session.retreat(), Ok(WizardStep::Passport));
    assert_eq!(session.retreat(), Ok(WizardStep::Dashboard));
    assert_eq!(session.retreat(), Ok(WizardStep::Dashboard));

    assert_eq!(session.staged_count(DocumentKind::Passport), 3);
    assert_eq!(session.staged_count(DocumentKind::Snils), 1);
    assert_eq!(session.staged_count(DocumentKind::BirthCertificate), 2);
}

#[test]
fn submission_requires_inn_and_email() {
    let mut session = session_at_details();
    assert!(!session.submit_ready());
    assert!(matches!(
        session.finish(),
        Err(SessionError::StepIncomplete {
            missing: "INN and email required",
            ..
        })
    ));

    session.set_details("123456789012", "").expect("details set");
    assert!(!session.submit_ready(), "empty email keeps submit disabled");

    session
        .set_details("123456789012", "applicant@mail.example")
        .expect("details set");
    assert!(session.submit_ready());
}

#[test]
fn finish_drains_everything_and_returns_to_the_dashboard() {
    let mut session = session_at_details();
    session
        .set_details("  123456789012  ", " applicant@mail.example ")
        .expect("details set");

    let submission = session.finish().expect("wizard complete");
    assert_eq!(submission.phone, TEST_PHONE);
    assert_eq!(submission.details.inn, "123456789012", "details are trimmed");
    assert_eq!(submission.details.email, "applicant@mail.example");
    assert_eq!(
        submission.disclosure,
        ChildrenDisclosure::OneChildUnderSeven
    );
    assert_eq!(submission.passport.len(), 3);
    assert_eq!(submission.snils.len(), 1);
    assert_eq!(submission.certificates.len(), 2);

    assert_eq!(session.step(), WizardStep::Dashboard);
    assert_eq!(session.staged_count(DocumentKind::Passport), 0);
    assert_eq!(session.staged_count(DocumentKind::Snils), 0);
    assert_eq!(session.staged_count(DocumentKind::BirthCertificate), 0);
    assert_eq!(session.disclosure(), None);
    assert!(session.is_authenticated(), "the phone stays verified");
}

#[test]
fn the_final_step_only_concludes_by_submitting() {
    let mut session = session_at_details();
    session
        .set_details("123456789012", "applicant@mail.example")
        .expect("details set");
    assert_eq!(session.advance(), Err(SessionError::SubmissionRequired));
}

#[test]
fn finish_rejects_before_the_final_step() {
    let mut session = verified_session();
    session.begin().expect("wizard starts");
    assert!(matches!(
        session.finish(),
        Err(SessionError::StepIncomplete {
            missing: "final step not reached",
            ..
        })
    ));
}
