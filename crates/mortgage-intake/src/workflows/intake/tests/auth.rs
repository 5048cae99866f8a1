use super::common::*;
use crate::workflows::intake::auth::{AuthError, PhoneNumber, SmsChallenge, SmsCode};
use crate::workflows::intake::session::{IntakeSession, SessionError};

#[test]
fn short_phone_is_rejected() {
    match PhoneNumber::parse("+7 (912) 345") {
        Err(AuthError::PhoneTooShort { required, found }) => {
            assert_eq!(required, 10);
            assert_eq!(found, 7);
        }
        other => panic!("expected short-phone rejection, got {other:?}"),
    }
}

#[test]
fn formatted_phone_passes_the_digit_gate() {
    let phone = PhoneNumber::parse(TEST_PHONE).expect("ten digits present");
    assert_eq!(phone.as_str(), TEST_PHONE);

    PhoneNumber::parse("79123456789").expect("bare digits accepted");
}

#[test]
fn generated_code_is_always_four_digits() {
    for _ in 0..64 {
        let code = SmsCode::generate();
        assert_eq!(code.as_str().len(), 4);
        assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn verification_requires_exact_match() {
    let challenge =
        SmsChallenge::with_code(TEST_PHONE, SmsCode::fixed("0042")).expect("valid phone");

    assert_eq!(challenge.verify("0042"), Ok(()));
    assert_eq!(challenge.verify(" 0042 "), Ok(()), "entered code is trimmed");
    assert_eq!(challenge.verify("0043"), Err(AuthError::CodeMismatch));
    assert_eq!(challenge.verify("42"), Err(AuthError::CodeMismatch));
}

#[test]
fn session_opens_unauthenticated_and_verifies_once() {
    let mut session =
        IntakeSession::open_with_code(TEST_PHONE, SmsCode::fixed(TEST_CODE), limits())
            .expect("valid phone");

    assert!(!session.is_authenticated());
    assert_eq!(
        session.sms_code().map(|code| code.as_str().to_string()),
        Some(TEST_CODE.to_string()),
        "issued code is surfaced for display"
    );

    assert_eq!(
        session.verify("9999"),
        Err(SessionError::Auth(AuthError::CodeMismatch))
    );
    assert!(!session.is_authenticated());

    session.verify(TEST_CODE).expect("code matches");
    assert!(session.is_authenticated());
    assert!(session.sms_code().is_none(), "code retires after verification");

    // Re-verifying an authenticated session is a no-op.
    session.verify("anything").expect("idempotent");
}

#[test]
fn wizard_is_gated_behind_verification() {
    let mut session =
        IntakeSession::open_with_code(TEST_PHONE, SmsCode::fixed(TEST_CODE), limits())
            .expect("valid phone");

    assert_eq!(session.begin(), Err(SessionError::NotAuthenticated));
    assert_eq!(
        session.stage(
            crate::workflows::intake::domain::DocumentKind::Passport,
            staged_files("passport", 1)
        ),
        Err(SessionError::NotAuthenticated)
    );
}
