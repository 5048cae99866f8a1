use rand::Rng;
use serde::{Deserialize, Serialize};

/// Validation errors raised by the phone/SMS gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("phone number needs at least {required} digits, found {found}")]
    PhoneTooShort { required: usize, found: usize },
    #[error("verification code does not match")]
    CodeMismatch,
}

const PHONE_MIN_DIGITS: usize = 10;
const CODE_DIGITS: usize = 4;

/// A phone number that passed the minimum-length gate. Formatting characters
/// are kept as entered; only the digit count is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let trimmed = raw.trim();
        let found = trimmed.chars().filter(char::is_ascii_digit).count();
        if found < PHONE_MIN_DIGITS {
            return Err(AuthError::PhoneTooShort {
                required: PHONE_MIN_DIGITS,
                found,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Four-digit verification code, zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsCode(String);

impl SmsCode {
    pub fn generate() -> Self {
        let value = rand::rng().random_range(0..10_000u16);
        Self(format!("{value:0width$}", width = CODE_DIGITS))
    }

    /// Fixed code for deterministic flows (tests, demos).
    pub fn fixed(digits: &str) -> Self {
        debug_assert_eq!(digits.len(), CODE_DIGITS);
        Self(digits.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, entered: &str) -> bool {
        self.0 == entered.trim()
    }
}

/// A pending phone challenge: the code has been issued but not yet confirmed.
/// There is no delivery channel; callers surface the code to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsChallenge {
    phone: PhoneNumber,
    code: SmsCode,
}

impl SmsChallenge {
    pub fn issue(raw_phone: &str) -> Result<Self, AuthError> {
        let phone = PhoneNumber::parse(raw_phone)?;
        Ok(Self {
            phone,
            code: SmsCode::generate(),
        })
    }

    pub fn with_code(raw_phone: &str, code: SmsCode) -> Result<Self, AuthError> {
        let phone = PhoneNumber::parse(raw_phone)?;
        Ok(Self { phone, code })
    }

    pub fn verify(&self, entered: &str) -> Result<(), AuthError> {
        if self.code.matches(entered) {
            Ok(())
        } else {
            Err(AuthError::CodeMismatch)
        }
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn code(&self) -> &SmsCode {
        &self.code
    }
}
