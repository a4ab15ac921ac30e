//! Unit tests for domain error types

use super::*;

#[test]
fn test_rejections_collapse_for_callers() {
    assert_eq!(TokenError::from(TokenRejection::Expired), TokenError::Expired);
    assert_eq!(TokenError::from(TokenRejection::Malformed), TokenError::Invalid);
    assert_eq!(TokenError::from(TokenRejection::SignatureMismatch), TokenError::Invalid);
    assert_eq!(TokenError::from(TokenRejection::UnknownPurpose), TokenError::Invalid);
}

#[test]
fn test_error_codes() {
    assert_eq!(TokenError::Expired.code(), "EXPIRED_TOKEN");
    assert_eq!(TokenError::Invalid.code(), "INVALID_TOKEN");
    assert_eq!(
        VerificationError::DispatchTimedOut { timeout_ms: 10 }.code(),
        "DISPATCH_FAILED"
    );
}

#[test]
fn test_lockout_and_wrong_code_read_the_same() {
    assert_eq!(
        VerificationError::AttemptLimitExceeded.user_message(),
        VerificationError::NoActiveChallenge.user_message()
    );
}

#[test]
fn test_domain_error_wraps_verification_error() {
    let error: DomainError = VerificationError::DispatchFailed {
        reason: "relay down".to_string(),
    }
    .into();
    assert!(error.to_string().contains("relay down"));
    assert!(matches!(
        error,
        DomainError::Verification(VerificationError::DispatchFailed { .. })
    ));
}
