//! Demo credential gate.
//!
//! The dashboard accepts exactly one email/password pair. Both halves are
//! compared as SHA-256 digests with a constant-time equality so the check
//! takes the same path whichever half is wrong.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CoreError;

pub const DEMO_EMAIL: &str = "demo@blackfangintel.com";
pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Clone)]
pub struct Credentials {
    email_digest: [u8; 32],
    password_digest: [u8; 32],
}

impl Credentials {
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email_digest: digest(email),
            password_digest: digest(password),
        }
    }

    /// The fixed demo pair.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(DEMO_EMAIL, DEMO_PASSWORD)
    }

    /// Check a login attempt.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AuthenticationFailed`] unless both the email and
    /// the password match exactly.
    pub fn verify(&self, email: &str, password: &str) -> Result<(), CoreError> {
        let email_ok = self.email_digest[..].ct_eq(&digest(email)[..]);
        let password_ok = self.password_digest[..].ct_eq(&digest(password)[..]);
        if bool::from(email_ok & password_ok) {
            Ok(())
        } else {
            Err(CoreError::AuthenticationFailed)
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email_digest", &"[redacted]")
            .field("password_digest", &"[redacted]")
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(value.as_bytes()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_pair_verifies() {
        assert!(Credentials::demo().verify(DEMO_EMAIL, DEMO_PASSWORD).is_ok());
    }

    #[test]
    fn wrong_password_fails() {
        let err = Credentials::demo().verify(DEMO_EMAIL, "nope").unwrap_err();
        assert_eq!(err, CoreError::AuthenticationFailed);
    }

    #[test]
    fn wrong_email_fails_with_same_error() {
        let err = Credentials::demo()
            .verify("someone@else.com", DEMO_PASSWORD)
            .unwrap_err();
        assert_eq!(err, CoreError::AuthenticationFailed);
    }

    #[test]
    fn comparison_is_exact() {
        let creds = Credentials::demo();
        assert!(creds.verify(" demo@blackfangintel.com", DEMO_PASSWORD).is_err());
        assert!(creds.verify("DEMO@blackfangintel.com", DEMO_PASSWORD).is_err());
        assert!(creds.verify("", "").is_err());
    }

    #[test]
    fn debug_output_is_redacted() {
        let rendered = format!("{:?}", Credentials::demo());
        assert!(!rendered.contains("demo123"));
        assert!(rendered.contains("[redacted]"));
    }
}
