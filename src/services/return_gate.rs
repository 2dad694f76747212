//! Return authorization gate
//!
//! Compares the code a borrower types at the desk against one configured
//! value shared by every return. This slows down unattended returns; it is
//! not authentication and must not be relied on as such.

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ReturnAuthorizationGate {
    verification_token: String,
}

impl ReturnAuthorizationGate {
    pub fn new(verification_token: impl Into<String>) -> Self {
        Self {
            verification_token: verification_token.into(),
        }
    }

    /// `true` iff the supplied token matches the configured one exactly
    pub fn authorize(&self, supplied: &str) -> bool {
        // An empty configured token never matches.
        !self.verification_token.is_empty() && supplied == self.verification_token
    }

    /// Fail closed with `AuthorizationFailed` on any mismatch
    pub fn require(&self, supplied: &str) -> AppResult<()> {
        if self.authorize(supplied) {
            Ok(())
        } else {
            Err(AppError::AuthorizationFailed)
        }
    }
}

impl std::fmt::Debug for ReturnAuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReturnAuthorizationGate").finish_non_exhaustive()
    }
}
