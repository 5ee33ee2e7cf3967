//! Session binding: anti-forgery tokens and client fingerprints
//!
//! At login the server generates a random anti-forgery token and derives a
//! fingerprint from the client's identifying headers. Both are embedded in
//! the signed session token (the CSRF value only as a SHA-256 digest), so
//! every later request can be checked without server-side session state:
//!
//! - the `X-CSRF-Token` header must hash to the token's `csrf` claim,
//!   otherwise the request is `Forbidden`;
//! - the recomputed fingerprint must equal the `fgp` claim, otherwise the
//!   session is `Unauthorized`.

use axum::http::{HeaderMap, HeaderName};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;

use super::jwt::SessionClaims;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_session_rejection;

/// Header carrying the echoed anti-forgery token
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Number of random bytes in an anti-forgery token
const CSRF_TOKEN_BYTES: usize = 32;

/// Digest of identifying request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive a fingerprint from the given headers of a request.
    /// Absent headers contribute an empty value.
    pub fn derive(headers: &HeaderMap, names: &[HeaderName]) -> Self {
        let mut hasher = Sha256::new();

        for name in names {
            let value = headers
                .get(name)
                .map(|v| v.as_bytes())
                .unwrap_or_default();

            hasher.update(name.as_str().as_bytes());
            hasher.update(b":");
            hasher.update(value);
            hasher.update(b"\n");
        }

        Self(URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Wrap an already computed fingerprint
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Values established for a new session at login
#[derive(Debug, Clone)]
pub struct SessionBinding {
    csrf_token: String,
    fingerprint: Fingerprint,
}

impl SessionBinding {
    pub fn new(csrf_token: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            csrf_token: csrf_token.into(),
            fingerprint,
        }
    }

    /// Create a binding with a fresh random anti-forgery token
    pub fn generate(fingerprint: Fingerprint) -> Self {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        Self::new(URL_SAFE_NO_PAD.encode(bytes), fingerprint)
    }

    /// The plaintext anti-forgery token handed to the client
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Digest stored in the session token
    pub fn csrf_digest(&self) -> String {
        csrf_digest(&self.csrf_token)
    }
}

/// SHA-256 digest of an anti-forgery token, base64url encoded
pub fn csrf_digest(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// An authenticated session that passed the binding checks
///
/// Only the guard can construct one, so holding a `Session` proves the
/// token was valid and the fingerprint matched.
#[derive(Debug, Clone)]
pub struct Session {
    subject: String,
    csrf_verified: bool,
}

impl Session {
    fn from_claims(claims: &SessionClaims, csrf_verified: bool) -> Self {
        Self {
            subject: claims.sub.clone(),
            csrf_verified,
        }
    }

    /// Username the session belongs to
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Fail with `Forbidden` unless the CSRF check passed
    pub fn require_csrf(&self) -> Result<(), DomainError> {
        if self.csrf_verified {
            Ok(())
        } else {
            Err(DomainError::forbidden("CSRF token required"))
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(subject: &str, csrf_verified: bool) -> Self {
        Self {
            subject: subject.to_string(),
            csrf_verified,
        }
    }
}

/// Checks anti-forgery tokens and fingerprints against session claims
#[derive(Debug, Clone)]
pub struct SessionGuard {
    fingerprint_headers: Vec<HeaderName>,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(vec![axum::http::header::USER_AGENT])
    }
}

impl SessionGuard {
    pub fn new(fingerprint_headers: Vec<HeaderName>) -> Self {
        Self {
            fingerprint_headers,
        }
    }

    /// Build a guard from configured header names
    pub fn from_header_names(names: &[String]) -> Result<Self, DomainError> {
        if names.is_empty() {
            return Err(DomainError::configuration(
                "At least one fingerprint header is required",
            ));
        }

        let headers = names
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.trim().to_ascii_lowercase().as_bytes()).map_err(|_| {
                    DomainError::configuration(format!("Invalid fingerprint header: {}", name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(headers))
    }

    /// Fingerprint of the client sending `headers`
    pub fn fingerprint(&self, headers: &HeaderMap) -> Fingerprint {
        Fingerprint::derive(headers, &self.fingerprint_headers)
    }

    /// Establish the binding for a login request
    pub fn bind(&self, headers: &HeaderMap) -> SessionBinding {
        SessionBinding::generate(self.fingerprint(headers))
    }

    /// Reject the session if the client fingerprint drifted since login
    pub fn check_fingerprint(
        &self,
        claims: &SessionClaims,
        headers: &HeaderMap,
    ) -> Result<(), DomainError> {
        let current = self.fingerprint(headers);

        let matches = claims
            .fgp
            .as_deref()
            .is_some_and(|expected| constant_time_compare(expected, current.as_str()));

        if !matches {
            warn!(
                subject = %claims.sub,
                event = "session_fingerprint_mismatch",
                "Rejecting session: client fingerprint does not match login"
            );
            record_session_rejection("fingerprint");
            return Err(DomainError::unauthorized("Session is not valid for this client"));
        }

        Ok(())
    }

    /// Reject the request unless it echoes the session's anti-forgery token
    pub fn check_csrf(&self, claims: &SessionClaims, headers: &HeaderMap) -> Result<(), DomainError> {
        let presented = headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let Some(presented) = presented else {
            warn!(
                subject = %claims.sub,
                event = "csrf_missing",
                "Rejecting request: missing CSRF token header"
            );
            record_session_rejection("csrf");
            return Err(DomainError::forbidden("Missing CSRF token"));
        };

        let matches = claims
            .csrf
            .as_deref()
            .is_some_and(|expected| constant_time_compare(expected, &csrf_digest(presented)));

        if !matches {
            warn!(
                subject = %claims.sub,
                event = "csrf_mismatch",
                "Rejecting request: CSRF token does not match session"
            );
            record_session_rejection("csrf");
            return Err(DomainError::forbidden("Invalid CSRF token"));
        }

        Ok(())
    }

    /// Authorize a read: fingerprint must match
    pub fn authorize(&self, claims: &SessionClaims, headers: &HeaderMap) -> Result<Session, DomainError> {
        self.check_fingerprint(claims, headers)?;
        Ok(Session::from_claims(claims, false))
    }

    /// Authorize a state-changing request: fingerprint, then CSRF
    pub fn authorize_mutation(
        &self,
        claims: &SessionClaims,
        headers: &HeaderMap,
    ) -> Result<Session, DomainError> {
        self.check_fingerprint(claims, headers)?;
        self.check_csrf(claims, headers)?;
        Ok(Session::from_claims(claims, true))
    }
}

/// Compare digests without leaking the position of the first difference
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
