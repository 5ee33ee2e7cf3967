//! Authentication infrastructure module
//!
//! JWT session tokens and the guard binding them to an anti-forgery token
//! and a client fingerprint.

mod jwt;
mod session;

pub use jwt::{parse_algorithm, JwtConfig, JwtService, SessionClaims, TokenIssuer};
pub use session::{
    csrf_digest, Fingerprint, Session, SessionBinding, SessionGuard, CSRF_HEADER,
};
