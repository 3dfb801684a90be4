//! Authentication system.
//!
//! - [`current_user`]: extractor surfacing the authenticated user in handlers
//! - [`password`]: Argon2 password hashing and opaque token generation
//! - [`session`]: JWT access token creation and verification
//!
//! Clients authenticate with `Authorization: Bearer <access token>` obtained
//! from `POST /api/auth/login`. Access tokens are short-lived JWTs; long-lived
//! opaque refresh tokens are stored server-side and rotated on every use.

pub mod current_user;
pub mod password;
pub mod session;
