//! Request-side primitives shared by HTTP modules
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Database operations (via sqlx)
//! - Shared types
//!
//! The service wraps these with axum extractors.

pub mod params;
pub mod session;

pub use params::{
    clean_alphanum, optional_int, parse_int, required_alphanum, required_int, required_raw,
};
pub use session::{
    load_session, session_id_from_cookies, sesskey_matches, validate_session, SessionError,
    SessionRecord,
};
