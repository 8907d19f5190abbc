//! # lms-common
//!
//! Shared code for the lms-ajax workspace:
//! - Bootstrap configuration (TOML + defaults)
//! - Session and anti-forgery token validation
//! - Request parameter cleaning
//! - Host schema bootstrap and migrations

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
