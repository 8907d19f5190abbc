//! HTTP API handlers for lms-ajax

pub mod ajax;
pub mod health;

pub use ajax::ajax_routes;
pub use health::health_routes;
