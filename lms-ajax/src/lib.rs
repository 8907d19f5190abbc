//! lms-ajax library - course completion and questionnaire feedback endpoints
//!
//! The host application owns users, sessions, courses and the questionnaire
//! plugin. This crate answers completion queries against those tables and
//! writes a single feedback field into questionnaire responses.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod completion;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod host;
pub mod model;

use db::SqliteHost;
use dispatch::DispatchSettings;
use host::{CapabilityChecker, CompletionOracle, CourseRegistry, SessionValidator, SurveyStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionValidator>,
    pub courses: Arc<dyn CourseRegistry>,
    pub access: Arc<dyn CapabilityChecker>,
    pub completion: Arc<dyn CompletionOracle>,
    pub surveys: Arc<dyn SurveyStore>,
    pub settings: DispatchSettings,
}

impl AppState {
    /// State backed entirely by the host SQLite database
    pub fn new(db: SqlitePool, settings: DispatchSettings) -> Self {
        let host = Arc::new(SqliteHost::new(db));
        Self {
            sessions: host.clone(),
            courses: host.clone(),
            access: host.clone(),
            completion: host.clone(),
            surveys: host,
            settings,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ajax_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
