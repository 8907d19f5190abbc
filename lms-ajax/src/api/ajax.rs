//! `/api/ajax` handlers
//!
//! GET reads parameters from the query string, POST from the form body
//! merged over the query string. Both take the session id from the
//! configured cookie.

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap},
    routing::get,
    Json, Router,
};
use lms_common::api::session::session_id_from_cookies;
use serde_json::Value;
use std::collections::HashMap;

use crate::dispatch::{dispatch, AjaxParams};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/ajax
pub async fn ajax_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    handle(&state, &headers, AjaxParams(params)).await
}

/// POST /api/ajax (application/x-www-form-urlencoded)
///
/// Query-string parameters are also read; body values win on conflict.
pub async fn ajax_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(mut params): Query<HashMap<String, String>>,
    Form(body): Form<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    params.extend(body);
    handle(&state, &headers, AjaxParams(params)).await
}

async fn handle(state: &AppState, headers: &HeaderMap, params: AjaxParams) -> ApiResult<Json<Value>> {
    let session_id = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookies| session_id_from_cookies(cookies, &state.settings.session_cookie));

    let now = chrono::Utc::now().timestamp();
    let body = dispatch(state, session_id, &params, now).await?;
    Ok(Json(body))
}

/// Build ajax routes
pub fn ajax_routes() -> Router<AppState> {
    Router::new().route("/api/ajax", get(ajax_get).post(ajax_post))
}
