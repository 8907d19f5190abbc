//! Precondition tests for /api/ajax
//!
//! Order: session + sesskey (403), parameters (400), course (404),
//! login + course access (401).

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use helpers::*;

async fn status_of(request: Request<Body>) -> (StatusCode, String) {
    let (status, body) = send(setup_app(setup_test_db().await), request).await;
    let code = body["error"]["code"].as_str().unwrap_or_default().to_string();
    (status, code)
}

// =============================================================================
// Anti-forgery (403)
// =============================================================================

#[tokio::test]
async fn test_missing_cookie_is_forbidden() {
    let request = Request::builder()
        .uri("/api/ajax?sesskey=sk-student&action=participation&id=1")
        .body(Body::empty())
        .unwrap();

    assert_eq!(
        status_of(request).await,
        (StatusCode::FORBIDDEN, "FORBIDDEN".to_string())
    );
}

#[tokio::test]
async fn test_wrong_cookie_name_is_forbidden() {
    let request = Request::builder()
        .uri("/api/ajax?sesskey=sk-student&action=participation&id=1")
        .header("cookie", "OTHER=sess-student")
        .body(Body::empty())
        .unwrap();

    assert_eq!(status_of(request).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_sesskey_is_forbidden() {
    let request = Request::builder()
        .uri("/api/ajax?action=participation&id=1")
        .header("cookie", format!("{}={}", COOKIE, STUDENT.0))
        .body(Body::empty())
        .unwrap();

    assert_eq!(status_of(request).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sesskey_of_another_session_is_forbidden() {
    let forged = (STUDENT.0, ADMIN.1);
    let (status, _) = status_of(ajax_get(forged, "action=participation&id=1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_session_is_forbidden() {
    let (status, _) = status_of(ajax_get(("nope", "sk-student"), "action=participation&id=1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_session_is_forbidden() {
    let (status, _) = status_of(ajax_get(EXPIRED, "action=participation&id=1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_post_reads_sesskey_from_query_string() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/ajax?sesskey=sk-student")
        .header("cookie", format!("{}={}", COOKIE, STUDENT.0))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("action=participation&id=1"))
        .unwrap();

    assert_eq!(status_of(request).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_post_body_sesskey_overrides_query_string() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/ajax?sesskey=sk-student&action=participation&id=1")
        .header("cookie", format!("{}={}", COOKIE, STUDENT.0))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("sesskey=wrong"))
        .unwrap();

    assert_eq!(status_of(request).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_post_without_sesskey_anywhere_is_forbidden() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/ajax?action=participation")
        .header("cookie", format!("{}={}", COOKIE, STUDENT.0))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("id=1"))
        .unwrap();

    assert_eq!(status_of(request).await.0, StatusCode::FORBIDDEN);
}

// =============================================================================
// Parameters (400)
// =============================================================================

#[tokio::test]
async fn test_missing_action_or_id_is_bad_request() {
    for query in ["id=1", "action=participation", "action=participation&id=", "action=participation&id=abc"] {
        let (status, code) = status_of(ajax_get(STUDENT, query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(code, "BAD_REQUEST");
    }
}

// =============================================================================
// Course (404)
// =============================================================================

#[tokio::test]
async fn test_unknown_course_is_not_found() {
    let (status, code) = status_of(ajax_get(STUDENT, "action=participation&id=999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code, "NOT_FOUND");
}

// =============================================================================
// Login and access (401)
// =============================================================================

#[tokio::test]
async fn test_anonymous_session_is_unauthorized() {
    let (status, code) = status_of(ajax_get(ANONYMOUS, "action=participation&id=1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_suspended_user_is_unauthorized() {
    let (status, _) = status_of(ajax_get(SUSPENDED, "action=participation&id=1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unenrolled_user_is_unauthorized() {
    let (status, _) = status_of(ajax_get(STRANGER, "action=participation&id=1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unenrolled_user_cannot_save_feedback() {
    let db = setup_test_db().await;

    let (status, _) = send(
        setup_app(db.clone()),
        ajax_get(STRANGER, "action=savefeedback&id=1&cmid=104&name=notes&value=x"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(stored_feedback(&db).await.is_empty());
}

#[tokio::test]
async fn test_guest_course_open_to_any_logged_in_user() {
    let (status, _) = status_of(ajax_get(STRANGER, "action=participation&id=2")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_action_still_requires_access() {
    let (status, _) = status_of(ajax_get(STRANGER, "action=whatever&id=1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_forgery_checked_before_parameters_and_course() {
    let forged = (STUDENT.0, "wrong");
    let (status, _) = status_of(ajax_get(forged, "action=participation&id=999")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = status_of(ajax_get(forged, "action=participation")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_course_checked_before_login() {
    let (status, _) = status_of(ajax_get(ANONYMOUS, "action=participation&id=999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_parameters_checked_before_course() {
    let (status, _) = status_of(ajax_get(STUDENT, "id=999")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
