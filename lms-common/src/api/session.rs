//! Session lookup and anti-forgery (sesskey) validation
//!
//! # Architecture
//!
//! - The host issues a session id cookie and stores `(sid, userid, sesskey)`
//!   in its `sessions` table
//! - Every request must echo the session's sesskey as a parameter
//! - Sessions idle for longer than the configured timeout are rejected
//! - A session with `userid = 0` is a valid anonymous session: it passes the
//!   sesskey check but fails the later login check

use sqlx::SqlitePool;

// ========================================
// Types
// ========================================

/// One row of the host `sessions` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    pub sid: String,
    pub userid: i64,
    pub sesskey: String,
    pub timemodified: i64,
}

impl SessionRecord {
    /// True when the session belongs to a real user
    pub fn is_logged_in(&self) -> bool {
        self.userid > 0
    }
}

/// Session validation failures
///
/// All variants map to a 403 at the HTTP layer except `DatabaseError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No session cookie on the request
    MissingSession,

    /// Cookie names a session the host does not know
    UnknownSession,

    /// Session idle for longer than the timeout
    Expired { idle_secs: i64 },

    /// Request carried no sesskey parameter
    MissingSesskey,

    /// Request sesskey does not match the session's
    InvalidSesskey,

    /// Database error loading the session
    DatabaseError(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::MissingSession => write!(f, "No session cookie"),
            SessionError::UnknownSession => write!(f, "Unknown session"),
            SessionError::Expired { idle_secs } => {
                write!(f, "Session expired ({}s idle)", idle_secs)
            }
            SessionError::MissingSesskey => write!(f, "Missing sesskey parameter"),
            SessionError::InvalidSesskey => write!(f, "Invalid sesskey"),
            SessionError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for SessionError {}

// ========================================
// Cookie Parsing
// ========================================

/// Extract a named cookie value from a `Cookie` header
///
/// # Examples
///
/// ```
/// use lms_common::api::session::session_id_from_cookies;
///
/// let header = "theme=dark; LMSSESSION=abc123; other=1";
/// assert_eq!(session_id_from_cookies(header, "LMSSESSION"), Some("abc123"));
/// assert_eq!(session_id_from_cookies(header, "missing"), None);
/// ```
pub fn session_id_from_cookies<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

// ========================================
// Sesskey Validation
// ========================================

/// Compare sesskeys without short-circuiting on the first differing byte
pub fn sesskey_matches(provided: &str, expected: &str) -> bool {
    let a = provided.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() || b.is_empty() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Validate a loaded session against the request sesskey
///
/// `now` and `timemodified` are Unix seconds.
pub fn validate_session(
    record: Option<SessionRecord>,
    sesskey: Option<&str>,
    now: i64,
    timeout_secs: i64,
) -> Result<SessionRecord, SessionError> {
    let record = record.ok_or(SessionError::UnknownSession)?;

    let idle_secs = now.saturating_sub(record.timemodified);
    if idle_secs > timeout_secs {
        return Err(SessionError::Expired { idle_secs });
    }

    let provided = sesskey.ok_or(SessionError::MissingSesskey)?;
    if !sesskey_matches(provided, &record.sesskey) {
        return Err(SessionError::InvalidSesskey);
    }

    Ok(record)
}

/// Load a session row by id
pub async fn load_session(
    db: &SqlitePool,
    sid: &str,
) -> Result<Option<SessionRecord>, SessionError> {
    sqlx::query_as::<_, SessionRecord>(
        "SELECT sid, userid, sesskey, timemodified FROM sessions WHERE sid = ?",
    )
    .bind(sid)
    .fetch_optional(db)
    .await
    .map_err(|e| SessionError::DatabaseError(e.to_string()))
}
