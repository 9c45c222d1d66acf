//! Per-session request serialization.
//!
//! The session layer loads the session record when a request starts and
//! writes the whole record back after the handler returns. Two overlapping
//! requests from one visitor would each save their own copy, and the later
//! save would drop the earlier one's cart change. This middleware sits
//! outside the session layer and lets one request per session cookie run at
//! a time, from session load through session save.
//!
//! Requests without a session cookie start a fresh session each, so they
//! are not queued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

type SessionLock = Arc<tokio::sync::Mutex<()>>;

/// Registry of per-session locks, keyed by session cookie value.
///
/// Entries exist only while a request for that session is running or
/// waiting.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<HashMap<String, SessionLock>>>,
}

impl SessionLocks {
    /// Take a lease on the lock for `key`, creating it if needed.
    fn lease(&self, key: String) -> SessionLease {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        SessionLease {
            locks: self.clone(),
            key,
            lock,
        }
    }

    /// Number of sessions with a request in flight.
    #[must_use]
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// A request's claim on a session lock.
///
/// Dropping the last lease for a session removes its registry entry, even
/// when the request future is cancelled.
struct SessionLease {
    locks: SessionLocks,
    key: String,
    lock: SessionLock,
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: nobody else is waiting
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

/// The session cookie value, if the request carries one.
fn session_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Middleware that runs one request per session at a time.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = session_key(request.headers()) else {
        return next.run(request).await;
    };

    let lease = state.session_locks().lease(key);
    let _guard = Arc::clone(&lease.lock).lock_owned().await;

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_key_found_among_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; showroom_session=abc123; other=1"),
        );
        assert_eq!(session_key(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_key_missing() {
        let mut headers = HeaderMap::new();
        assert!(session_key(&headers).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_key(&headers).is_none());
    }

    #[test]
    fn test_lease_entries_are_removed_when_released() {
        let locks = SessionLocks::default();

        let first = locks.lease("abc".to_string());
        let second = locks.lease("abc".to_string());
        assert!(Arc::ptr_eq(&first.lock, &second.lock));
        assert_eq!(locks.active(), 1);

        drop(first);
        assert_eq!(locks.active(), 1);
        drop(second);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_same_session_is_serialized() {
        let locks = SessionLocks::default();

        let held = locks.lease("abc".to_string());
        let _guard = Arc::clone(&held.lock).lock_owned().await;

        let waiting = locks.lease("abc".to_string());
        assert!(waiting.lock.try_lock().is_err());

        let other = locks.lease("xyz".to_string());
        assert!(other.lock.try_lock().is_ok());
    }
}
