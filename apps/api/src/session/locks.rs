use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};
use tokio::sync::{Mutex as TurnLock, OwnedMutexGuard};
use tower_sessions::cookie::Cookie;

use super::SESSION_COOKIE_NAME;

type LockMap = HashMap<String, Arc<TurnLock<()>>>;

/// One lock per session cookie, so requests in the same session run one at a
/// time from state load through the session store write.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the session's turn. The lock entry is dropped again once no
    /// request holds or waits for it.
    pub async fn acquire(&self, key: &str) -> SessionTurn {
        let slot = Slot::claim(&self.locks, key);
        let guard = slot.lock.clone().lock_owned().await;
        SessionTurn {
            _guard: guard,
            _slot: slot,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Held for the duration of one request.
pub struct SessionTurn {
    // Field order matters: the guard releases before the slot cleans up.
    _guard: OwnedMutexGuard<()>,
    _slot: Slot,
}

struct Slot {
    key: String,
    locks: Arc<Mutex<LockMap>>,
    lock: Arc<TurnLock<()>>,
}

impl Slot {
    fn claim(locks: &Arc<Mutex<LockMap>>, key: &str) -> Self {
        let lock = locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_owned())
            .or_default()
            .clone();
        Self {
            key: key.to_owned(),
            locks: Arc::clone(locks),
            lock,
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this slot still refer to the lock.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_owned())
}

/// Serializes requests that carry the same session cookie. Requests without
/// one start a fresh session and run freely.
pub async fn serialize_per_session(
    State(locks): State<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = session_cookie(request.headers()) else {
        return next.run(request).await;
    };

    let _turn = locks.acquire(&key).await;
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE_NAME}=abc123")).unwrap(),
        );
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_session_cookie() {
        let mut headers = HeaderMap::new();
        assert!(session_cookie(&headers).is_none());
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_cookie(&headers).is_none());
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE_NAME}=")).unwrap(),
        );
        assert!(session_cookie(&headers).is_none());
    }

    #[tokio::test]
    async fn test_same_session_waits_for_turn() {
        let locks = SessionLocks::new();
        let first = locks.acquire("a").await;

        let waiting = tokio::time::timeout(Duration::from_millis(20), locks.acquire("a")).await;
        assert!(waiting.is_err());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire("a")).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_other_sessions_do_not_wait() {
        let locks = SessionLocks::new();
        let _first = locks.acquire("a").await;
        let other = tokio::time::timeout(Duration::from_millis(20), locks.acquire("b")).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_idle_locks_are_dropped() {
        let locks = SessionLocks::new();
        let turn = locks.acquire("a").await;
        assert_eq!(locks.len(), 1);
        drop(turn);
        assert_eq!(locks.len(), 0);
    }
}
