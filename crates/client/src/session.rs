//! Where the client keeps its credential between requests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

pub const SESSION_COOKIE: &str = "token";

/// Lifetime of the session cookie, independent of the token's own expiry.
pub const SESSION_TTL_DAYS: i64 = 1;

/// Storage for the active credential.
pub trait SessionStore: Send + Sync {
    /// The stored token, if present and not expired.
    fn token(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn token(&self) -> Option<String> {
        (**self).token()
    }

    fn save(&self, token: &str) {
        (**self).save(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// In-process cookie jar holding the session token for one day.
pub struct CookieSessionStore {
    cookie: Mutex<Option<Cookie>>,
    clock: Clock,
}

impl Default for CookieSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieSessionStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            cookie: Mutex::new(None),
            clock,
        }
    }

    pub fn cookie(&self) -> Option<Cookie> {
        self.cookie.lock().ok().and_then(|c| c.clone())
    }
}

impl core::fmt::Debug for CookieSessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CookieSessionStore")
            .field("name", &SESSION_COOKIE)
            .field("present", &self.cookie().is_some())
            .finish()
    }
}

impl SessionStore for CookieSessionStore {
    fn token(&self) -> Option<String> {
        let now = (self.clock)();
        let mut slot = self.cookie.lock().ok()?;

        let expired = match slot.as_ref() {
            Some(cookie) if now < cookie.expires_at => return Some(cookie.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            // Expired cookies are dropped on read, like a browser would.
            *slot = None;
        }
        None
    }

    fn save(&self, token: &str) {
        let expires_at = (self.clock)() + Duration::days(SESSION_TTL_DAYS);
        if let Ok(mut slot) = self.cookie.lock() {
            *slot = Some(Cookie {
                value: token.to_string(),
                expires_at,
            });
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.cookie.lock() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn fake_clock() -> (Arc<AtomicI64>, Clock) {
        let now = Arc::new(AtomicI64::new(
            Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap().timestamp(),
        ));
        let handle = now.clone();
        let clock: Clock = Arc::new(move || {
            DateTime::from_timestamp(handle.load(Ordering::SeqCst), 0).unwrap()
        });
        (now, clock)
    }

    #[test]
    fn token_lives_for_one_day() {
        let (now, clock) = fake_clock();
        let store = CookieSessionStore::with_clock(clock);
        store.save("abc");
        assert_eq!(store.token().as_deref(), Some("abc"));

        now.fetch_add(23 * 3600, Ordering::SeqCst);
        assert_eq!(store.token().as_deref(), Some("abc"));

        now.fetch_add(3600, Ordering::SeqCst);
        assert_eq!(store.token(), None);
        assert_eq!(store.cookie(), None);
    }

    #[test]
    fn clear_removes_token() {
        let store = CookieSessionStore::new();
        store.save("abc");
        store.clear();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn saving_again_restarts_the_day() {
        let (now, clock) = fake_clock();
        let store = CookieSessionStore::with_clock(clock);
        store.save("abc");
        now.fetch_add(12 * 3600, Ordering::SeqCst);
        store.save("def");

        let cookie = store.cookie().unwrap();
        assert_eq!(cookie.value, "def");
        assert_eq!(
            cookie.expires_at,
            Utc.with_ymd_and_hms(2026, 6, 2, 12, 0, 0).unwrap() + Duration::hours(12)
        );
    }
}
