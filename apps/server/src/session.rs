//! Per-user session contexts and the request extractor that resolves them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::FromRequestParts, http::request::Parts};
use dashmap::DashMap;
use kamai_core::SessionContext;
use tokio::sync::Mutex;

use crate::{error::ApiError, main_lib::AppState};

pub const USER_HEADER: &str = "x-kamai-user";
pub const WORKER_NAME_HEADER: &str = "x-kamai-worker-name";

pub type SharedSession = Arc<Mutex<SessionContext>>;

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Keeps one session per user. Sessions idle for longer than the configured
/// timeout are dropped by [`SessionRegistry::evict_idle`].
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's session, creating it on first use.
    pub fn get_or_create(&self, user_id: &str) -> SharedSession {
        let now = Instant::now();
        let mut entry = self
            .sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Opening session for user {}", user_id);
                SessionEntry {
                    session: Arc::new(Mutex::new(SessionContext::new(user_id))),
                    last_seen: now,
                }
            });
        entry.last_seen = now;
        entry.session.clone()
    }

    /// Drops sessions not used since `cutoff`. Returns how many were removed.
    pub fn evict_unused_since(&self, cutoff: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_seen >= cutoff);
        before.saturating_sub(self.sessions.len())
    }

    /// Drops sessions idle for longer than `max_idle`.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        match Instant::now().checked_sub(max_idle) {
            Some(cutoff) => self.evict_unused_since(cutoff),
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// The calling user's session, identified by the user header.
pub struct UserSession(pub SharedSession);

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl FromRequestParts<Arc<AppState>> for UserSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_HEADER).ok_or_else(|| {
            ApiError::Unauthorized(format!("Missing {} header", USER_HEADER))
        })?;
        let session = state.sessions.get_or_create(user_id);

        if let Some(worker_name) = header_value(parts, WORKER_NAME_HEADER) {
            let mut context = session.lock().await;
            if context.worker_name != worker_name {
                context.worker_name = worker_name.to_string();
            }
        }

        Ok(UserSession(session))
    }
}
