//! Form sessions hosted by the node.
//!
//! Each browser client editing a profile owns one [`ProfileForm`] keyed by a
//! random session id. The registry is created with the node and dropped with
//! it; there is no process-wide session table.
//!
//! Sessions not written to within the idle TTL are evicted when a new session
//! is opened.

use nexa_profile::ProfileForm;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default cap on concurrently open form sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default idle time after which a session may be evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct Session {
    form: ProfileForm,
    last_touched: Instant,
}

/// Open form sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            max_sessions,
            idle_ttl,
        }
    }

    /// Open a new empty session. Returns `None` when the registry is full of
    /// live sessions.
    pub fn create(&mut self) -> Option<String> {
        self.create_at(Instant::now())
    }

    fn create_at(&mut self, now: Instant) -> Option<String> {
        self.evict_idle(now);
        if self.sessions.len() >= self.max_sessions {
            tracing::warn!(open = self.sessions.len(), "session limit reached");
            return None;
        }
        let id = loop {
            let candidate = format!("{:032x}", rand::random::<u128>());
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        self.sessions.insert(
            id.clone(),
            Session {
                form: ProfileForm::new(),
                last_touched: now,
            },
        );
        tracing::debug!(session = %id, "form session opened");
        Some(id)
    }

    /// Drop sessions idle for longer than the TTL. Returns how many went.
    fn evict_idle(&mut self, now: Instant) -> usize {
        let ttl = self.idle_ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.last_touched) <= ttl);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, open = self.sessions.len(), "evicted idle form sessions");
        }
        evicted
    }

    pub fn get(&self, id: &str) -> Option<&ProfileForm> {
        self.sessions.get(id).map(|s| &s.form)
    }

    /// Mutable access; counts as activity on the session.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProfileForm> {
        self.sessions.get_mut(id).map(|s| {
            s.last_touched = Instant::now();
            &mut s.form
        })
    }

    /// End a session. Returns false if it did not exist.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "form session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
