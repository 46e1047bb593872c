//! Debug session tracking
//!
//! A session spans one `initialized`..`terminated` pair of protocol events.
//! Output that arrives with no active session starts one on demand, so a raw
//! stream without lifecycle events still gets a stable session id.

use tracing::{debug, info};

/// Session identifier embedded in every record id
pub type SessionId = String;

#[derive(Debug, Default)]
pub struct SessionTracker {
    current: Option<SessionId>,
    started: u64,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Number of sessions started so far
    pub fn started(&self) -> u64 {
        self.started
    }

    /// Begin a new session, replacing any current one.
    pub fn start(&mut self, now_ms: i64) -> &str {
        self.started += 1;
        let id = format!("s{}{}", self.started, to_base36(now_ms.unsigned_abs()));
        info!("Debug session started: {}", id);
        self.current.insert(id)
    }

    /// End the current session, returning its id.
    pub fn end(&mut self) -> Option<SessionId> {
        let ended = self.current.take();
        if let Some(id) = &ended {
            info!("Debug session ended: {}", id);
        } else {
            debug!("Session end received with no active session");
        }
        ended
    }

    /// Current session id, starting one when none is active.
    ///
    /// The flag is `true` when a session was started by this call.
    pub fn ensure(&mut self, now_ms: i64) -> (SessionId, bool) {
        match &self.current {
            Some(id) => (id.clone(), false),
            None => (self.start(now_ms).to_string(), true),
        }
    }
}

fn to_base36(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        if let Some(c) = std::char::from_digit((n % 36) as u32, 36) {
            digits.push(c);
        }
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}
