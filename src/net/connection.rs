//! Connection state and activity tracking.
//!
//! # Responsibilities
//! - Track connection state (Active → Draining → Closed)
//! - Generate unique connection IDs for tracing
//! - Track in-flight requests and last activity for the idle timeout

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Global atomic counter for connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state for lifecycle tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection is active and processing requests.
    Active,
    /// Keep-alive disabled; finishing in-flight requests before closing.
    Draining,
    /// Connection is closed.
    Closed,
}

/// Request activity on one connection.
///
/// A connection is idle once it has no in-flight request and nothing
/// started or finished for the idle timeout.
#[derive(Debug)]
pub struct ConnectionActivity {
    epoch: Instant,
    /// Milliseconds since `epoch` of the last request start or finish.
    last_active_ms: AtomicU64,
    in_flight: AtomicUsize,
}

impl ConnectionActivity {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_active_ms: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Record a request start. The returned guard records its end on drop.
    pub fn begin(self: &Arc<Self>) -> RequestGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.touch();
        RequestGuard {
            activity: Arc::clone(self),
        }
    }

    /// Number of requests currently being served.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Instant at which the connection becomes idle if nothing else happens.
    ///
    /// While a request is in flight this is at least one full timeout away.
    pub fn idle_deadline(&self, idle_timeout: Duration) -> Instant {
        let deadline =
            self.epoch + Duration::from_millis(self.last_active_ms.load(Ordering::SeqCst)) + idle_timeout;
        if self.in_flight() > 0 {
            deadline.max(Instant::now() + idle_timeout)
        } else {
            deadline
        }
    }

    pub fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.in_flight() == 0 && Instant::now() >= self.idle_deadline(idle_timeout)
    }

    fn touch(&self) {
        let elapsed = self.epoch.elapsed().as_millis() as u64;
        self.last_active_ms.fetch_max(elapsed, Ordering::SeqCst);
    }
}

impl Default for ConnectionActivity {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks one in-flight request.
/// Decrements the in-flight count when dropped.
#[derive(Debug)]
pub struct RequestGuard {
    activity: Arc<ConnectionActivity>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.activity.touch();
        self.activity.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
