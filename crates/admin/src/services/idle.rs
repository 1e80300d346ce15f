//! Idle-session expiry.
//!
//! Bounds how long a signed-in session stays usable without activity,
//! independent of the session store's own TTL. The two layers cooperate:
//! the store expires rows on its schedule, while [`IdleTimeout`] is checked
//! explicitly before any restored session is trusted, so a stale session is
//! never silently resumed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::task::JoinHandle;

/// How long a session may sit idle before it is force-expired.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// Minimum interval between durable writes of the activity timestamp.
///
/// Activity between writes still counts; only persistence is delayed.
pub const ACTIVITY_PERSIST_INTERVAL: Duration = Duration::from_secs(30);

/// How often expired session rows are swept from the store.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Idle-timeout policy.
#[derive(Debug, Clone, Copy)]
pub struct IdleTimeout {
    threshold: Duration,
}

impl IdleTimeout {
    /// Create a policy with an explicit threshold.
    #[must_use]
    pub const fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    /// Whether a session last active at `last_activity` has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let idle = now.signed_duration_since(last_activity);
        idle.to_std().is_ok_and(|idle| idle > self.threshold)
    }
}

impl Default for IdleTimeout {
    fn default() -> Self {
        Self::new(IDLE_THRESHOLD)
    }
}

/// Whether the activity timestamp is due for another durable write.
///
/// `last_persisted = None` means the session has never recorded activity and
/// must persist immediately.
#[must_use]
pub fn activity_write_due(last_persisted: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_persisted.is_none_or(|persisted| {
        now.signed_duration_since(persisted)
            .to_std()
            .is_ok_and(|since| since >= ACTIVITY_PERSIST_INTERVAL)
    })
}

/// Owned handle for the background sweep of expired session rows.
///
/// The task is aborted on [`shutdown`](Self::shutdown) or drop, so repeated
/// constructions (e.g., in tests) never leak timers.
#[derive(Debug)]
pub struct IdleSweeper {
    handle: JoinHandle<()>,
}

impl IdleSweeper {
    /// Start sweeping expired session rows every [`SWEEP_INTERVAL`].
    #[must_use]
    pub fn start(pool: PgPool) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match sqlx::query("DELETE FROM session WHERE expiry_date < now()")
                    .execute(&pool)
                    .await
                {
                    Ok(result) if result.rows_affected() > 0 => {
                        tracing::debug!(swept = result.rows_affected(), "expired sessions removed");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "expired session sweep failed"),
                }
            }
        });
        tracing::debug!(interval = ?SWEEP_INTERVAL, "idle session sweeper started");
        Self { handle }
    }

    /// Stop the sweep task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for IdleSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_expired_after_sixty_one_idle_minutes() {
        let now = Utc::now();
        let timeout = IdleTimeout::default();
        assert!(timeout.is_expired(now - TimeDelta::minutes(61), now));
    }

    #[test]
    fn test_not_expired_after_thirty_idle_minutes() {
        let now = Utc::now();
        let timeout = IdleTimeout::default();
        assert!(!timeout.is_expired(now - TimeDelta::minutes(30), now));
    }

    #[test]
    fn test_not_expired_at_exact_threshold() {
        let now = Utc::now();
        let timeout = IdleTimeout::default();
        assert!(!timeout.is_expired(now - TimeDelta::minutes(60), now));
    }

    #[test]
    fn test_future_last_activity_is_not_expired() {
        // Clock skew between writer and checker must not log anyone out.
        let now = Utc::now();
        let timeout = IdleTimeout::default();
        assert!(!timeout.is_expired(now + TimeDelta::minutes(5), now));
    }

    #[test]
    fn test_activity_write_due_when_never_persisted() {
        assert!(activity_write_due(None, Utc::now()));
    }

    #[test]
    fn test_activity_write_throttled_inside_interval() {
        let now = Utc::now();
        assert!(!activity_write_due(Some(now - TimeDelta::seconds(10)), now));
        assert!(activity_write_due(Some(now - TimeDelta::seconds(31)), now));
    }
}
