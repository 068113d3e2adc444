//! Poll-driven completion rule shared by scan and implementation jobs.
//!
//! Jobs never complete on their own. The store calls [`resolve`] from its read
//! path with the current time; once the job is older than its threshold the
//! state flips to done and the result is materialized exactly once.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::models::JobState;

/// True once strictly more than `threshold` has passed since `created_at`.
/// A `now` earlier than `created_at` is never due.
pub fn is_due(created_at: DateTime<Utc>, threshold: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at)
        .to_std()
        .is_ok_and(|elapsed| elapsed > threshold)
}

/// Advance `state` if it is pending and due. Done states are returned as-is
/// and `materialize` is not called.
pub fn resolve<T>(
    state: JobState<T>,
    created_at: DateTime<Utc>,
    threshold: Duration,
    now: DateTime<Utc>,
    materialize: impl FnOnce() -> T,
) -> JobState<T> {
    match state {
        JobState::Pending if is_due(created_at, threshold, now) => JobState::Done(materialize()),
        other => other,
    }
}
