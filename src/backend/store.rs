use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::fixtures;
use super::models::{ImplementationJob, ImplementationView, JobState, ScanJob, ScanView};
use super::repo_key::extract_key;
use super::resolver::resolve;
use crate::errors::StoreError;

fn lock<T>(inner: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    inner.lock().map_err(|_| StoreError::LockPoisoned)
}

/// In-memory registry of scan jobs.
///
/// Cheap to clone; clones share the same map. The lock is held only for the
/// lookup and the resolve step, never across an await point.
#[derive(Clone)]
pub struct ScanStore {
    inner: Arc<Mutex<HashMap<String, ScanJob>>>,
    threshold: Duration,
}

impl ScanStore {
    pub fn new(threshold: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            threshold,
        }
    }

    pub fn create(&self, repository_url: &str, now: DateTime<Utc>) -> Result<ScanView, StoreError> {
        let job = ScanJob {
            id: uuid::Uuid::new_v4().to_string(),
            repository_url: repository_url.to_string(),
            repository_key: extract_key(repository_url),
            created_at: now,
            state: JobState::Pending,
        };
        info!(
            scan_id = %job.id,
            repository_key = %job.repository_key,
            "scan started"
        );
        let view = job.view();
        lock(&self.inner)?.insert(job.id.clone(), job);
        Ok(view)
    }

    /// Look up a scan, completing it first if its delay has elapsed.
    pub fn get(&self, id: &str, now: DateTime<Utc>) -> Result<ScanView, StoreError> {
        let mut scans = lock(&self.inner)?;
        let job = scans.get_mut(id).ok_or_else(|| StoreError::ScanNotFound {
            id: id.to_string(),
        })?;

        if job.state.is_pending() {
            let key = job.repository_key.clone();
            job.state = resolve(
                std::mem::take(&mut job.state),
                job.created_at,
                self.threshold,
                now,
                || fixtures::issues_for(&key).to_vec(),
            );
            if !job.state.is_pending() {
                debug!(scan_id = %id, repository_key = %key, "scan completed");
            }
        }
        Ok(job.view())
    }

    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(lock(&self.inner)?.contains_key(id))
    }
}

/// In-memory registry of implementation jobs.
///
/// Holds a handle to the scan store only to check that the referenced scan
/// exists at creation time; the scan's own state is irrelevant.
#[derive(Clone)]
pub struct ImplementationStore {
    inner: Arc<Mutex<HashMap<String, ImplementationJob>>>,
    scans: ScanStore,
    threshold: Duration,
}

impl ImplementationStore {
    pub fn new(scans: ScanStore, threshold: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            scans,
            threshold,
        }
    }

    pub fn create(
        &self,
        scan_id: &str,
        issue_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ImplementationView, StoreError> {
        if !self.scans.contains(scan_id)? {
            return Err(StoreError::ScanNotFound {
                id: scan_id.to_string(),
            });
        }

        let job = ImplementationJob {
            id: uuid::Uuid::new_v4().to_string(),
            scan_id: scan_id.to_string(),
            issue_id,
            created_at: now,
            state: JobState::Pending,
        };
        info!(
            implementation_id = %job.id,
            scan_id = %scan_id,
            issue_id,
            "implementation started"
        );
        let view = job.view();
        lock(&self.inner)?.insert(job.id.clone(), job);
        Ok(view)
    }

    /// Look up an implementation, completing it first if its delay has elapsed.
    pub fn get(&self, id: &str, now: DateTime<Utc>) -> Result<ImplementationView, StoreError> {
        let mut implementations = lock(&self.inner)?;
        let job = implementations
            .get_mut(id)
            .ok_or_else(|| StoreError::ImplementationNotFound { id: id.to_string() })?;

        if job.state.is_pending() {
            let issue_id = job.issue_id;
            job.state = resolve(
                std::mem::take(&mut job.state),
                job.created_at,
                self.threshold,
                now,
                || fixtures::pull_request_for(issue_id),
            );
            if let JobState::Done(pull_request) = &job.state {
                debug!(
                    implementation_id = %id,
                    issue_id,
                    has_pull_request = pull_request.is_some(),
                    "implementation completed"
                );
            }
        }
        Ok(job.view())
    }
}
