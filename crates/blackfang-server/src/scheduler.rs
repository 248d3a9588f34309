//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! session housekeeping job.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::backend::Backend;

/// Every minute, on the minute.
const PRUNE_SESSIONS_CRON: &str = "0 * * * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    backend: Arc<RwLock<Backend>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_prune_sessions_job(&scheduler, backend).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Drop expired access and refresh tokens so the store does not grow
/// without bound.
async fn register_prune_sessions_job(
    scheduler: &JobScheduler,
    backend: Arc<RwLock<Backend>>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(PRUNE_SESSIONS_CRON, move |_uuid, _lock| {
        let backend = Arc::clone(&backend);

        Box::pin(async move {
            let removed = prune_sessions(&backend).await;
            if removed > 0 {
                tracing::info!(removed, "scheduler: pruned expired session tokens");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn prune_sessions(backend: &RwLock<Backend>) -> usize {
    backend.write().await.sessions.prune(Utc::now())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blackfang_core::Dataset;

    use super::*;
    use crate::sessions::SessionStore;

    #[tokio::test]
    async fn prune_sessions_drops_expired_tokens() {
        let backend = RwLock::new(Backend::new(
            Dataset::demo(),
            SessionStore::new(Duration::from_secs(60)),
        ));
        {
            let mut guard = backend.write().await;
            guard.sessions.issue(1, Utc::now() - chrono::Duration::hours(1));
            guard.sessions.issue(1, Utc::now());
        }

        assert_eq!(prune_sessions(&backend).await, 2);
        assert_eq!(backend.read().await.sessions.active(), 1);
    }
}
