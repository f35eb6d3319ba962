//! Job worker: pops jobs off the queue and runs their bodies

use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::{Job, JobEnvelope, JobSource};
use crate::{
    error::AppResult,
    services::{notifications::NotificationService, overdue::OverdueService, today, Services},
};

/// Dispatches jobs to the services that implement them
#[derive(Clone)]
pub struct JobRunner {
    notifications: NotificationService,
    overdue: OverdueService,
}

impl JobRunner {
    pub fn new(services: &Services) -> Self {
        Self {
            notifications: services.notifications.clone(),
            overdue: services.overdue.clone(),
        }
    }

    /// Run one job body
    pub async fn execute(&self, job: &Job) -> AppResult<()> {
        match job {
            Job::SendLoanNotification { loan_id } => {
                self.notifications.send_loan_notification(*loan_id).await
            }
            Job::SendOverdueNotification {
                username,
                member_email,
                book_title,
            } => {
                self.notifications
                    .send_overdue_notification(username, member_email, book_title)
                    .await
            }
            Job::CheckOverdueLoans => {
                self.overdue.check_overdue_loans(today()).await;
                Ok(())
            }
        }
    }

    /// Run a dequeued job and log the outcome. Failed jobs are not retried.
    pub async fn run(&self, envelope: JobEnvelope) {
        let started = Instant::now();
        let name = envelope.job.name();
        tracing::debug!("Job {} ({}) started", envelope.id, name);

        match self.execute(&envelope.job).await {
            Ok(()) => tracing::info!(
                "Job {} ({}) succeeded in {:?}",
                envelope.id,
                name,
                started.elapsed()
            ),
            Err(e) => tracing::error!("Job {} ({}) failed: {}", envelope.id, name, e),
        }
    }
}

/// Consume jobs until `shutdown` flips to true.
///
/// Shutdown is only checked between polls, so a job already popped off the
/// queue always runs. The poll timeout bounds how long shutdown waits.
pub async fn run_worker(
    source: impl JobSource,
    runner: JobRunner,
    poll_timeout_seconds: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!("Job worker started (poll timeout: {}s)", poll_timeout_seconds);

    while !*shutdown.borrow() {
        match source.dequeue(poll_timeout_seconds).await {
            Ok(Some(envelope)) => runner.run(envelope).await,
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Job queue error, backing off: {}", e);
                let backoff = Duration::from_secs(poll_timeout_seconds.max(1));
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }
    }

    tracing::info!("Job worker stopped cleanly");
}
