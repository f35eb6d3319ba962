//! Periodic scheduling of the overdue sweep

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::{Job, JobQueue};
use crate::error::AppResult;

/// When each scheduled task was last enqueued, kept across restarts
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduleState: Send + Sync {
    async fn last_run(&self, task: &str) -> AppResult<Option<DateTime<Utc>>>;
    async fn record_run(&self, task: &str, at: DateTime<Utc>) -> AppResult<()>;
}

/// Time until the next run. A task that never ran, or whose last run is a
/// full period old, is due now.
pub fn first_delay(last_run: Option<DateTime<Utc>>, now: DateTime<Utc>, period: Duration) -> Duration {
    match last_run {
        None => Duration::ZERO,
        Some(at) => {
            let elapsed = (now - at).to_std().unwrap_or(Duration::ZERO);
            period.saturating_sub(elapsed)
        }
    }
}

/// Enqueue the overdue sweep every `interval_hours` until `shutdown` flips.
///
/// The schedule resumes from the last recorded run, so restarts neither skip
/// nor repeat a sweep.
pub async fn run_overdue_schedule(
    queue: Arc<dyn JobQueue>,
    state: Arc<dyn ScheduleState>,
    interval_hours: u64,
    shutdown: watch::Receiver<bool>,
) {
    let period = Duration::from_secs(interval_hours.max(1) * 3600);
    run_schedule(queue, state, period, shutdown).await;
}

async fn run_schedule(
    queue: Arc<dyn JobQueue>,
    state: Arc<dyn ScheduleState>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let task = Job::CheckOverdueLoans.name();

    let delay = match state.last_run(task).await {
        Ok(last_run) => first_delay(last_run, Utc::now(), period),
        Err(e) => {
            tracing::error!("Failed to read last run of {}: {}", task, e);
            period
        }
    };

    let mut interval = time::interval_at(Instant::now() + delay, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("Overdue sweep scheduled every {:?}, next in {:?}", period, delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match queue.enqueue(Job::CheckOverdueLoans).await {
                    Ok(()) => {
                        tracing::info!("Overdue sweep enqueued");
                        if let Err(e) = state.record_run(task, Utc::now()).await {
                            tracing::error!("Failed to record run of {}: {}", task, e);
                        }
                    }
                    Err(e) => tracing::error!("Failed to enqueue overdue sweep: {}", e),
                }
            }
            _ = shutdown.changed() => {
                tracing::info!("Shutdown signal received. Stopping scheduler.");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const HOUR: Duration = Duration::from_secs(3600);

    #[derive(Default)]
    struct RecordingQueue {
        jobs: Mutex<Vec<Job>>,
    }

    #[async_trait]
    impl JobQueue for RecordingQueue {
        async fn enqueue(&self, job: Job) -> AppResult<()> {
            self.jobs.lock().unwrap().push(job);
            Ok(())
        }
    }

    fn state(last_run: Option<DateTime<Utc>>, recorded: usize) -> Arc<MockScheduleState> {
        let mut state = MockScheduleState::new();
        state
            .expect_last_run()
            .withf(|task| task.to_string() == "check_overdue_loans")
            .returning(move |_| Ok(last_run));
        state
            .expect_record_run()
            .times(recorded)
            .returning(|_, _| Ok(()));
        Arc::new(state)
    }

    #[test]
    fn test_first_delay() {
        let now = Utc::now();
        let day = 24 * HOUR;

        assert_eq!(first_delay(None, now, day), Duration::ZERO);
        assert_eq!(first_delay(Some(now - chrono::Duration::hours(1)), now, day), 23 * HOUR);
        assert_eq!(first_delay(Some(now - chrono::Duration::hours(30)), now, day), Duration::ZERO);
        // Clock skew: a last run in the future waits a full period
        assert_eq!(first_delay(Some(now + chrono::Duration::hours(1)), now, day), day);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_run_sweeps_at_startup() {
        let queue = Arc::new(RecordingQueue::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_schedule(queue.clone(), state(None, 1), 24 * HOUR, shutdown_rx));

        time::sleep(Duration::from_secs(60)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(*queue.jobs.lock().unwrap(), vec![Job::CheckOverdueLoans]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumes_from_recent_run() {
        let queue = Arc::new(RecordingQueue::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_schedule(
            queue.clone(),
            state(Some(Utc::now()), 2),
            HOUR,
            shutdown_rx,
        ));

        time::sleep(Duration::from_secs(30 * 60)).await;
        assert!(queue.jobs.lock().unwrap().is_empty());

        time::sleep(2 * HOUR).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let jobs = queue.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|job| *job == Job::CheckOverdueLoans));
    }
}
