//! Background jobs
//!
//! Jobs are serialized to JSON and pushed onto a Redis list. A worker pops
//! them and runs their bodies; a scheduler enqueues the overdue sweep on a
//! fixed interval. Delivery is at-least-once from the producer's side with
//! no ordering across producers, no deduplication and no retries.

pub mod queue;
pub mod scheduler;
pub mod worker;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;

pub use queue::RedisJobQueue;
pub use worker::JobRunner;

/// A unit of background work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Job {
    /// Confirmation email for a fresh checkout
    SendLoanNotification { loan_id: i32 },
    /// Reminder for an overdue loan. Carries resolved values so running it needs no database.
    SendOverdueNotification {
        username: String,
        member_email: String,
        book_title: String,
    },
    /// Daily sweep that fans out overdue reminders
    CheckOverdueLoans,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::SendLoanNotification { .. } => "send_loan_notification",
            Job::SendOverdueNotification { .. } => "send_overdue_notification",
            Job::CheckOverdueLoans => "check_overdue_loans",
        }
    }
}

/// What actually travels through the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub job: Job,
}

impl JobEnvelope {
    pub fn new(job: Job) -> Self {
        Self {
            id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
            job,
        }
    }
}

/// Producer side of the job queue
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: Job) -> AppResult<()>;
}

/// Consumer side of the job queue
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Wait up to `timeout_seconds` for the next job
    async fn dequeue(&self, timeout_seconds: u64) -> AppResult<Option<JobEnvelope>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overdue_job_wire_format() {
        let envelope = JobEnvelope::new(Job::SendOverdueNotification {
            username: "test".to_string(),
            member_email: "test@mail.com".to_string(),
            book_title: "Inferno".to_string(),
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["task"], "send_overdue_notification");
        assert_eq!(value["username"], "test");
        assert_eq!(value["member_email"], "test@mail.com");
        assert_eq!(value["book_title"], "Inferno");
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_parse_sweep_job() {
        let raw = json!({
            "id": "7d3c3c1e-8a47-4d8e-9a55-3f3b1d2c9e10",
            "enqueued_at": "2024-05-01T06:00:00Z",
            "task": "check_overdue_loans"
        });

        let envelope: JobEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.job, Job::CheckOverdueLoans);
        assert_eq!(envelope.job.name(), "check_overdue_loans");
    }
}
