//! Redis-backed job queue

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client};

use super::{scheduler::ScheduleState, Job, JobEnvelope, JobQueue, JobSource};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisJobQueue {
    client: Client,
    key: String,
}

impl RedisJobQueue {
    /// Open the queue and check the broker is reachable
    pub async fn new(url: &str, key: impl Into<String>) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Queue(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Queue(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Queue(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            key: key.into(),
        })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Queue(format!("Failed to get Redis connection: {}", e)))
    }

    fn last_run_key(&self, task: &str) -> String {
        format!("{}:last_run:{}", self.key, task)
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: Job) -> AppResult<()> {
        let envelope = JobEnvelope::new(job);
        let payload = serde_json::to_string(&envelope)
            .map_err(|e| AppError::Internal(format!("Failed to serialize job: {}", e)))?;

        let mut conn = self.connection().await?;
        conn.lpush::<_, _, ()>(&self.key, payload).await?;

        tracing::debug!("Enqueued job {} ({})", envelope.id, envelope.job.name());
        Ok(())
    }
}

#[async_trait]
impl JobSource for RedisJobQueue {
    /// A payload that does not parse is logged and dropped so it cannot wedge the queue.
    async fn dequeue(&self, timeout_seconds: u64) -> AppResult<Option<JobEnvelope>> {
        let mut conn = self.connection().await?;

        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.key)
            .arg(timeout_seconds)
            .query_async(&mut conn)
            .await?;

        let Some((_, payload)) = popped else {
            return Ok(None);
        };

        match serde_json::from_str::<JobEnvelope>(&payload) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                tracing::error!("Dropping malformed job payload: {} ({})", payload, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl ScheduleState for RedisJobQueue {
    async fn last_run(&self, task: &str) -> AppResult<Option<DateTime<Utc>>> {
        let mut conn = self.connection().await?;
        let stored: Option<String> = conn.get(self.last_run_key(task)).await?;

        Ok(stored.and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable last run of {}: {} ({})", task, raw, e);
                None
            }
        }))
    }

    async fn record_run(&self, task: &str, at: DateTime<Utc>) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(self.last_run_key(task), at.to_rfc3339()).await?;
        Ok(())
    }
}
