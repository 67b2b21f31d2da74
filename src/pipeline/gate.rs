//! Bounded access to external capabilities.

use crate::types::AppError;
use crate::utils::toml_config::PipelineConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("call exceeded its {0:?} deadline")]
    TimedOut(Duration),

    #[error("capability gate is closed")]
    Closed,

    #[error(transparent)]
    Failed(#[from] AppError),
}

/// Shared limiter for LLM and search calls across all jobs.
///
/// At most `max_concurrent` calls run at once. The deadline applies to the
/// call itself, not to the time spent waiting for a permit.
#[derive(Debug, Clone)]
pub struct CapabilityGate {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl CapabilityGate {
    pub fn new(max_concurrent: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_concurrent_calls, config.stage_timeout())
    }

    /// Same permits, different per-call deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            permits: self.permits.clone(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn call<F, T>(&self, fut: F) -> Result<T, GateError>
    where
        F: Future<Output = crate::types::Result<T>>,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GateError::Closed)?;

        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(GateError::from),
            Err(_) => Err(GateError::TimedOut(self.timeout)),
        }
    }
}
