use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Events a successful job publishes: `running` and `completed` for each step.
pub const EVENTS_PER_JOB: usize = 10;

/// Progress step reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Search,
    Profiling,
    Selection,
    Synthesis,
    Editing,
    /// Failures not attributable to a single stage.
    Error,
}

impl Step {
    /// Stages in the order their events are emitted.
    pub const ORDER: [Step; 5] = [
        Step::Search,
        Step::Profiling,
        Step::Selection,
        Step::Synthesis,
        Step::Editing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Step::Search => "Search",
            Step::Profiling => "Profiling",
            Step::Selection => "Selection",
            Step::Synthesis => "Synthesis",
            Step::Editing => "Editing",
            Step::Error => "Pipeline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    Completed,
    Error,
}

/// One lifecycle event pushed to the job's subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StageEvent {
    pub job_id: String,
    pub step: Step,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_topic: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StageEvent {
    fn new(job_id: &str, step: Step, status: Status) -> Self {
        Self {
            job_id: job_id.to_string(),
            step,
            status,
            message: None,
            data: None,
            refined_topic: None,
            timestamp: Utc::now(),
        }
    }

    pub fn running(job_id: &str, step: Step, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(job_id, step, Status::Running)
        }
    }

    pub fn completed(job_id: &str, step: Step, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::new(job_id, step, Status::Completed)
        }
    }

    pub fn failed(job_id: &str, step: Step, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(job_id, step, Status::Error)
        }
    }

    pub fn with_refined_topic(mut self, refined_topic: impl Into<String>) -> Self {
        self.refined_topic = Some(refined_topic.into());
        self
    }

    /// True for the last event a job emits, success or failure.
    pub fn is_terminal(&self) -> bool {
        self.status == Status::Error
            || (self.step == Step::Editing && self.status == Status::Completed)
    }
}
