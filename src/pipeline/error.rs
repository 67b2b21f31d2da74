use super::events::Step;
use super::state::{PipelineState, TransitionError};

/// Failure classes a stage can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upstream payload could not be decoded.
    Parse,
    /// The upstream call succeeded but produced nothing usable.
    EmptyResult,
    /// The capability raised an error or missed its deadline.
    Upstream,
    /// All stages completed but the report could not be stored.
    Persistence,
    /// The state machine rejected a transition.
    Internal,
}

/// Terminal failure of a pipeline job.
///
/// `detail` is for logs only; clients see [`StageError::user_message`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?} failure while {state}: {detail}")]
pub struct StageError {
    pub state: PipelineState,
    pub kind: ErrorKind,
    pub detail: String,
}

impl StageError {
    pub fn new(state: PipelineState, kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            state,
            kind,
            detail: detail.into(),
        }
    }

    pub fn parse(state: PipelineState, detail: impl Into<String>) -> Self {
        Self::new(state, ErrorKind::Parse, detail)
    }

    pub fn empty(state: PipelineState, detail: impl Into<String>) -> Self {
        Self::new(state, ErrorKind::EmptyResult, detail)
    }

    pub fn upstream(state: PipelineState, detail: impl Into<String>) -> Self {
        Self::new(state, ErrorKind::Upstream, detail)
    }

    pub fn persistence(detail: impl Into<String>) -> Self {
        Self::new(PipelineState::Editing, ErrorKind::Persistence, detail)
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    /// Sanitized message safe to forward to clients.
    pub fn user_message(&self) -> String {
        let stage = self.step().label();
        match (self.kind, self.state) {
            (ErrorKind::Parse, PipelineState::Searching) => {
                "The news search returned data that could not be read. Please try again.".to_string()
            }
            (ErrorKind::Parse, _) => format!(
                "{} failed: the response could not be understood. Please try again.",
                stage
            ),
            (ErrorKind::EmptyResult, PipelineState::RefiningQuery) => {
                "Could not derive search keywords from this topic. Try rephrasing it.".to_string()
            }
            (ErrorKind::EmptyResult, PipelineState::Searching) => {
                "No news coverage found for this topic. Try a broader or different topic."
                    .to_string()
            }
            (ErrorKind::EmptyResult, _) => {
                format!("{} failed: no output was produced. Please try again.", stage)
            }
            (ErrorKind::Upstream, PipelineState::Searching) => {
                "The news search service could not be reached or timed out. Please try again later."
                    .to_string()
            }
            (ErrorKind::Upstream, _) => format!(
                "{} failed: the language model could not be reached or timed out. Please try again later.",
                stage
            ),
            (ErrorKind::Persistence, _) => {
                "Your report was computed but could not be saved. Please try again later."
                    .to_string()
            }
            (ErrorKind::Internal, _) => {
                "An unexpected internal error occurred. Please try again.".to_string()
            }
        }
    }
}

impl From<TransitionError> for StageError {
    fn from(err: TransitionError) -> Self {
        Self::new(err.from, ErrorKind::Internal, err.to_string())
    }
}
