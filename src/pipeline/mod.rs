//! Staged news pipeline.
//!
//! [`PipelineOrchestrator`] runs a [`Job`] through query refinement, search,
//! profiling, selection, synthesis and editing. Every external call goes
//! through the shared [`CapabilityGate`]; progress is published to the
//! job's channel on the [`ProgressHub`](crate::progress::ProgressHub).

pub mod error;
pub mod events;
pub mod gate;
pub mod orchestrator;
pub mod parse;
pub mod state;

pub use error::{ErrorKind, StageError};
pub use events::{StageEvent, Status, Step, EVENTS_PER_JOB};
pub use gate::{CapabilityGate, GateError};
pub use orchestrator::{Job, PipelineOrchestrator};
pub use state::{PipelineState, StateMachine, TransitionError};
