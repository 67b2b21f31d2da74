use super::events::Step;
use serde::Serialize;

/// Lifecycle of a single pipeline job.
///
/// States advance strictly in declaration order. `Failed` is absorbing and
/// reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    RefiningQuery,
    Searching,
    Profiling,
    Selecting,
    Synthesizing,
    Editing,
    Completed,
    Failed,
}

impl PipelineState {
    /// The state that follows a successful step out of `self`.
    pub fn next(self) -> Option<Self> {
        use PipelineState::*;
        match self {
            Pending => Some(RefiningQuery),
            RefiningQuery => Some(Searching),
            Searching => Some(Profiling),
            Profiling => Some(Selecting),
            Selecting => Some(Synthesizing),
            Synthesizing => Some(Editing),
            Editing => Some(Completed),
            Completed | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }

    pub fn can_transition_to(self, to: PipelineState) -> bool {
        if to == PipelineState::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }

    /// Progress step under which this state reports its events.
    ///
    /// Query refinement shares the `search` step with searching.
    pub fn step(self) -> Step {
        use PipelineState::*;
        match self {
            RefiningQuery | Searching => Step::Search,
            Profiling => Step::Profiling,
            Selecting => Step::Selection,
            Synthesizing => Step::Synthesis,
            Editing => Step::Editing,
            Pending | Completed | Failed => Step::Error,
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Pending => "pending",
            PipelineState::RefiningQuery => "refining_query",
            PipelineState::Searching => "searching",
            PipelineState::Profiling => "profiling",
            PipelineState::Selecting => "selecting",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Editing => "editing",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal pipeline transition from {from} to {to}")]
pub struct TransitionError {
    pub from: PipelineState,
    pub to: PipelineState,
}

/// Guards the state of one job and rejects illegal transitions.
#[derive(Debug)]
pub struct StateMachine {
    current: PipelineState,
    history: Vec<PipelineState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: PipelineState::Pending,
            history: vec![PipelineState::Pending],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    /// Every state visited so far, in order.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn transition(&mut self, to: PipelineState) -> Result<PipelineState, TransitionError> {
        if !self.current.can_transition_to(to) {
            return Err(TransitionError {
                from: self.current,
                to,
            });
        }
        self.current = to;
        self.history.push(to);
        Ok(to)
    }

    /// Move to the next state in sequence.
    pub fn advance(&mut self) -> Result<PipelineState, TransitionError> {
        let to = self.current.next().ok_or(TransitionError {
            from: self.current,
            to: self.current,
        })?;
        self.transition(to)
    }

    pub fn fail(&mut self) -> Result<PipelineState, TransitionError> {
        self.transition(PipelineState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let mut machine = StateMachine::new();
        while machine.current() != PipelineState::Completed {
            machine.advance().unwrap();
        }
        assert_eq!(machine.history().len(), 8);
        assert_eq!(machine.history()[1], PipelineState::RefiningQuery);
        assert_eq!(machine.history()[6], PipelineState::Editing);
    }

    #[test]
    fn test_rejects_skipping() {
        let mut machine = StateMachine::new();
        let err = machine.transition(PipelineState::Searching).unwrap_err();
        assert_eq!(err.from, PipelineState::Pending);
        assert_eq!(machine.current(), PipelineState::Pending);
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        let mut machine = StateMachine::new();
        machine.advance().unwrap();
        machine.fail().unwrap();
        assert!(machine.advance().is_err());
        assert!(machine.fail().is_err());

        let mut done = StateMachine::new();
        while done.current() != PipelineState::Completed {
            done.advance().unwrap();
        }
        assert!(done.fail().is_err());
        assert!(done.transition(PipelineState::Editing).is_err());
    }

    #[test]
    fn test_refinement_reports_under_search() {
        assert_eq!(PipelineState::RefiningQuery.step(), Step::Search);
        assert_eq!(PipelineState::Searching.step(), Step::Search);
        assert_eq!(PipelineState::Selecting.step(), Step::Selection);
    }
}
