// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Execution tracking for command lists.
//!
//! The recording thread owns a command list, but its execution finishes on whatever
//! thread the device reports completion from. The state is therefore kept in an atomic
//! shared between the list and the completion handle of its submission.
//!
//! States move as follows:
//! - `INITIAL` -> `RECORDING` on begin
//! - `RECORDING` -> `RECORDED` on end
//! - `RECORDED` -> `EXECUTING` on submit
//! - `EXECUTING` -> `COMPLETED` when the device signals completion
//! - `COMPLETED` -> `RECORDING` on begin, for reusable lists
//! - any -> `DISPOSED` on dispose

use crate::command::RecordingState;
use std::sync::atomic::{AtomicU8, Ordering};

const INITIAL: u8 = 0;
const RECORDING: u8 = 1;
const RECORDED: u8 = 2;
const EXECUTING: u8 = 3;
const COMPLETED: u8 = 4;
const DISPOSED: u8 = 5;

fn encode(state: RecordingState) -> u8 {
    match state {
        RecordingState::Initial => INITIAL,
        RecordingState::Recording => RECORDING,
        RecordingState::Recorded => RECORDED,
        RecordingState::Executing => EXECUTING,
        RecordingState::Completed => COMPLETED,
        RecordingState::Disposed => DISPOSED,
    }
}

fn decode(raw: u8) -> RecordingState {
    match raw {
        INITIAL => RecordingState::Initial,
        RECORDING => RecordingState::Recording,
        RECORDED => RecordingState::Recorded,
        EXECUTING => RecordingState::Executing,
        COMPLETED => RecordingState::Completed,
        DISPOSED => RecordingState::Disposed,
        other => crate::command::illegal_value("recording state", other),
    }
}

#[derive(Debug)]
pub(crate) struct ExecutionTracker {
    state: AtomicU8,
}

impl ExecutionTracker {
    pub(crate) fn new() -> Self {
        ExecutionTracker {
            state: AtomicU8::new(INITIAL),
        }
    }

    pub(crate) fn state(&self) -> RecordingState {
        decode(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: RecordingState) {
        self.state.store(encode(state), Ordering::Release);
    }

    /// Moves from `from` to `to`; on failure returns the state actually found.
    pub(crate) fn transition(
        &self,
        from: RecordingState,
        to: RecordingState,
    ) -> Result<(), RecordingState> {
        self.state
            .compare_exchange(encode(from), encode(to), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let t = ExecutionTracker::new();
        assert_eq!(t.state(), RecordingState::Initial);
        assert_eq!(
            t.transition(RecordingState::Executing, RecordingState::Completed),
            Err(RecordingState::Initial)
        );
        t.set(RecordingState::Executing);
        assert!(t.transition(RecordingState::Executing, RecordingState::Completed).is_ok());
        assert_eq!(t.state(), RecordingState::Completed);
    }
}
