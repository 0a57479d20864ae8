//! Shared transition rule for the continuous gestures.

use super::RecognizerState;
use crate::event::InputPhase;
use crate::input::InputFrame;

/// Whether the frame's pointer count satisfies `required`; `0` accepts any.
pub(super) fn pointers_match(required: usize, frame: &InputFrame) -> bool {
    required == 0 || frame.pointer_count() == required
}

/// Next state given the current state, the frame phase and the pattern test.
pub(super) fn transition(state: RecognizerState, phase: InputPhase, passes: bool) -> RecognizerState {
    let active = state.is_active();
    if active && (phase == InputPhase::Cancel || !passes) {
        RecognizerState::Cancelled
    } else if active || passes {
        if phase == InputPhase::End {
            RecognizerState::Ended
        } else if active {
            RecognizerState::Changed
        } else {
            RecognizerState::Began
        }
    } else {
        RecognizerState::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RecognizerState::*;

    #[test]
    fn test_transition_table() {
        assert_eq!(transition(Possible, InputPhase::Move, true), Began);
        assert_eq!(transition(Possible, InputPhase::Move, false), Failed);
        assert_eq!(transition(Possible, InputPhase::End, true), Ended);
        assert_eq!(transition(Began, InputPhase::Move, true), Changed);
        assert_eq!(transition(Changed, InputPhase::Move, true), Changed);
        assert_eq!(transition(Changed, InputPhase::End, true), Ended);
        assert_eq!(transition(Changed, InputPhase::Move, false), Cancelled);
        assert_eq!(transition(Began, InputPhase::Cancel, true), Cancelled);
    }
}
