//! Pure state transitions
//!
//! Effect-free functions `fn(&state, params) -> TransitionResult`. The
//! orchestrator performs all I/O and only moves state through these.

use super::state::CreationState;
use channel_core::ChannelError;

/// Result of a state transition
#[derive(Debug, Clone)]
pub enum TransitionResult {
    /// Transition succeeded, new state produced
    Ok(CreationState),
    /// Transition was not enabled (precondition failed)
    NotEnabled(String),
}

impl TransitionResult {
    /// Check if transition succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, TransitionResult::Ok(_))
    }

    /// Get the new state if transition succeeded
    pub fn state(self) -> Option<CreationState> {
        match self {
            TransitionResult::Ok(s) => Some(s),
            TransitionResult::NotEnabled(_) => None,
        }
    }
}

fn not_enabled(action: &str, state: &CreationState) -> TransitionResult {
    TransitionResult::NotEnabled(format!("{action} not enabled in state {state}"))
}

/// Envelope parsed
///
/// Preconditions: state is `Init`
pub fn config_extracted(state: &CreationState) -> TransitionResult {
    match state {
        CreationState::Init => TransitionResult::Ok(CreationState::ConfigExtracted),
        other => not_enabled("config_extracted", other),
    }
}

/// Start collecting `required` signatures
///
/// Preconditions: state is `ConfigExtracted`
pub fn begin_signing(state: &CreationState, required: usize) -> TransitionResult {
    match state {
        CreationState::ConfigExtracted => TransitionResult::Ok(CreationState::SignaturesCollecting {
            signed: 0,
            required,
        }),
        other => not_enabled("begin_signing", other),
    }
}

/// One more signature produced
///
/// Preconditions: collecting, and fewer than `required` signed
pub fn signature_recorded(state: &CreationState) -> TransitionResult {
    match state {
        CreationState::SignaturesCollecting { signed, required } if signed < required => {
            TransitionResult::Ok(CreationState::SignaturesCollecting {
                signed: signed + 1,
                required: *required,
            })
        }
        CreationState::SignaturesCollecting { signed, required } => TransitionResult::NotEnabled(
            format!("all {required} signatures already recorded ({signed} signed)"),
        ),
        other => not_enabled("signature_recorded", other),
    }
}

/// Request assembled
///
/// Preconditions: collecting, with every required signature present
pub fn ready_to_submit(state: &CreationState) -> TransitionResult {
    match state {
        CreationState::SignaturesCollecting { signed, required } if signed == required => {
            TransitionResult::Ok(CreationState::ReadyToSubmit)
        }
        CreationState::SignaturesCollecting { signed, required } => TransitionResult::NotEnabled(
            format!("only {signed} of {required} signatures collected"),
        ),
        other => not_enabled("ready_to_submit", other),
    }
}

/// Request dispatched to the ordering service
///
/// Preconditions: state is `ReadyToSubmit`
pub fn submitted(state: &CreationState) -> TransitionResult {
    match state {
        CreationState::ReadyToSubmit => TransitionResult::Ok(CreationState::Submitted),
        other => not_enabled("submitted", other),
    }
}

/// Settle wait elapsed after a `SUCCESS` response
///
/// Preconditions: state is `Submitted`
pub fn settled(state: &CreationState) -> TransitionResult {
    match state {
        CreationState::Submitted => TransitionResult::Ok(CreationState::Settled),
        other => not_enabled("settled", other),
    }
}

/// Stop the run with `reason`
///
/// Preconditions: state is not terminal
pub fn fail(state: &CreationState, reason: ChannelError) -> TransitionResult {
    if state.is_terminal() {
        return not_enabled("fail", state);
    }
    TransitionResult::Ok(CreationState::Failed { reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collecting(signed: usize, required: usize) -> CreationState {
        CreationState::SignaturesCollecting { signed, required }
    }

    #[test]
    fn test_happy_path() {
        let state = CreationState::Init;
        let state = config_extracted(&state).state().unwrap();
        let state = begin_signing(&state, 2).state().unwrap();
        assert_eq!(state, collecting(0, 2));

        let state = signature_recorded(&state).state().unwrap();
        assert!(!ready_to_submit(&state).is_ok());
        let state = signature_recorded(&state).state().unwrap();
        assert!(!signature_recorded(&state).is_ok());

        let state = ready_to_submit(&state).state().unwrap();
        let state = submitted(&state).state().unwrap();
        let state = settled(&state).state().unwrap();
        assert_eq!(state, CreationState::Settled);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_zero_signers_is_immediately_ready() {
        let state = begin_signing(&CreationState::ConfigExtracted, 0)
            .state()
            .unwrap();
        assert!(ready_to_submit(&state).is_ok());
    }

    #[test]
    fn test_out_of_order_transitions_are_not_enabled() {
        assert!(!submitted(&CreationState::Init).is_ok());
        assert!(!settled(&CreationState::ReadyToSubmit).is_ok());
        assert!(!begin_signing(&CreationState::Init, 1).is_ok());
        assert!(!config_extracted(&CreationState::ConfigExtracted).is_ok());
    }

    #[test]
    fn test_terminal_states_cannot_fail() {
        let reason = ChannelError::cancelled("settle");
        assert!(!fail(&CreationState::Settled, reason.clone()).is_ok());

        let failed = fail(&CreationState::Submitted, reason.clone())
            .state()
            .unwrap();
        assert_eq!(failed.failure(), Some(&reason));
        assert!(!fail(&failed, reason).is_ok());
    }

    proptest! {
        #[test]
        fn signed_count_never_exceeds_required(required in 0usize..16, steps in 0usize..32) {
            let mut state = collecting(0, required);
            for _ in 0..steps {
                if let Some(next) = signature_recorded(&state).state() {
                    state = next;
                }
            }
            match state {
                CreationState::SignaturesCollecting { signed, required: r } => {
                    prop_assert!(signed <= r);
                    prop_assert_eq!(signed, steps.min(r));
                }
                other => prop_assert!(false, "unexpected state {other}"),
            }
        }
    }
}
