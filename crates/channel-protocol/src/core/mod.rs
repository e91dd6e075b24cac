//! Pure channel-creation state machine

/// Run states
pub mod state;
/// State transitions
pub mod transitions;

pub use state::CreationState;
pub use transitions::TransitionResult;
