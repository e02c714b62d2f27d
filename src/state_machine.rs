//! Per-file conflict-resolution dialogue as a state machine
//!
//! Implements the Elm Architecture pattern: `transition` is a pure function
//! from (state, event) to (new state, effects). The runtime executes the
//! effects and feeds the resulting events back in until a terminal state is
//! reached.

mod effect;
pub mod event;
pub mod reply;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Announcement, Effect};
pub use event::Event;
pub use state::{Conversation, DialogueContext, DialogueOutcome, DialogueState};
pub use transition::{transition, TransitionError, TransitionResult};
