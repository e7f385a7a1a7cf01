//! Session state machine
//!
//! Pure transitions over `Idle`/`Sending`; the session applies the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::SessionState;
pub use transition::{transition, TransitionError, TransitionResult};
