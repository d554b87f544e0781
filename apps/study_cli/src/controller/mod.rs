//! Controller layer: input intents, state transitions, and command orchestration.

pub mod events;
pub mod intent;
pub mod orchestration;
pub mod state;

pub use state::StudyController;
