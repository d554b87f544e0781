//! UI layer: the rendering surface the controller drives, and its terminal implementation.

pub mod terminal;
pub mod theme;
pub mod view;

pub use terminal::TerminalView;
pub use view::{HealthView, StatusLine, View};
