//! Event notifier — decouples background work from the presentation layer.
//!
//! ```text
//! clipboard thread ─┐
//! translation task ─┼─▶ EventBus::publish ──▶ Subscription ──▶ Dispatcher ──▶ listeners
//! playback thread  ─┘        (never blocks)                     (presentation context)
//! ```

pub mod bus;
pub mod dispatcher;

pub use bus::{AppEvent, EventBus, Subscription};
pub use dispatcher::Dispatcher;
