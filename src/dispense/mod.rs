//! Dispensation control: per-treat state machine, session, and builder.

mod builder;
mod session;
mod state;

pub use builder::DispenserBuilder;
pub use session::Dispenser;
pub use state::{AttemptPhase, Confirmation};
