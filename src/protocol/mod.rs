//! Wire protocol: transition-legal state machine plus its framed payloads.
//! Spec §4.5, §6, §7.

pub mod error;
pub mod message;
pub mod state;
pub mod wire;

pub use error::ProtocolError;
pub use state::Role;
pub use state::State;
