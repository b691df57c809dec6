//! Protocol-level failure modes. Spec §7.

use thiserror::Error;

use crate::protocol::state::State;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition { from: State, to: State },

    #[error("peer sent an explicit abort")]
    Aborted,

    #[error("connection closed mid-message: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("unrecognized state byte {0}")]
    UnknownState(u8),

    #[error("peer disconnected")]
    PeerDisconnected,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
