//! Framing primitives: a 1-byte state header followed by a fixed-size
//! payload whose length is implied by the header value, never prefixed.
//! Spec §6. Callers pick which payload type follows a given header; this
//! module only moves bytes and validates the transition.

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

use crate::protocol::ProtocolError;
use crate::protocol::Role;
use crate::protocol::State;

/// write a bare header with no payload (e.g. `Finished`, `Aborted`).
pub async fn write_header<W: AsyncWrite + Unpin>(
    io: &mut W,
    state: State,
) -> Result<(), ProtocolError> {
    io.write_all(&[state as u8]).await?;
    Ok(())
}

/// write a header followed by its fixed-size payload in one call.
pub async fn write_framed<W: AsyncWrite + Unpin>(
    io: &mut W,
    state: State,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    io.write_all(&[state as u8]).await?;
    io.write_all(payload).await?;
    Ok(())
}

/// read and validate the next header against `role`'s legality table.
/// Returns the peer's disconnection as `ProtocolError::PeerDisconnected`
/// rather than a bare `Io`, since a clean EOF here is a protocol event,
/// not an I/O fault.
pub async fn read_header<R: AsyncRead + Unpin>(
    io: &mut R,
    role: Role,
    from: State,
) -> Result<State, ProtocolError> {
    let mut byte = [0u8; 1];
    match io.read_exact(&mut byte).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::PeerDisconnected);
        }
        Err(e) => return Err(e.into()),
    }
    let to = State::from_u8(byte[0]).ok_or(ProtocolError::UnknownState(byte[0]))?;
    if !crate::protocol::state::is_legal(role, from, to) {
        return Err(ProtocolError::IllegalTransition { from, to });
    }
    Ok(to)
}

/// read exactly `N` payload bytes following a header already consumed by
/// [`read_header`].
pub async fn read_payload<R: AsyncRead + Unpin, const N: usize>(
    io: &mut R,
) -> Result<[u8; N], ProtocolError> {
    let mut buf = [0u8; N];
    io.read_exact(&mut buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::Truncated {
                expected: N,
                got: 0,
            }
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::GuessPayload;

    #[tokio::test]
    async fn framed_roundtrips_over_an_in_memory_duplex() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let payload = GuessPayload { guess: 77 }.encode();
        write_framed(&mut a, State::AwaitingFeedback, &payload)
            .await
            .unwrap();

        let got = read_header(&mut b, Role::Server, State::Guessing)
            .await
            .unwrap();
        assert_eq!(got, State::AwaitingFeedback);
        let bytes: [u8; GuessPayload::LEN] = read_payload(&mut b).await.unwrap();
        assert_eq!(GuessPayload::decode(&bytes).guess, 77);
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_before_payload_is_touched() {
        let (mut a, mut b) = tokio::io::duplex(64);
        write_header(&mut a, State::Finished).await.unwrap();
        let err = read_header(&mut b, Role::Server, State::None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::IllegalTransition { .. }));
    }
}
