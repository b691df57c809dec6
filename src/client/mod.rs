//! Client session engine: connect (with bounded retry), then drive the
//! client-side half of the same state machine the server enforces. Spec
//! §4.7. No terminal rendering lives here — the binary's `main` owns the
//! actual stdin/stdout loop and calls these methods in sequence.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::net::ToSocketAddrs;

use crate::Code;
use crate::protocol::ProtocolError;
use crate::protocol::Role;
use crate::protocol::State;
use crate::protocol::message::AllNamesPayload;
use crate::protocol::message::FeedbackPayload;
use crate::protocol::message::GuessPayload;
use crate::protocol::message::NamePayload;
use crate::protocol::message::RoundEndPayload;
use crate::protocol::message::RulesPayload;
use crate::protocol::wire;

pub struct Client {
    stream: TcpStream,
    state: State,
}

/// `to == expected` is the happy path; `to == State::Aborted` is always a
/// legal transition to receive (the server's `broadcast_abort`) and must
/// not be mislabeled as an `IllegalTransition`.
fn check_expected(from: State, to: State, expected: State) -> Result<(), ProtocolError> {
    if to == expected {
        Ok(())
    } else if to == State::Aborted {
        Err(ProtocolError::Aborted)
    } else {
        Err(ProtocolError::IllegalTransition { from, to })
    }
}

impl Client {
    /// connect to `addr`, retrying up to `max_attempts` times with
    /// `retry_delay` between attempts. Spec §4.7: bounded retry, not
    /// unbounded — a server that's down stays down within one run.
    pub async fn connect<A: ToSocketAddrs + Clone>(
        addr: A,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> anyhow::Result<Self> {
        let mut last_err = None;
        for attempt in 1..=max_attempts {
            match TcpStream::connect(addr.clone()).await {
                Ok(stream) => {
                    return Ok(Self {
                        stream,
                        state: State::None,
                    });
                }
                Err(e) => {
                    log::warn!("connect attempt {attempt}/{max_attempts} failed: {e}");
                    last_err = Some(e);
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
        Err(anyhow::anyhow!(
            "failed to connect after {max_attempts} attempts: {}",
            last_err.expect("at least one attempt recorded")
        ))
    }

    /// block until the server sends the rules handshake, marking this
    /// client `Connected -> RulesReceived`.
    pub async fn receive_rules(&mut self) -> anyhow::Result<RulesPayload> {
        self.state = State::Connected;
        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        check_expected(self.state, to, State::RulesReceived)?;
        self.state = State::RulesReceived;
        let bytes: [u8; RulesPayload::LEN] = wire::read_payload(&mut self.stream).await?;
        self.state = State::ChoosingName;
        Ok(RulesPayload::decode(&bytes))
    }

    /// submit a candidate name. Returns `Ok(true)` once accepted (and the
    /// caller should next await [`Self::await_all_names_and_start`]), or
    /// `Ok(false)` if the server rejected it and a new name should be
    /// chosen.
    pub async fn send_name(&mut self, name: &str) -> anyhow::Result<bool> {
        let payload = NamePayload {
            name: name.to_string(),
        };
        wire::write_framed(&mut self.stream, State::SentName, &payload.encode()).await?;
        self.state = State::SentName;
        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        self.state = to;
        Ok(to == State::NotAcked)
    }

    /// after a name is accepted, ack it and (the first time only) receive
    /// the all-players name table, ending in `Guessing` once every peer
    /// has acked.
    pub async fn await_all_names_and_start(&mut self, num_players: u8) -> anyhow::Result<Vec<String>> {
        wire::write_header(&mut self.stream, State::Acked).await?;
        self.state = State::Acked;

        // server's one-time all-names broadcast rides the `Acked` header.
        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        check_expected(self.state, to, State::Acked)?;
        let bytes: [u8; AllNamesPayload::LEN] = wire::read_payload(&mut self.stream).await?;
        let names = AllNamesPayload::decode(&bytes, num_players as usize).names;

        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        check_expected(self.state, to, State::Guessing)?;
        self.state = State::Guessing;
        Ok(names)
    }

    /// ack a round-end summary, then find out whether another round
    /// begins (`Acked -> Guessing`) or the whole game is over
    /// (`Acked -> Finished -> Disconnected`, Spec §4.5/§4.6 step 7).
    /// Returns `true` if a new round started.
    pub async fn ack_round_and_continue(&mut self) -> anyhow::Result<bool> {
        wire::write_header(&mut self.stream, State::Acked).await?;
        self.state = State::Acked;

        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        match to {
            State::Guessing => {
                self.state = to;
                Ok(true)
            }
            State::Finished => {
                self.state = to;
                let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
                check_expected(self.state, to, State::Disconnected)?;
                self.state = to;
                Ok(false)
            }
            State::Aborted => Err(ProtocolError::Aborted.into()),
            other => Err(ProtocolError::IllegalTransition {
                from: self.state,
                to: other,
            }
            .into()),
        }
    }

    /// send the universal user-abort signal (EOF on the guess prompt,
    /// SIGINT) and close. Spec §4.7 step 3, §7.
    pub async fn abort(&mut self) -> anyhow::Result<()> {
        wire::write_header(&mut self.stream, State::Aborted).await?;
        self.state = State::Aborted;
        Ok(())
    }

    /// submit a guess, returning the server's feedback.
    pub async fn send_guess(&mut self, guess: Code) -> anyhow::Result<FeedbackPayload> {
        let payload = GuessPayload {
            guess: guess as u16,
        };
        wire::write_framed(&mut self.stream, State::AwaitingFeedback, &payload.encode()).await?;
        self.state = State::AwaitingFeedback;

        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        check_expected(self.state, to, State::GotFeedback)?;
        self.state = State::GotFeedback;
        let bytes: [u8; FeedbackPayload::LEN] = wire::read_payload(&mut self.stream).await?;
        Ok(FeedbackPayload::decode(&bytes))
    }

    /// after feedback, the server sends either another `Guessing` prompt
    /// or `Finished` (this round is over).
    pub async fn next_after_feedback(&mut self) -> anyhow::Result<bool> {
        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        self.state = to;
        Ok(to == State::Guessing)
    }

    /// after `Finished`, the server always sends the round summary under
    /// `NotAcked`. The caller then calls [`Self::ack_round_and_continue`]
    /// to ack it and learn whether another round follows.
    pub async fn receive_round_end(
        &mut self,
        num_players: u8,
        max_guesses: u8,
    ) -> anyhow::Result<RoundEndPayload> {
        let to = wire::read_header(&mut self.stream, Role::Client, self.state).await?;
        check_expected(self.state, to, State::NotAcked)?;
        self.state = to;
        let bytes: [u8; RoundEndPayload::LEN] = wire::read_payload(&mut self.stream).await?;
        Ok(RoundEndPayload::decode(
            &bytes,
            num_players as usize,
            max_guesses as usize,
        ))
    }
}
