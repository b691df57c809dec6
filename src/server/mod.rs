//! Server session engine: one task, `rounds.num_players` peers, driven by
//! polling every still-playing peer's socket for read-readiness each pass
//! (a hand-rolled analogue of `tokio::select!` for a runtime-sized peer
//! set, since `select!`'s branch count is fixed at compile time) and
//! servicing whichever peer becomes ready first. Spec §4.6.

use std::future::poll_fn;
use std::net::SocketAddr;
use std::task::Poll;

use rand::Rng;
use tokio::net::TcpListener;
use tokio::net::TcpStream;

use crate::Code;
use crate::Context;
use crate::Match;
use crate::Options;
use crate::config::Rounds;
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
use crate::solver::MatchState;

struct Peer {
    stream: TcpStream,
    addr: SocketAddr,
    state: State,
    name: String,
}

/// one round's per-peer outcome, accumulated to build a [`RoundEndPayload`].
struct RoundOutcome {
    won: bool,
    turns: u8,
    finish_order: u32,
    guesses: Vec<u16>,
}

/// is `(from, to)` the expected transition, the client's explicit abort, or
/// something illegal? Spec §4.6 step 8, §7: an explicit abort is a legal
/// message, not a protocol violation, so it must not be reported as one.
fn check_expected(from: State, to: State, expected: State) -> Result<(), ProtocolError> {
    if to == expected {
        Ok(())
    } else if to == State::Aborted {
        Err(ProtocolError::Aborted)
    } else {
        Err(ProtocolError::IllegalTransition { from, to })
    }
}

/// run the server to completion: accept `rounds.num_players` connections,
/// drive every round, then disconnect every peer. Returns once the last
/// peer has seen `Disconnected`, or propagates the first unrecoverable
/// I/O failure after notifying every peer with `Aborted` + `Disconnected`.
pub async fn run(listener: TcpListener, options: Options, rounds: Rounds) -> anyhow::Result<()> {
    let ctx = Context::new(options);
    let mut peers = accept_players(&listener, rounds.num_players).await?;
    match run_game(&mut peers, &ctx, &rounds).await {
        Ok(()) => Ok(()),
        Err(err) => {
            log::warn!("session aborting after error: {err}");
            broadcast_abort(&mut peers).await;
            Err(err)
        }
    }
}

async fn run_game(peers: &mut [Peer], ctx: &Context, rounds: &Rounds) -> anyhow::Result<()> {
    send_rules_and_collect_names(peers, ctx, rounds).await?;

    let mut points = vec![0u8; peers.len()];
    for round in 0..rounds.num_rounds {
        let secret: Code = rand::rng().random_range(0..ctx.num_codes());
        log::info!("round {round} starting, {} players", peers.len());
        let outcomes = play_round(peers, ctx, secret).await?;
        let payload = build_round_end_payload(&outcomes, secret, &mut points);
        broadcast_round_end(peers, &payload).await?;
        await_acks(peers).await?;
    }

    // every peer is `Acked` with no round left to start: `Acked -> Finished`
    // denotes the whole game (not just one round) ending, then
    // `Finished -> Disconnected` closes the session. Spec §4.5's table.
    for peer in peers.iter_mut() {
        log::info!("peer {} ({}) finished, disconnecting", peer.addr, peer.name);
        wire::write_header(&mut peer.stream, State::Finished).await?;
        peer.state = State::Finished;
        wire::write_header(&mut peer.stream, State::Disconnected).await?;
        peer.state = State::Disconnected;
    }
    Ok(())
}

/// send `Aborted` then `Disconnected` to every peer still reachable.
/// Best-effort: a peer whose socket already failed is simply skipped, since
/// the caller is already unwinding the original error. Spec §4.6 step 8,
/// §7, testable property §8 #7.
async fn broadcast_abort(peers: &mut [Peer]) {
    for peer in peers.iter_mut() {
        if wire::write_header(&mut peer.stream, State::Aborted).await.is_ok() {
            peer.state = State::Aborted;
            let _ = wire::write_header(&mut peer.stream, State::Disconnected).await;
            peer.state = State::Disconnected;
        }
    }
}

async fn accept_players(listener: &TcpListener, num_players: u8) -> anyhow::Result<Vec<Peer>> {
    let mut peers = Vec::with_capacity(num_players as usize);
    while peers.len() < num_players as usize {
        let (stream, addr) = listener.accept().await?;
        log::info!("accepted connection from {addr}");
        peers.push(Peer {
            stream,
            addr,
            state: State::Connected,
            name: String::new(),
        });
    }
    Ok(peers)
}

async fn send_rules_and_collect_names(
    peers: &mut [Peer],
    ctx: &Context,
    rounds: &Rounds,
) -> anyhow::Result<()> {
    let opts = ctx.options();
    for (player_id, peer) in peers.iter_mut().enumerate() {
        let payload = RulesPayload {
            player_id: player_id as u8,
            num_rounds: rounds.num_rounds,
            max_guesses: opts.max_guesses,
            num_slots: opts.num_slots,
            num_players: rounds.num_players,
            num_colors: opts.num_colors,
        };
        wire::write_framed(&mut peer.stream, State::RulesReceived, &payload.encode()).await?;
        peer.state = State::ChoosingName;
    }

    let mut taken: Vec<String> = Vec::new();
    for peer in peers.iter_mut() {
        loop {
            let to = wire::read_header(&mut peer.stream, Role::Server, peer.state).await?;
            check_expected(peer.state, to, State::SentName)?;
            let bytes: [u8; NamePayload::LEN] = wire::read_payload(&mut peer.stream).await?;
            let name = NamePayload::decode(&bytes).name;
            if name.is_empty() || taken.contains(&name) {
                wire::write_header(&mut peer.stream, State::ChoosingName).await?;
                peer.state = State::ChoosingName;
                continue;
            }
            taken.push(name.clone());
            peer.name = name;
            wire::write_header(&mut peer.stream, State::NotAcked).await?;
            peer.state = State::NotAcked;
            break;
        }
    }

    let all_names: Vec<String> = peers.iter().map(|p| p.name.clone()).collect();
    let names_payload = AllNamesPayload { names: all_names };
    for peer in peers.iter_mut() {
        let to = wire::read_header(&mut peer.stream, Role::Server, peer.state).await?;
        check_expected(peer.state, to, State::Acked)?;
        // first `Acked` broadcast carries the all-names table exactly once,
        // immediately before round 1's `Guessing` prompt.
        wire::write_framed(&mut peer.stream, State::Acked, &names_payload.encode()).await?;
        peer.state = State::Acked;
    }
    Ok(())
}

/// wait until some not-yet-finished peer's socket has data, returning its
/// index. A hand-rolled analogue of `tokio::select!` over a runtime-sized
/// peer set: registers read-readiness interest on every candidate peer each
/// poll, so whichever becomes ready first wakes this future, rather than a
/// fixed scan order privileging low indices.
async fn next_ready_peer(peers: &[Peer], done: &[bool]) -> usize {
    poll_fn(|cx| {
        for (i, peer) in peers.iter().enumerate() {
            if done[i] {
                continue;
            }
            if let Poll::Ready(Ok(())) = peer.stream.poll_read_ready(cx) {
                return Poll::Ready(i);
            }
        }
        Poll::Pending
    })
    .await
}

async fn play_round(peers: &mut [Peer], ctx: &Context, secret: Code) -> anyhow::Result<Vec<RoundOutcome>> {
    let mut matches: Vec<Match> = peers.iter().map(|_| Match::new(ctx, false)).collect();
    let mut done = vec![false; peers.len()];
    let mut finish_order = vec![0u32; peers.len()];
    let mut next_finisher = 0u32;

    for peer in peers.iter_mut() {
        wire::write_header(&mut peer.stream, State::Guessing).await?;
        peer.state = State::Guessing;
    }

    while done.iter().any(|&d| !d) {
        let i = next_ready_peer(peers, &done).await;
        let peer = &mut peers[i];

        let to = wire::read_header(&mut peer.stream, Role::Server, peer.state).await?;
        check_expected(peer.state, to, State::AwaitingFeedback)?;
        peer.state = State::AwaitingFeedback;
        let bytes: [u8; GuessPayload::LEN] = wire::read_payload(&mut peer.stream).await?;
        let guess = GuessPayload::decode(&bytes).guess as Code;

        let fb = ctx.feedback(guess, secret);
        matches[i].constrain(guess, fb);
        let state = matches[i].state();

        // spec §4.6 step 6: true whenever another peer is still playing.
        let waiting_for_others = done.iter().enumerate().any(|(j, &d)| j != i && !d);
        let feedback_payload = FeedbackPayload {
            feedback: fb as u16,
            match_state: state,
            solution: if state == MatchState::Lost { secret as u16 } else { 0 },
            waiting_for_others,
        };
        wire::write_framed(&mut peer.stream, State::GotFeedback, &feedback_payload.encode())
            .await?;
        peer.state = State::GotFeedback;

        match state {
            MatchState::Pending => {
                wire::write_header(&mut peer.stream, State::Guessing).await?;
                peer.state = State::Guessing;
            }
            MatchState::Won | MatchState::Lost => {
                wire::write_header(&mut peer.stream, State::Finished).await?;
                peer.state = State::Finished;
                done[i] = true;
                finish_order[i] = next_finisher;
                next_finisher += 1;
            }
        }
    }

    let mut outcomes = Vec::with_capacity(peers.len());
    for i in 0..peers.len() {
        outcomes.push(RoundOutcome {
            won: matches[i].state() == MatchState::Won,
            turns: matches[i].turn_count() as u8,
            finish_order: finish_order[i],
            guesses: matches[i].history().iter().map(|&(g, _)| g as u16).collect(),
        });
    }
    Ok(outcomes)
}

/// build this round's summary, incrementing `points[winner]` in place so
/// the running session total (spec §3) carries across rounds instead of
/// being recomputed from scratch each time.
fn build_round_end_payload(
    outcomes: &[RoundOutcome],
    secret: Code,
    points: &mut [u8],
) -> RoundEndPayload {
    let winners: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| o.won)
        .collect::<Vec<_>>()
        .into_iter()
        .fold(Vec::new(), |mut acc: Vec<usize>, (i, o)| {
            let best_turns = acc.first().map(|&b| outcomes[b].turns);
            match best_turns {
                None => acc.push(i),
                Some(best) if o.turns < best => {
                    acc.clear();
                    acc.push(i);
                }
                Some(best) if o.turns == best => acc.push(i),
                _ => {}
            }
            acc
        });

    let (winner, win_by_speed_tie) = if winners.len() <= 1 {
        (winners.first().copied(), false)
    } else {
        let fastest = winners
            .iter()
            .copied()
            .min_by_key(|&i| outcomes[i].finish_order)
            .expect("non-empty");
        (Some(fastest), true)
    };

    if let Some(w) = winner {
        points[w] = points[w].saturating_add(1);
    }
    let turns: Vec<u8> = outcomes.iter().map(|o| o.turns).collect();
    let guesses: Vec<Vec<u16>> = outcomes.iter().map(|o| o.guesses.clone()).collect();

    RoundEndPayload {
        winner: winner.map(|w| w as u8),
        win_by_speed_tie,
        points: points.to_vec(),
        turns,
        guesses,
        solution: secret as u16,
    }
}

/// send the round summary to every peer, the same way on every round
/// including the last. [`await_acks`] always follows; what follows
/// the ack (another round, or the `Finished`/`Disconnected` pair that
/// closes the session) is decided by the caller in [`run_game`].
async fn broadcast_round_end(peers: &mut [Peer], payload: &RoundEndPayload) -> anyhow::Result<()> {
    for peer in peers.iter_mut() {
        wire::write_framed(&mut peer.stream, State::NotAcked, &payload.encode()).await?;
        peer.state = State::NotAcked;
    }
    Ok(())
}

async fn await_acks(peers: &mut [Peer]) -> anyhow::Result<()> {
    for peer in peers.iter_mut() {
        let to = wire::read_header(&mut peer.stream, Role::Server, peer.state).await?;
        check_expected(peer.state, to, State::Acked)?;
        peer.state = State::Acked;
    }
    Ok(())
}
