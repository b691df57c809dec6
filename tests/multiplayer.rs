//! End-to-end run of the real server and client engines over a loopback
//! TCP socket: connection, naming (including a collision), the ack
//! handshake, one full round, and the round-end summary. Spec §8 scenario 5.

use mastermind::Options;
use mastermind::client::Client;
use mastermind::config::Rounds;
use mastermind::server;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn two_players_complete_a_round_after_a_name_collision() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let options = Options::new(4, 3, 8).unwrap();
    let rounds = Rounds::new(1, 2).unwrap();

    let server_task = tokio::spawn(async move { server::run(listener, options, rounds).await });

    let first = tokio::spawn(play_client(addr, "alice", rounds.num_players));
    let second = tokio::spawn(play_client(addr, "alice", rounds.num_players));

    let (first_result, second_result) = tokio::join!(first, second);
    let first_summary = first_result.unwrap().unwrap();
    let second_summary = second_result.unwrap().unwrap();

    assert_eq!(first_summary.winner, second_summary.winner);
    assert_eq!(first_summary.win_by_speed_tie, second_summary.win_by_speed_tie);

    tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server finished")
        .unwrap()
        .unwrap();
}

/// connect, resolve a name collision by retrying with a suffix, then play
/// every guess in `0, 1, 2, ...` order until the round ends.
async fn play_client(
    addr: std::net::SocketAddr,
    base_name: &'static str,
    num_players: u8,
) -> anyhow::Result<mastermind::protocol::message::RoundEndPayload> {
    let mut client = Client::connect(addr, 10, Duration::from_millis(20)).await?;
    let rules = client.receive_rules().await?;
    let options = Options::new(rules.num_colors, rules.num_slots, rules.max_guesses)?;

    let mut name = base_name.to_string();
    loop {
        if client.send_name(&name).await? {
            break;
        }
        name.push_str(&rules.player_id.to_string());
    }
    client.await_all_names_and_start(num_players).await?;

    let mut guess: u32 = 0;
    loop {
        let _feedback = client.send_guess(guess % options.num_codes()).await?;
        guess += 1;
        if !client.next_after_feedback().await? {
            break;
        }
    }

    let summary = client
        .receive_round_end(num_players, rules.max_guesses)
        .await?;
    client.ack_round_and_continue().await?;
    Ok(summary)
}
