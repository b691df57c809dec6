use std::time::Duration;

use clap::Parser;
use mastermind::client::Client;
use mastermind::code::digits;
use mastermind::code::from_digits;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

#[derive(Debug, Parser)]
#[command(name = "mm-client", about = "Mastermind multiplayer client")]
struct ClientArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = mastermind::DEFAULT_PORT)]
    port: u16,
    #[arg(long)]
    name: String,
    #[arg(long = "retry-delay-ms", default_value_t = 500)]
    retry_delay_ms: u64,
    #[arg(long = "retry-attempts", default_value_t = 5)]
    retry_attempts: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mastermind::init_logging()?;
    let args = ClientArgs::parse();

    let addr = format!("{}:{}", args.host, args.port);
    let mut client = Client::connect(
        addr,
        args.retry_attempts,
        Duration::from_millis(args.retry_delay_ms),
    )
    .await?;

    let rules = client.receive_rules().await?;
    println!(
        "joined: {} colors, {} slots, {} max guesses, {} rounds, {} players",
        rules.num_colors, rules.num_slots, rules.max_guesses, rules.num_rounds, rules.num_players
    );

    let options = mastermind::Options::new(rules.num_colors, rules.num_slots, rules.max_guesses)?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    let mut name = args.name.clone();
    loop {
        if client.send_name(&name).await? {
            break;
        }
        println!("name '{name}' rejected (empty or already taken), enter another:");
        name = stdin
            .next_line()
            .await?
            .ok_or_else(|| anyhow::anyhow!("stdin closed before a name was accepted"))?;
    }
    let names = client.await_all_names_and_start(rules.num_players).await?;
    println!("players: {}", names.join(", "));

    let mut round = 0u8;
    loop {
        println!("-- round {round} --");
        loop {
            println!("guess ({} digits, 0-{}):", rules.num_slots, rules.num_colors - 1);
            let Some(line) = stdin.next_line().await? else {
                client.abort().await?;
                return Ok(());
            };
            let colors: Vec<u8> = line
                .split_whitespace()
                .filter_map(|s| s.parse::<u8>().ok())
                .collect();
            if colors.len() != rules.num_slots as usize {
                println!("expected {} digits", rules.num_slots);
                continue;
            }
            let guess = from_digits(&options, &colors);
            let feedback = client.send_guess(guess).await?;
            println!(
                "bulls/cows: feedback index {} (state {:?})",
                feedback.feedback, feedback.match_state
            );
            if !client.next_after_feedback().await? {
                if feedback.match_state == mastermind::solver::MatchState::Lost {
                    println!("out of guesses, solution was {:?}", digits(&options, feedback.solution as u32));
                }
                break;
            }
        }

        let summary = client
            .receive_round_end(rules.num_players, rules.max_guesses)
            .await?;
        println!(
            "round over: winner={:?} speed_tie={} points={:?}",
            summary.winner, summary.win_by_speed_tie, summary.points
        );
        if !client.ack_round_and_continue().await? {
            println!("game over");
            break;
        }
        round += 1;
    }

    Ok(())
}
