use clap::Parser;
use mastermind::Options;
use mastermind::config::Rounds;

#[derive(Debug, Parser)]
#[command(name = "mm-server", about = "Mastermind multiplayer server")]
struct ServerArgs {
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
    #[arg(long, default_value_t = mastermind::DEFAULT_PORT)]
    port: u16,
    #[arg(long, default_value_t = 6)]
    colors: u8,
    #[arg(long, default_value_t = 4)]
    slots: u8,
    #[arg(long = "max-guesses", default_value_t = 10)]
    max_guesses: u8,
    #[arg(long, default_value_t = 2)]
    players: u8,
    #[arg(long, default_value_t = 1)]
    rounds: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mastermind::init_logging()?;
    let args = ServerArgs::parse();

    let options = Options::new(args.colors, args.slots, args.max_guesses)?;
    let rounds = Rounds::new(args.rounds, args.players)?;

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on {addr}, waiting for {} players", args.players);

    mastermind::server::run(listener, options, rounds).await
}
