pub mod client;
pub mod code;
pub mod config;
pub mod context;
pub mod protocol;
pub mod server;
pub mod solver;

pub use code::Code;
pub use config::Options;
pub use context::Context;
pub use solver::Match;

/// colors, slots, turns, players, rounds — the compile-time maxima the wire
/// format's fixed-size records are built around.
pub const MAX_NUM_COLORS: u8 = 10;
pub const MAX_NUM_SLOTS: u8 = 10;
pub const MAX_MAX_GUESSES: u8 = 20;
pub const MAX_NUM_PLAYERS: u8 = 4;
pub const MAX_NUM_ROUNDS: u8 = 10;
/// name buffer width including the trailing nul.
pub const MAX_NAME_BYTES: usize = 31;
/// practical cap on M = K^N; above this a `Context` refuses construction.
pub const MAX_NUM_CODES: u32 = 1_000_000;

pub const DEFAULT_PORT: u16 = 25567;

/// initialize combined term + file logging, mirroring the layout of a
/// long-running service: interactive feedback on the terminal, full detail
/// on disk under `logs/`.
pub fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log"))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).map_err(|e| anyhow::anyhow!(e))
}
