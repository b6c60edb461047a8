//! TypeFast terminal client.
//!
//! Host or join a multiplayer race, take a solo typing test, or look at the
//! leaderboard. Room races connect to the realtime relay of `typefast-server`;
//! a lost connection is reported and can be retried with `/rejoin`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin typefast-client -- --username alice host --name "Lunch race"
//! cargo run --bin typefast-client -- --username bob race --code ABC123
//! cargo run --bin typefast-client -- --username carol solo --difficulty hard --time 60
//! cargo run --bin typefast-client -- leaderboard --limit 20
//! ```

use clap::{Parser, Subcommand};
use typefast_client::{
    error::ClientError,
    runner::{ClientOptions, host_race, join_race, run_solo, show_leaderboard},
    solo::SoloPreferences,
};
use typefast_shared::{api::DEFAULT_LEADERBOARD_LIMIT, logger::setup_logger, scoring::Difficulty};

#[derive(Parser, Debug)]
#[command(name = "typefast-client")]
#[command(about = "Typing races, solo tests and leaderboard for TypeFast", long_about = None)]
struct Args {
    /// Server URL
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Stable user id for the leaderboard (defaults to the username)
    #[arg(long)]
    user_id: Option<String>,

    /// Display name
    #[arg(short = 'u', long, default_value = "")]
    username: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join a room by its code
    Race {
        #[arg(short = 'c', long)]
        code: String,
    },
    /// Create a room and race in it as the host
    Host {
        #[arg(short = 'n', long)]
        name: String,

        /// Words per race (10, 25 or 50)
        #[arg(short = 'w', long, default_value = "25")]
        words: u32,
    },
    /// Take a solo typing test
    Solo {
        #[arg(short = 'd', long, default_value = "medium")]
        difficulty: Difficulty,

        /// Number of words (10, 25 or 50)
        #[arg(short = 'w', long, default_value = "25")]
        words: usize,

        /// Time limit in seconds (15, 30 or 60)
        #[arg(short = 't', long, default_value = "30")]
        time: u32,

        /// Do not send the result to the leaderboard
        #[arg(long)]
        no_submit: bool,
    },
    /// Show the leaderboard and open rooms
    Leaderboard {
        #[arg(short = 'l', long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
    },
}

async fn run(args: Args) -> Result<(), ClientError> {
    let username = args.username.trim().to_string();
    let options = ClientOptions {
        server_url: args.server.clone(),
        user_id: args.user_id.unwrap_or_else(|| username.clone()),
        username,
    };

    match args.command {
        Command::Race { code } => join_race(&options, &code).await,
        Command::Host { name, words } => host_race(&options, name, words).await,
        Command::Solo {
            difficulty,
            words,
            time,
            no_submit,
        } => {
            let preferences = SoloPreferences::new(time, words, difficulty)?;
            let submit = !no_submit && !options.username.is_empty();
            run_solo(&options, preferences, submit).await
        }
        Command::Leaderboard { limit } => show_leaderboard(&options.server_url, limit).await,
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("typefast_client", env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
