#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use ble_battleship::{
    init_logging, print_session, transport::InMemoryTransport, transport::TcpTransport,
    transport::Transport, AiPlayer, CliPlayer, GameSession, Player, Role, SessionConfig,
    SessionNode, SessionSummary, Side, TurnPolicy,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Turn policy; overrides BATTLESHIP_TURNS.
    #[arg(long, value_enum, global = true)]
    turns: Option<Turns>,
    /// Milliseconds to wait for a reply before resending a guess.
    #[arg(long, global = true)]
    guess_timeout_ms: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum Turns {
    Alternating,
    Free,
}

#[cfg(feature = "std")]
impl From<Turns> for TurnPolicy {
    fn from(t: Turns) -> Self {
        match t {
            Turns::Alternating => TurnPolicy::Alternating,
            Turns::Free => TurnPolicy::Free,
        }
    }
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play against an AI on this machine over an in-process link.
    Local {
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Act as the advertising side and wait for a guest to connect.
    Host {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Act as the scanning side and connect to a host.
    Guest {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn make_player(player: PlayerType) -> Box<dyn Player> {
    match player {
        PlayerType::Human => Box::new(CliPlayer::new()),
        PlayerType::Ai => {
            println!("AI player selected.");
            Box::new(AiPlayer::new())
        }
    }
}

#[cfg(feature = "std")]
fn report(summary: &SessionSummary) {
    println!("\n=== GAME OVER ===");
    match summary.winner {
        Some(Side::Local) => println!("VICTORY! Every enemy ship cell is struck."),
        Some(Side::Peer) => println!("DEFEAT. All your ships have been destroyed."),
        None => println!("No winner."),
    }
    println!(
        "shots fired: {}, hits landed: {}, hits taken: {}",
        summary.shots_fired, summary.hits_landed, summary.hits_taken
    );
}

#[cfg(feature = "std")]
async fn play(
    role: Role,
    player: PlayerType,
    transport: Box<dyn Transport>,
    rng: SmallRng,
    config: SessionConfig,
) -> anyhow::Result<()> {
    let session = GameSession::new(role, config.turn_policy);
    let mut node = SessionNode::new(session, make_player(player), transport, rng, config);
    match node.run().await {
        Ok(summary) => {
            if let PlayerType::Human = player {
                let session = node.session();
                let guard = session.lock().unwrap_or_else(|p| p.into_inner());
                print_session(&guard);
            }
            report(&summary);
        }
        Err(e) => eprintln!("Game ended with an error: {}", e),
    }
    Ok(())
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = SessionConfig::from_env();
    if let Some(turns) = cli.turns {
        config.turn_policy = turns.into();
    }
    if let Some(ms) = cli.guess_timeout_ms {
        config.guess_timeout_ms = ms;
    }
    log::debug!("session config: {:?}", config);

    match cli.command {
        Commands::Local { player, seed } => {
            println!("Starting local game against the AI...");
            let mut rng = make_rng(seed);
            let rng_peer = SmallRng::from_rng(&mut rng);
            let (t1, t2) = InMemoryTransport::pair();

            let peer_config = config.clone();
            let peer = tokio::spawn(async move {
                let session = GameSession::new(Role::Guest, peer_config.turn_policy);
                let mut node = SessionNode::new(
                    session,
                    Box::new(AiPlayer::new()),
                    Box::new(t2),
                    rng_peer,
                    peer_config,
                );
                node.run().await
            });
            play(Role::Host, player, Box::new(t1), rng, config).await?;
            if let Err(e) = peer.await? {
                log::warn!("AI opponent stopped: {}", e);
            }
        }
        Commands::Host { bind, player, seed } => {
            let transport = TcpTransport::listen(&bind).await?;
            println!("Waiting for a player to connect on {}...", transport.local_addr());
            play(Role::Host, player, Box::new(transport), make_rng(seed), config).await?;
        }
        Commands::Guest {
            connect,
            player,
            seed,
        } => {
            println!("Connecting to {}...", connect);
            let transport = TcpTransport::connect(&connect).await?;
            println!("Connected successfully!");
            play(Role::Guest, player, Box::new(transport), make_rng(seed), config).await?;
        }
    }
    Ok(())
}
