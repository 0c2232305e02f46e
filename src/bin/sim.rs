use ble_battleship::{
    init_logging_with, transport::InMemoryTransport, AiPlayer, GameSession, Role, SessionConfig,
    SessionNode, SessionSummary, Side, TurnPolicy,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn node(role: Role, seed: u64, transport: InMemoryTransport, config: &SessionConfig) -> SessionNode {
    SessionNode::new(
        GameSession::new(role, config.turn_policy),
        Box::new(AiPlayer::new()),
        Box::new(transport),
        SmallRng::seed_from_u64(seed),
        config.clone(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging_with(log::LevelFilter::Warn);
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Usage: {} <seed1> <seed2> [alternating|free]", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;
    let mut config = SessionConfig::from_env();
    config.tick_ms = 1;
    if let Some(turns) = args.get(3) {
        config.turn_policy = turns
            .parse::<TurnPolicy>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }

    let (t1, t2) = InMemoryTransport::pair();
    let mut host = node(Role::Host, seed1, t1, &config);
    let mut guest = node(Role::Guest, seed2, t2, &config);

    let (res1, res2): (SessionSummary, SessionSummary) = tokio::try_join!(host.run(), guest.run())?;

    let winner = match (res1.winner, res2.winner) {
        (Some(Side::Local), _) => Some("host"),
        (_, Some(Side::Local)) => Some("guest"),
        _ => None,
    };

    let result = json!({
        "turns": config.turn_policy,
        "host": res1,
        "guest": res2,
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
