use ble_battleship::transport::TcpTransport;
use ble_battleship::{AiPlayer, GameSession, Role, SessionConfig, SessionNode, Side, TurnPolicy};
use rand::{rngs::SmallRng, SeedableRng};
use tokio::time::{timeout, Duration};

fn node(role: Role, seed: u64, transport: TcpTransport) -> SessionNode {
    let config = SessionConfig {
        turn_policy: TurnPolicy::Alternating,
        tick_ms: 2,
        ..SessionConfig::default()
    };
    SessionNode::new(
        GameSession::new(role, config.turn_policy),
        Box::new(AiPlayer::new()),
        Box::new(transport),
        SmallRng::seed_from_u64(seed),
        config,
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn ai_game_over_tcp() -> anyhow::Result<()> {
    let host_link = TcpTransport::listen("127.0.0.1:0").await?;
    let addr = host_link.local_addr().to_string();
    let mut host = node(Role::Host, 21, host_link);
    let host_task = tokio::spawn(async move { host.run().await });

    let mut guest = node(Role::Guest, 22, TcpTransport::connect(&addr).await?);
    let guest_summary = timeout(Duration::from_secs(30), guest.run())
        .await
        .expect("guest did not finish")?;
    let host_summary = timeout(Duration::from_secs(30), host_task)
        .await
        .expect("host did not finish")??;

    let winners = [host_summary.winner, guest_summary.winner];
    assert!(
        winners == [Some(Side::Local), Some(Side::Peer)]
            || winners == [Some(Side::Peer), Some(Side::Local)],
        "{:?}",
        winners
    );
    Ok(())
}
