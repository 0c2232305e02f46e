use ble_battleship::transport::{InMemoryTransport, LinkEvent, Transport};
use tokio::time::{timeout, Duration};

async fn next(t: &mut InMemoryTransport) -> LinkEvent {
    timeout(Duration::from_secs(1), t.recv())
        .await
        .expect("no event")
        .expect("channel closed")
}

async fn assert_quiet(t: &mut InMemoryTransport) {
    assert!(timeout(Duration::from_millis(50), t.recv()).await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn pair_starts_connected_and_delivers_in_order() -> anyhow::Result<()> {
    let (mut a, mut b) = InMemoryTransport::pair();
    assert_eq!(next(&mut a).await, LinkEvent::Connected);
    assert_eq!(next(&mut b).await, LinkEvent::Connected);

    a.send(b"READY").await?;
    a.send(b"GUESS:1,2").await?;
    b.send(b"1,2,O").await?;
    assert_eq!(next(&mut b).await, LinkEvent::Message(b"READY".to_vec()));
    assert_eq!(next(&mut b).await, LinkEvent::Message(b"GUESS:1,2".to_vec()));
    assert_eq!(next(&mut a).await, LinkEvent::Message(b"1,2,O".to_vec()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn link_drop_is_seen_by_both_ends_and_loses_writes() -> anyhow::Result<()> {
    let (mut a, mut b) = InMemoryTransport::pair();
    let link = a.control();
    next(&mut a).await;
    next(&mut b).await;

    link.disconnect();
    link.disconnect();
    assert!(!link.is_up());
    assert_eq!(next(&mut a).await, LinkEvent::Disconnected);
    assert_eq!(next(&mut b).await, LinkEvent::Disconnected);

    a.send(b"READY").await?;
    assert_quiet(&mut b).await;

    link.reconnect();
    assert_eq!(next(&mut a).await, LinkEvent::Connected);
    assert_eq!(next(&mut b).await, LinkEvent::Connected);
    a.send(b"READY").await?;
    assert_eq!(next(&mut b).await, LinkEvent::Message(b"READY".to_vec()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_payloads_are_lost_silently() -> anyhow::Result<()> {
    let (mut a, mut b) = InMemoryTransport::pair();
    next(&mut b).await;
    a.control().drop_next(2);
    a.send(b"GUESS:0,0").await?;
    b.send(b"GUESS:0,1").await?;
    a.send(b"GUESS:0,2").await?;
    assert_eq!(next(&mut b).await, LinkEvent::Message(b"GUESS:0,2".to_vec()));
    assert_quiet(&mut b).await;
    Ok(())
}
