use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::SmallRng;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::{
    common::{Coord, GameError},
    config::SessionConfig,
    player::Player,
    protocol::{self, Message},
    session::{GameSession, SessionSummary},
    transport::{LinkEvent, Transport},
};

/// Bookkeeping for a guess that has not been answered yet.
#[derive(Debug, Clone, Copy)]
struct Outstanding {
    sent_at: Instant,
    resends: u8,
}

/// Drives one [`GameSession`] over a [`Transport`]: feeds link events into
/// the session, sends whatever it asks for, lets the player pick targets and
/// applies the guess timeout and retry policy.
pub struct SessionNode {
    session: Arc<Mutex<GameSession>>,
    player: Box<dyn Player>,
    transport: Box<dyn Transport>,
    rng: SmallRng,
    config: SessionConfig,
    outstanding: HashMap<Coord, Outstanding>,
}

fn lock(session: &Mutex<GameSession>) -> MutexGuard<'_, GameSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionNode {
    pub fn new(
        session: GameSession,
        player: Box<dyn Player>,
        transport: Box<dyn Transport>,
        rng: SmallRng,
        config: SessionConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            player,
            transport,
            rng,
            config,
            outstanding: HashMap::new(),
        }
    }

    /// Shared handle for render and input collaborators.
    pub fn session(&self) -> Arc<Mutex<GameSession>> {
        self.session.clone()
    }

    pub fn summary(&self) -> SessionSummary {
        lock(&self.session).summary()
    }

    /// Play until the game is decided. Fails only when the player cannot
    /// place its fleet or the transport is gone for good.
    pub async fn run(&mut self) -> anyhow::Result<SessionSummary> {
        let placed = {
            let mut session = lock(&self.session);
            if session.fleet().is_complete() {
                None
            } else {
                self.player
                    .place_ships(&mut self.rng, &mut session)
                    .map_err(|e| anyhow::anyhow!(e))?
            }
        };
        if let Some(msg) = placed {
            self.send(msg).await;
        }

        let mut tick = interval(self.config.tick());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !lock(&self.session).is_game_over() {
            tokio::select! {
                event = self.transport.recv() => {
                    let event = event?;
                    self.handle_event(event).await;
                }
                _ = tick.tick() => self.on_tick().await,
            }
        }

        let summary = self.summary();
        log::info!("game over: {:?}", summary);
        Ok(summary)
    }

    async fn send(&mut self, msg: Message) {
        let payload = match protocol::encode(&msg) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("not sending {:?}: {}", msg, e);
                return;
            }
        };
        if let Err(e) = self.transport.send(&payload).await {
            log::warn!("send {:?} failed: {}", msg, e);
        }
    }

    async fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                let (ready, pending) = {
                    let mut session = lock(&self.session);
                    let ready = session.set_connected(true);
                    (ready, session.pending_guesses())
                };
                if let Some(msg) = ready {
                    self.send(msg).await;
                }
                // The peer may have missed these while the link was down;
                // replays are answered without double counting.
                let now = Instant::now();
                for coord in pending {
                    if let Some(o) = self.outstanding.get_mut(&coord) {
                        o.sent_at = now;
                    }
                    self.send(Message::guess(coord)).await;
                }
            }
            LinkEvent::Disconnected => {
                lock(&self.session).set_connected(false);
            }
            LinkEvent::Message(payload) => self.handle_payload(&payload).await,
        }
    }

    async fn handle_payload(&mut self, payload: &[u8]) {
        let msg = match protocol::decode(payload) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!(
                    "dropping payload {:?}: {}",
                    String::from_utf8_lossy(payload),
                    e
                );
                return;
            }
        };
        let result = lock(&self.session).handle_message(msg);
        match result {
            Ok(Some(reply)) => self.send(reply).await,
            Ok(None) => {
                if let Message::GuessResult { x, y, outcome } = msg {
                    let coord = Coord { x, y };
                    self.outstanding.remove(&coord);
                    self.player.handle_guess_result(coord, outcome);
                }
            }
            Err(GameError::DuplicateGuess) => log::debug!("ignoring stale {:?}", msg),
            Err(e) => log::warn!("ignoring {:?}: {}", msg, e),
        }
    }

    async fn on_tick(&mut self) {
        self.expire_guesses().await;

        let fired = {
            let mut session = lock(&self.session);
            if !session.can_fire() {
                return;
            }
            let Some(target) = self.player.select_target(&mut self.rng, session.view()) else {
                return;
            };
            match session.confirm_guess(target.x, target.y) {
                Ok(msg) => Some((target, msg)),
                Err(e) => {
                    log::warn!("player picked {}: {}", target, e);
                    None
                }
            }
        };
        if let Some((target, msg)) = fired {
            self.outstanding.insert(
                target,
                Outstanding {
                    sent_at: Instant::now(),
                    resends: 0,
                },
            );
            self.send(msg).await;
        }
    }

    /// Resend guesses that went unanswered for too long, then give up on
    /// them once the retries are spent. Nothing expires while disconnected.
    async fn expire_guesses(&mut self) {
        if !lock(&self.session).is_connected() {
            return;
        }
        let timeout = self.config.guess_timeout();
        let expired: Vec<Coord> = self
            .outstanding
            .iter()
            .filter(|(_, o)| o.sent_at.elapsed() >= timeout)
            .map(|(coord, _)| *coord)
            .collect();
        for coord in expired {
            let Some(o) = self.outstanding.get_mut(&coord) else {
                continue;
            };
            if o.resends < self.config.guess_retries {
                o.resends += 1;
                o.sent_at = Instant::now();
                let resend = lock(&self.session).resend_guess(coord);
                match resend {
                    Some(msg) => {
                        log::info!("no reply for shot at {}, resending", coord);
                        self.send(msg).await;
                    }
                    None => {
                        self.outstanding.remove(&coord);
                    }
                }
            } else {
                self.outstanding.remove(&coord);
                lock(&self.session).abandon_guess(coord);
            }
        }
    }
}
