use ble_battleship::{
    CellState, Coord, GameError, GameSession, Message, Orientation, Outcome, Phase, Role, Side,
    TurnPolicy,
};

const H: Orientation = Orientation::Horizontal;
const V: Orientation = Orientation::Vertical;

const HOST_FLEET: [(u8, u8, Orientation); 3] = [(0, 0, H), (2, 2, H), (5, 5, V)];
const GUEST_FLEET: [(u8, u8, Orientation); 3] = [(0, 7, H), (7, 0, V), (3, 4, V)];

const HOST_CELLS: [(u8, u8); 9] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (3, 0),
    (2, 2),
    (3, 2),
    (4, 2),
    (5, 5),
    (5, 6),
];

fn place_fleet(session: &mut GameSession, fleet: &[(u8, u8, Orientation)]) -> Option<Message> {
    let mut last = None;
    for &(x, y, o) in fleet {
        last = session.place_ship_with(x, y, o).unwrap();
    }
    last
}

fn ready_pair(policy: TurnPolicy) -> (GameSession, GameSession) {
    let mut host = GameSession::new(Role::Host, policy);
    let mut guest = GameSession::new(Role::Guest, policy);
    assert_eq!(host.set_connected(true), None);
    assert_eq!(guest.set_connected(true), None);
    let ready = place_fleet(&mut host, &HOST_FLEET).unwrap();
    guest.handle_message(ready).unwrap();
    let ready = place_fleet(&mut guest, &GUEST_FLEET).unwrap();
    host.handle_message(ready).unwrap();
    assert_eq!(host.phase(), Phase::Playing);
    assert_eq!(guest.phase(), Phase::Playing);
    (host, guest)
}

/// Fire from `from` at `to` and carry the reply back.
fn shoot(from: &mut GameSession, to: &mut GameSession, x: u8, y: u8) -> Outcome {
    let guess = from.confirm_guess(x, y).unwrap();
    assert_eq!(guess, Message::Guess { x, y });
    let reply = to.handle_message(guess).unwrap().unwrap();
    from.handle_message(reply).unwrap();
    match reply {
        Message::GuessResult { outcome, .. } => outcome,
        other => panic!("unexpected reply {:?}", other),
    }
}

#[test]
fn ready_is_sent_with_the_last_ship_when_connected() {
    let mut s = GameSession::new(Role::Host, TurnPolicy::Alternating);
    s.set_connected(true);
    assert_eq!(s.phase(), Phase::Placing);
    assert_eq!(s.place_ship_with(0, 0, H), Ok(None));
    assert_eq!(s.place_ship_with(2, 2, H), Ok(None));
    assert_eq!(s.place_ship_with(5, 5, V), Ok(Some(Message::Ready)));
    assert!(s.is_local_ready());
    assert_eq!(s.phase(), Phase::AwaitingPeerReady);
    assert_eq!(s.handle_message(Message::Ready), Ok(None));
    assert_eq!(s.phase(), Phase::Playing);
}

#[test]
fn ready_is_deferred_until_the_link_comes_up() {
    let mut s = GameSession::new(Role::Guest, TurnPolicy::Alternating);
    assert_eq!(place_fleet(&mut s, &GUEST_FLEET), None);
    assert!(!s.is_local_ready());
    assert_eq!(s.phase(), Phase::AwaitingPeerReady);
    assert_eq!(s.set_connected(true), Some(Message::Ready));
    assert_eq!(s.set_connected(true), None);
}

#[test]
fn peer_ready_before_local_placement_waits_for_the_fleet() {
    let mut s = GameSession::new(Role::Guest, TurnPolicy::Free);
    s.set_connected(true);
    s.handle_message(Message::Ready).unwrap();
    assert!(s.is_peer_ready());
    assert_eq!(s.phase(), Phase::Placing);
    assert_eq!(place_fleet(&mut s, &GUEST_FLEET), Some(Message::Ready));
    assert_eq!(s.phase(), Phase::Playing);
}

#[test]
fn invalid_placements_are_reported_and_ignored() {
    let mut s = GameSession::new(Role::Host, TurnPolicy::Free);
    assert_eq!(s.place_ship_with(5, 0, H), Err(GameError::ShipOutOfBounds));
    assert_eq!(s.place_ship_with(8, 0, H), Err(GameError::OutOfRange { x: 8, y: 0 }));
    s.place_ship_with(0, 0, H).unwrap();
    assert_eq!(s.place_ship_with(1, 0, V), Err(GameError::ShipOverlaps));
    assert_eq!(s.fleet().ships().len(), 1);
    s.place_ship_with(2, 2, H).unwrap();
    s.place_ship_with(5, 5, V).unwrap();
    assert_eq!(s.place_ship_with(0, 7, H), Err(GameError::FleetComplete));
}

#[test]
fn cannot_fire_before_both_sides_are_ready() {
    let mut s = GameSession::new(Role::Host, TurnPolicy::Free);
    s.set_connected(true);
    assert_eq!(s.confirm_guess(1, 1), Err(GameError::NotPlaying));
    place_fleet(&mut s, &HOST_FLEET);
    assert_eq!(s.confirm_guess(1, 1), Err(GameError::NotPlaying));
    assert_eq!(s.view().cell_state(Coord { x: 1, y: 1 }), CellState::Empty);
}

#[test]
fn guess_before_fleet_is_placed_is_refused() {
    let mut s = GameSession::new(Role::Guest, TurnPolicy::Free);
    s.set_connected(true);
    assert_eq!(
        s.handle_message(Message::Guess { x: 0, y: 0 }),
        Err(GameError::NotReady)
    );
}

#[test]
fn nine_hits_end_the_game_and_misses_do_not_count() {
    let (mut host, mut guest) = ready_pair(TurnPolicy::Free);

    assert_eq!(shoot(&mut guest, &mut host, 7, 7), Outcome::Miss);
    assert_eq!(guest.hits_landed(), 0);
    assert_eq!(host.cell_state(Side::Local, 7, 7), Ok(CellState::Miss));
    assert_eq!(guest.cell_state(Side::Peer, 7, 7), Ok(CellState::Miss));

    for (i, &(x, y)) in HOST_CELLS.iter().enumerate() {
        assert!(!guest.is_game_over());
        assert_eq!(shoot(&mut guest, &mut host, x, y), Outcome::Hit);
        assert_eq!(guest.hits_landed(), i + 1);
        assert_eq!(host.hits_taken(), i + 1);
    }

    assert_eq!(guest.phase(), Phase::GameOver);
    assert_eq!(host.phase(), Phase::GameOver);
    assert_eq!(guest.winner(), Some(Side::Local));
    assert_eq!(host.winner(), Some(Side::Peer));
    assert_eq!(guest.confirm_guess(6, 6), Err(GameError::GameOver));
    assert_eq!(host.confirm_guess(6, 6), Err(GameError::GameOver));

    let summary = guest.summary();
    assert_eq!(summary.shots_fired, 10);
    assert_eq!(summary.hits_landed, 9);
}

#[test]
fn game_over_survives_late_traffic() {
    let (mut host, mut guest) = ready_pair(TurnPolicy::Free);
    // A shot still in flight when the game is decided.
    let stray = guest.confirm_guess(7, 7).unwrap();
    for &(x, y) in HOST_CELLS.iter() {
        shoot(&mut guest, &mut host, x, y);
    }
    assert_eq!(guest.winner(), Some(Side::Local));
    assert_eq!(guest.pending_guesses(), vec![Coord { x: 7, y: 7 }]);

    let late = Message::GuessResult { x: 7, y: 7, outcome: Outcome::Hit };
    assert_eq!(guest.handle_message(late), Err(GameError::GameOver));
    assert_eq!(guest.hits_landed(), 9);
    assert_eq!(guest.phase(), Phase::GameOver);
    assert_eq!(guest.winner(), Some(Side::Local));

    // The loser freezes too: fresh shots are refused, replays still answered.
    assert_eq!(host.handle_message(stray), Err(GameError::GameOver));
    assert_eq!(host.cell_state(Side::Local, 7, 7), Ok(CellState::Empty));
    assert_eq!(
        host.handle_message(Message::Guess { x: 0, y: 0 }),
        Ok(Some(Message::GuessResult { x: 0, y: 0, outcome: Outcome::Hit }))
    );
    assert_eq!(host.hits_taken(), 9);
    assert_eq!(host.phase(), Phase::GameOver);
}

#[test]
fn firing_needs_the_link() {
    let (mut host, _guest) = ready_pair(TurnPolicy::Free);
    host.set_connected(false);
    assert_eq!(host.confirm_guess(3, 3), Err(GameError::TransportDisconnected));
    assert!(host.pending_guesses().is_empty());
}

#[test]
fn duplicate_result_is_not_counted_twice() {
    let (mut host, mut guest) = ready_pair(TurnPolicy::Free);
    let guess = guest.confirm_guess(0, 0).unwrap();
    let reply = host.handle_message(guess).unwrap().unwrap();
    assert_eq!(reply, Message::GuessResult { x: 0, y: 0, outcome: Outcome::Hit });
    assert_eq!(guest.handle_message(reply), Ok(None));
    assert_eq!(guest.handle_message(reply), Err(GameError::DuplicateGuess));
    assert_eq!(guest.hits_landed(), 1);

    // A result for a cell we never fired at is ignored too.
    let stray = Message::GuessResult { x: 4, y: 4, outcome: Outcome::Hit };
    assert_eq!(guest.handle_message(stray), Err(GameError::DuplicateGuess));
    assert_eq!(guest.cell_state(Side::Peer, 4, 4), Ok(CellState::Empty));
}

#[test]
fn replayed_guess_gets_the_same_answer_without_double_counting() {
    let (mut host, mut guest) = ready_pair(TurnPolicy::Alternating);
    let guess = host.confirm_guess(0, 7).unwrap();
    let first = guest.handle_message(guess).unwrap();
    let second = guest.handle_message(guess).unwrap();
    assert_eq!(first, second);
    assert_eq!(guest.hits_taken(), 1);
    assert!(guest.is_local_turn());
}

#[test]
fn alternating_turns_start_with_the_host() {
    let (mut host, mut guest) = ready_pair(TurnPolicy::Alternating);
    assert!(host.can_fire());
    assert!(!guest.can_fire());
    assert_eq!(guest.confirm_guess(0, 0), Err(GameError::OutOfTurn));

    shoot(&mut host, &mut guest, 4, 4);
    assert_eq!(host.confirm_guess(4, 5), Err(GameError::OutOfTurn));
    assert!(guest.can_fire());

    shoot(&mut guest, &mut host, 0, 0);
    assert!(host.can_fire());
    assert!(!guest.can_fire());
}

#[test]
fn free_turns_allow_several_shots_in_flight() {
    let (mut host, _guest) = ready_pair(TurnPolicy::Free);
    host.confirm_guess(1, 1).unwrap();
    host.confirm_guess(1, 2).unwrap();
    assert_eq!(host.confirm_guess(1, 1), Err(GameError::DuplicateGuess));
    assert_eq!(
        host.pending_guesses(),
        vec![Coord { x: 1, y: 1 }, Coord { x: 1, y: 2 }]
    );
    assert_eq!(host.cell_state(Side::Peer, 1, 2), Ok(CellState::UnconfirmedShot));
}

#[test]
fn disconnect_resets_readiness_but_keeps_the_game() {
    let (mut host, mut guest) = ready_pair(TurnPolicy::Alternating);
    shoot(&mut host, &mut guest, 0, 7);
    shoot(&mut guest, &mut host, 7, 7);
    host.confirm_guess(1, 7).unwrap();

    assert_eq!(host.set_connected(false), None);
    assert_eq!(guest.set_connected(false), None);
    assert_eq!(host.phase(), Phase::AwaitingPeerReady);
    assert!(!host.is_local_ready() && !host.is_peer_ready());
    assert_eq!(host.hits_landed(), 1);
    assert_eq!(guest.hits_taken(), 1);
    assert_eq!(host.pending_guesses(), vec![Coord { x: 1, y: 7 }]);
    assert_eq!(host.resend_guess(Coord { x: 1, y: 7 }), None);
    assert_eq!(host.confirm_guess(2, 7), Err(GameError::TransportDisconnected));

    let ready = host.set_connected(true).unwrap();
    guest.handle_message(ready).unwrap();
    let ready = guest.set_connected(true).unwrap();
    host.handle_message(ready).unwrap();
    assert_eq!(host.phase(), Phase::Playing);

    let resend = host.resend_guess(Coord { x: 1, y: 7 }).unwrap();
    let reply = guest.handle_message(resend).unwrap().unwrap();
    host.handle_message(reply).unwrap();
    assert_eq!(host.hits_landed(), 2);
    assert!(host.pending_guesses().is_empty());
}

#[test]
fn abandoned_guess_frees_the_cell_and_returns_the_turn() {
    let (mut host, _guest) = ready_pair(TurnPolicy::Alternating);
    let c = Coord { x: 3, y: 3 };
    host.confirm_guess(c.x, c.y).unwrap();
    assert!(!host.is_local_turn());
    assert!(host.abandon_guess(c));
    assert!(!host.abandon_guess(c));
    assert_eq!(host.view().cell_state(c), CellState::Empty);
    assert!(host.is_local_turn());
    // A late reply for the abandoned shot is ignored.
    let late = Message::GuessResult { x: 3, y: 3, outcome: Outcome::Miss };
    assert_eq!(host.handle_message(late), Err(GameError::DuplicateGuess));
}

#[test]
fn render_queries_cover_both_boards() {
    let (host, _guest) = ready_pair(TurnPolicy::Free);
    assert_eq!(host.cell_state(Side::Local, 0, 0), Ok(CellState::Ship));
    assert_eq!(host.cell_state(Side::Local, 1, 1), Ok(CellState::Empty));
    assert_eq!(host.cell_state(Side::Peer, 0, 7), Ok(CellState::Empty));
    assert_eq!(
        host.cell_state(Side::Local, 0, 8),
        Err(GameError::OutOfRange { x: 0, y: 8 })
    );
}

#[test]
fn incoming_guess_stands_in_for_a_lost_ready() {
    let mut host = GameSession::new(Role::Host, TurnPolicy::Alternating);
    let mut guest = GameSession::new(Role::Guest, TurnPolicy::Alternating);
    host.set_connected(true);
    guest.set_connected(true);
    place_fleet(&mut host, &HOST_FLEET);
    // The host's READY never reaches the guest.
    let ready = place_fleet(&mut guest, &GUEST_FLEET).unwrap();
    host.handle_message(ready).unwrap();
    assert_eq!(guest.phase(), Phase::AwaitingPeerReady);

    shoot(&mut host, &mut guest, 6, 6);
    assert!(guest.is_peer_ready());
    assert!(guest.can_fire());
}
