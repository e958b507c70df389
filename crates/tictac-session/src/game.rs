//! The match state machine.
//!
//! [`GameSession`] is plain synchronous state: every notification mutates
//! it and returns the events that must be broadcast, in order. It does no
//! I/O and holds no locks; the session actor is what makes it safe to
//! drive from many connections.

use tictac_board::Board;
use tictac_protocol::{BoardUpdated, ConnectionId, MatchEnded, MatchStarted, MoveEvent, ServerEvent};

use crate::{EndCause, SessionState, Slot};

/// The live part of a match. Exists only while the match is in progress.
#[derive(Debug, Clone)]
struct Match {
    board: Board,
    turn: Slot,
}

/// Match state shared by every connection: the roster, the live board,
/// and whose turn it is.
///
/// The roster is ordered by arrival. The first two entries are the
/// players, the rest are spectators. Roster length alone decides when a
/// match starts (a connect that makes it exactly two) and when it must
/// end early (a disconnect that drops it below two).
///
/// Rule violations (spectator moves, out-of-turn moves, bad positions,
/// occupied cells) change nothing and produce no events; they are only
/// visible in the logs.
#[derive(Debug, Default)]
pub struct GameSession {
    roster: Vec<ConnectionId>,
    current: Option<Match>,
}

impl GameSession {
    /// Creates a session with nobody connected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the end of the roster.
    ///
    /// Starts a new match when the roster reaches exactly two. Later
    /// arrivals become spectators.
    pub fn connect(&mut self, id: ConnectionId) -> Vec<ServerEvent> {
        if self.roster.contains(&id) {
            tracing::warn!(%id, "connection already in roster, ignoring");
            return Vec::new();
        }

        self.roster.push(id);
        let slot = Slot(self.roster.len() - 1);
        tracing::info!(
            id = %self.roster[slot.0],
            %slot,
            roster = self.roster.len(),
            "connection joined"
        );

        if self.roster.len() == 2 {
            vec![self.start_match()]
        } else {
            Vec::new()
        }
    }

    /// Removes a connection from the roster.
    ///
    /// Ends a live match with a disconnect loss if fewer than two
    /// connections remain.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Vec<ServerEvent> {
        let Some(slot) = self.slot_of(id) else {
            tracing::debug!(%id, "unknown connection disconnected, ignoring");
            return Vec::new();
        };

        self.roster.remove(slot.0);
        tracing::info!(%id, %slot, roster = self.roster.len(), "connection left");

        if self.current.is_some() && self.roster.len() < 2 {
            vec![self.end_match(EndCause::Disconnect(slot))]
        } else {
            Vec::new()
        }
    }

    /// Applies a move or resignation from a connection.
    pub fn handle_move(
        &mut self,
        id: &ConnectionId,
        event: MoveEvent,
    ) -> Vec<ServerEvent> {
        let Some(slot) = self.slot_of(id) else {
            tracing::debug!(%id, "move from unknown connection, ignoring");
            return Vec::new();
        };

        if event.resign {
            return self.resign(slot);
        }

        match event.position {
            Some(position) => self.play(slot, position),
            None => {
                tracing::debug!(%id, "move without a position, ignoring");
                Vec::new()
            }
        }
    }

    fn resign(&mut self, slot: Slot) -> Vec<ServerEvent> {
        if !slot.is_player() {
            tracing::debug!(%slot, "ignoring resignation from spectator");
            return Vec::new();
        }
        if self.current.is_none() {
            tracing::debug!(%slot, "no match in progress, ignoring resignation");
            return Vec::new();
        }
        vec![self.end_match(EndCause::Resignation(slot))]
    }

    fn play(&mut self, slot: Slot, position: u32) -> Vec<ServerEvent> {
        let Some(current) = self.current.as_mut() else {
            tracing::debug!(%slot, position, "no match in progress, ignoring move");
            return Vec::new();
        };
        tracing::debug!(%slot, position, turn = %current.turn, "player moved");

        if !slot.is_player() {
            tracing::debug!(%slot, "ignoring spectator");
            return Vec::new();
        }
        if slot != current.turn {
            tracing::debug!(%slot, "ignoring player moving out of turn");
            return Vec::new();
        }

        let at = match current.board.place(slot.mark(), position) {
            Ok(at) => at,
            Err(e) => {
                tracing::debug!(%slot, error = %e, "invalid move");
                return Vec::new();
            }
        };
        current.turn = current.turn.opponent();

        let outcome = current.board.check_winner(at);
        let mut events = vec![ServerEvent::BoardUpdated(BoardUpdated {
            board: current.board.clone(),
        })];
        if let Some(outcome) = outcome {
            events.push(self.end_match(outcome.into()));
        }
        events
    }

    fn start_match(&mut self) -> ServerEvent {
        self.current = Some(Match {
            board: Board::new(),
            turn: Slot::FIRST,
        });
        tracing::info!(
            first = %self.roster[0],
            second = %self.roster[1],
            "match started"
        );
        ServerEvent::MatchStarted(MatchStarted {
            first_player_id: self.roster[0].clone(),
            second_player_id: self.roster[1].clone(),
        })
    }

    fn end_match(&mut self, cause: EndCause) -> ServerEvent {
        self.current = None;
        let text = cause.text();
        tracing::info!(?cause, %text, "match ended");
        ServerEvent::MatchEnded(MatchEnded { text })
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> SessionState {
        SessionState::derive(self.roster.len(), self.current.is_some())
    }

    /// Every connection, in arrival order.
    pub fn roster(&self) -> &[ConnectionId] {
        &self.roster
    }

    /// The (up to two) connections holding player slots.
    pub fn players(&self) -> &[ConnectionId] {
        &self.roster[..self.roster.len().min(2)]
    }

    /// Connections beyond the two player slots.
    pub fn spectators(&self) -> &[ConnectionId] {
        &self.roster[self.roster.len().min(2)..]
    }

    /// Resolves a connection to its roster slot.
    pub fn slot_of(&self, id: &ConnectionId) -> Option<Slot> {
        self.roster.iter().position(|c| c == id).map(Slot)
    }

    /// Whose move is accepted next, while a match is in progress.
    pub fn turn(&self) -> Option<Slot> {
        self.current.as_ref().map(|m| m.turn)
    }

    /// The live board, while a match is in progress.
    pub fn board(&self) -> Option<&Board> {
        self.current.as_ref().map(|m| &m.board)
    }
}

#[cfg(test)]
mod tests {
    use tictac_board::Cell;

    use super::*;

    fn id(n: u64) -> ConnectionId {
        ConnectionId::from_sequence(n)
    }

    /// A session with two players connected and a match started.
    fn started() -> GameSession {
        let mut session = GameSession::new();
        session.connect(id(1));
        session.connect(id(2));
        session
    }

    fn ended_text(event: &ServerEvent) -> &str {
        match event {
            ServerEvent::MatchEnded(ended) => &ended.text,
            other => panic!("expected MatchEnded, got {other:?}"),
        }
    }

    fn center(event: &ServerEvent) -> Cell {
        match event {
            ServerEvent::BoardUpdated(update) => update.board.rows()[1][1],
            other => panic!("expected BoardUpdated, got {other:?}"),
        }
    }

    // =====================================================================
    // connect()
    // =====================================================================

    #[test]
    fn test_first_connection_waits() {
        let mut session = GameSession::new();
        assert_eq!(session.state(), SessionState::Empty);

        let events = session.connect(id(1));

        assert!(events.is_empty());
        assert_eq!(session.state(), SessionState::Waiting);
        assert_eq!(session.turn(), None);
        assert!(session.board().is_none());
    }

    #[test]
    fn test_second_connection_starts_match() {
        let mut session = GameSession::new();
        session.connect(id(1));

        let events = session.connect(id(2));

        assert_eq!(
            events,
            vec![ServerEvent::MatchStarted(MatchStarted {
                first_player_id: id(1),
                second_player_id: id(2),
            })]
        );
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.turn(), Some(Slot::FIRST));
        assert_eq!(session.board(), Some(&Board::new()));
    }

    #[test]
    fn test_third_connection_is_spectator() {
        let mut session = started();

        let events = session.connect(id(3));

        assert!(events.is_empty());
        assert_eq!(session.players(), &[id(1), id(2)]);
        assert_eq!(session.spectators(), &[id(3)]);
        assert_eq!(session.slot_of(&id(3)), Some(Slot(2)));
    }

    #[test]
    fn test_duplicate_connect_is_ignored() {
        let mut session = GameSession::new();
        session.connect(id(1));

        let events = session.connect(id(1));

        assert!(events.is_empty());
        assert_eq!(session.roster().len(), 1);
        assert_eq!(session.state(), SessionState::Waiting);
    }

    // =====================================================================
    // handle_move()
    // =====================================================================

    #[test]
    fn test_accepted_move_broadcasts_board_and_passes_turn() {
        let mut session = started();

        let events = session.handle_move(&id(1), MoveEvent::at(5));

        assert_eq!(events.len(), 1);
        assert_eq!(center(&events[0]), Cell::X);
        assert_eq!(session.turn(), Some(Slot::SECOND));
    }

    #[test]
    fn test_row_win_ends_match() {
        let mut session = started();
        for (player, pos) in [(1, 1), (2, 4), (1, 2), (2, 5)] {
            let events = session.handle_move(&id(player), MoveEvent::at(pos));
            assert_eq!(events.len(), 1, "move {pos} should only update board");
        }

        let events = session.handle_move(&id(1), MoveEvent::at(3));

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ServerEvent::BoardUpdated(_)));
        assert_eq!(ended_text(&events[1]), "Game won by first player.");
        assert_eq!(session.state(), SessionState::Ended);
        assert_eq!(session.turn(), None);
    }

    #[test]
    fn test_second_player_win() {
        let mut session = started();
        for (player, pos) in [(1, 1), (2, 3), (1, 2), (2, 5), (1, 9)] {
            session.handle_move(&id(player), MoveEvent::at(pos));
        }

        let events = session.handle_move(&id(2), MoveEvent::at(7));

        assert_eq!(ended_text(&events[1]), "Game won by second player.");
    }

    #[test]
    fn test_full_board_tie() {
        let mut session = started();
        let moves = [1, 2, 3, 5, 4, 6, 8, 7];
        for (i, pos) in moves.iter().enumerate() {
            let player = if i % 2 == 0 { 1 } else { 2 };
            let events = session.handle_move(&id(player), MoveEvent::at(*pos));
            assert_eq!(events.len(), 1);
        }

        let events = session.handle_move(&id(1), MoveEvent::at(9));

        assert_eq!(events.len(), 2);
        assert_eq!(ended_text(&events[1]), "Game is tied.");
    }

    #[test]
    fn test_spectator_move_is_ignored() {
        let mut session = started();
        session.connect(id(3));

        let events = session.handle_move(&id(3), MoveEvent::at(5));

        assert!(events.is_empty());
        assert_eq!(session.board(), Some(&Board::new()));
        assert_eq!(session.turn(), Some(Slot::FIRST));
    }

    #[test]
    fn test_out_of_turn_move_is_ignored() {
        let mut session = started();

        let events = session.handle_move(&id(2), MoveEvent::at(1));

        assert!(events.is_empty());
        assert_eq!(session.turn(), Some(Slot::FIRST));
        assert_eq!(session.board(), Some(&Board::new()));
    }

    #[test]
    fn test_invalid_positions_do_not_advance_turn() {
        let mut session = started();
        session.handle_move(&id(1), MoveEvent::at(5));

        assert!(session.handle_move(&id(2), MoveEvent::at(5)).is_empty());
        assert!(session.handle_move(&id(2), MoveEvent::at(0)).is_empty());
        assert!(session.handle_move(&id(2), MoveEvent::at(10)).is_empty());
        assert!(session.handle_move(&id(2), MoveEvent::default()).is_empty());
        assert_eq!(session.turn(), Some(Slot::SECOND));

        let events = session.handle_move(&id(2), MoveEvent::at(1));
        assert_eq!(events.len(), 1);
        assert_eq!(session.turn(), Some(Slot::FIRST));
    }

    #[test]
    fn test_turn_strictly_alternates() {
        let mut session = started();
        let mut expected = Slot::FIRST;
        for pos in [5, 1, 9, 3, 2, 8] {
            // The player who is not on turn is always refused.
            let waiting = id(expected.opponent().0 as u64 + 1);
            assert!(session.handle_move(&waiting, MoveEvent::at(4)).is_empty());

            let mover = id(expected.0 as u64 + 1);
            assert!(!session.handle_move(&mover, MoveEvent::at(pos)).is_empty());
            expected = expected.opponent();
            assert_eq!(session.turn(), Some(expected));
        }
    }

    #[test]
    fn test_move_from_unknown_connection_is_ignored() {
        let mut session = started();
        assert!(session.handle_move(&id(99), MoveEvent::at(1)).is_empty());
        assert!(session.handle_move(&id(99), MoveEvent::resignation()).is_empty());
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn test_moves_after_match_end_are_ignored() {
        let mut session = started();
        session.handle_move(&id(1), MoveEvent::resignation());

        assert!(session.handle_move(&id(2), MoveEvent::at(1)).is_empty());
        assert!(session.handle_move(&id(1), MoveEvent::at(1)).is_empty());
        assert!(session.board().is_none());
    }

    // =====================================================================
    // Resignation
    // =====================================================================

    #[test]
    fn test_second_player_resigns() {
        let mut session = started();

        let events = session.handle_move(&id(2), MoveEvent::resignation());

        assert_eq!(events.len(), 1);
        assert_eq!(
            ended_text(&events[0]),
            "Game won by first player due to resignation."
        );
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[test]
    fn test_resign_ignores_turn_order_and_position() {
        let mut session = started();
        let events = session.handle_move(
            &id(1),
            MoveEvent {
                position: Some(5),
                resign: true,
            },
        );
        assert_eq!(
            ended_text(&events[0]),
            "Game won by second player due to resignation."
        );
    }

    #[test]
    fn test_resign_without_match_is_noop() {
        let mut session = GameSession::new();
        session.connect(id(1));
        assert!(session.handle_move(&id(1), MoveEvent::resignation()).is_empty());

        let mut session = started();
        session.handle_move(&id(1), MoveEvent::resignation());
        assert!(session.handle_move(&id(1), MoveEvent::resignation()).is_empty());
        assert!(session.handle_move(&id(2), MoveEvent::resignation()).is_empty());
    }

    #[test]
    fn test_spectator_resign_is_ignored() {
        let mut session = started();
        session.connect(id(3));

        assert!(session.handle_move(&id(3), MoveEvent::resignation()).is_empty());
        assert_eq!(session.state(), SessionState::InProgress);
    }

    // =====================================================================
    // disconnect()
    // =====================================================================

    #[test]
    fn test_first_player_disconnect_ends_match() {
        let mut session = started();

        let events = session.disconnect(&id(1));

        assert_eq!(
            ended_text(&events[0]),
            "Game won by second player since first player disconnected."
        );
        assert_eq!(session.state(), SessionState::Waiting);
        assert_eq!(session.roster(), &[id(2)]);
    }

    #[test]
    fn test_second_player_disconnect_ends_match() {
        let mut session = started();
        session.handle_move(&id(1), MoveEvent::at(5));

        let events = session.disconnect(&id(2));

        assert_eq!(
            ended_text(&events[0]),
            "Game won by first player since second player disconnected."
        );
    }

    #[test]
    fn test_disconnect_before_match_is_silent() {
        let mut session = GameSession::new();
        session.connect(id(1));

        assert!(session.disconnect(&id(1)).is_empty());
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_disconnect_after_match_end_is_silent() {
        let mut session = started();
        session.handle_move(&id(2), MoveEvent::resignation());

        assert!(session.disconnect(&id(1)).is_empty());
        assert_eq!(session.state(), SessionState::Waiting);
    }

    #[test]
    fn test_unknown_disconnect_leaves_roster_alone() {
        let mut session = started();

        assert!(session.disconnect(&id(42)).is_empty());
        assert_eq!(session.roster(), &[id(1), id(2)]);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn test_spectator_disconnect_keeps_match_running() {
        let mut session = started();
        session.connect(id(3));

        assert!(session.disconnect(&id(3)).is_empty());
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn test_player_leaving_with_spectator_keeps_match_running() {
        // Roster length stays at two, so the match continues and the
        // spectator moves up into the vacated player slot.
        let mut session = started();
        session.connect(id(3));
        session.handle_move(&id(1), MoveEvent::at(5));

        assert!(session.disconnect(&id(1)).is_empty());
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.players(), &[id(2), id(3)]);
        assert_eq!(session.turn(), Some(Slot::SECOND));
    }

    // =====================================================================
    // Lifecycle across matches
    // =====================================================================

    #[test]
    fn test_finished_match_does_not_restart_by_itself() {
        let mut session = started();
        session.handle_move(&id(1), MoveEvent::resignation());
        assert_eq!(session.state(), SessionState::Ended);

        // A spectator arriving does not restart anything.
        assert!(session.connect(id(3)).is_empty());
        // Dropping back to exactly two does not restart either.
        assert!(session.disconnect(&id(3)).is_empty());
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[test]
    fn test_new_match_after_roster_reforms() {
        let mut session = started();
        session.handle_move(&id(1), MoveEvent::at(1));
        session.disconnect(&id(2));
        assert_eq!(session.state(), SessionState::Waiting);

        let events = session.connect(id(3));

        assert_eq!(
            events,
            vec![ServerEvent::MatchStarted(MatchStarted {
                first_player_id: id(1),
                second_player_id: id(3),
            })]
        );
        assert_eq!(session.board(), Some(&Board::new()));
        assert_eq!(session.turn(), Some(Slot::FIRST));
    }
}
