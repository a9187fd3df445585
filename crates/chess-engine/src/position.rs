//! Chess position with incremental apply/undo.

use crate::movegen::{self, is_square_attacked};
use crate::zobrist::ZOBRIST;
use crate::{Bitboard, PositionError};
use chess_core::{
    CastlingRights, Color, CoordinateMove, Fen, FenError, Move, Piece, PieceKind, Square,
};
use std::fmt;

/// Maximum number of plies a single position can record.
pub const HISTORY_CAPACITY: usize = 2048;

/// Pre-move state saved by [`Position::apply`] and consumed by
/// [`Position::undo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HistoryFrame {
    mv: Move,
    captured: Option<Piece>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

/// Complete chess position state.
///
/// Twelve disjoint piece bitboards plus derived per-color and total
/// occupancy, a mailbox for constant-time square lookup, the game
/// counters, the running Zobrist hash, and the undo stack.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    boards: [Bitboard; 12],
    by_color: [Bitboard; 2],
    occupied: Bitboard,
    mailbox: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
    history: Vec<HistoryFrame>,
}

impl Position {
    fn empty() -> Self {
        Position {
            boards: [Bitboard::EMPTY; 12],
            by_color: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            mailbox: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// The standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(Fen::STARTPOS).expect("STARTPOS is valid")
    }

    /// Builds a position from a six-field FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_parsed(&Fen::parse(fen)?)
    }

    /// Builds a position from an already parsed FEN record.
    ///
    /// Rejects positions where the side that just moved is left in check.
    pub fn from_parsed(fen: &Fen) -> Result<Self, FenError> {
        let mut position = Position::empty();
        for sq in Square::all() {
            if let Some(piece) = fen.board[sq.idx()] {
                position.put(piece, sq);
            }
        }
        position.side_to_move = fen.side_to_move;
        position.castling = fen.castling;
        position.en_passant = fen.en_passant;
        position.halfmove_clock = fen.halfmove_clock;
        position.fullmove_number = fen.fullmove_number;
        position.hash = position.compute_hash();

        let waiting = !position.side_to_move;
        if is_square_attacked(&position, position.king_square(waiting), position.side_to_move) {
            return Err(FenError::OpponentInCheck(waiting));
        }
        Ok(position)
    }

    /// Serializes to FEN, counters included.
    pub fn to_fen(&self) -> String {
        Fen {
            board: self.mailbox,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_string()
    }

    /// Recomputes the Zobrist hash from the board and state fields.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for piece in Piece::ALL {
            for sq in self.boards[piece.index()] {
                hash ^= ZOBRIST.piece(piece, sq);
            }
        }
        hash ^= ZOBRIST.side(self.side_to_move);
        hash ^= ZOBRIST.castling(self.castling);
        hash ^= ZOBRIST.en_passant(self.en_passant);
        hash
    }

    #[inline]
    fn put(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.mailbox[sq.idx()].is_none(), "{sq} is occupied");
        self.boards[piece.index()].set(sq);
        self.by_color[piece.color().index()].set(sq);
        self.occupied.set(sq);
        self.mailbox[sq.idx()] = Some(piece);
        self.hash ^= ZOBRIST.piece(piece, sq);
    }

    #[inline]
    fn remove(&mut self, piece: Piece, sq: Square) {
        debug_assert_eq!(self.mailbox[sq.idx()], Some(piece));
        self.boards[piece.index()].clear(sq);
        self.by_color[piece.color().index()].clear(sq);
        self.occupied.clear(sq);
        self.mailbox[sq.idx()] = None;
        self.hash ^= ZOBRIST.piece(piece, sq);
    }

    /// Rook origin and destination for a castling king landing on `king_to`.
    fn castle_rook_squares(king_to: Square) -> (Square, Square) {
        let rank = king_to.rank();
        if king_to.file() == 6 {
            (Square::new(7, rank), Square::new(5, rank))
        } else {
            (Square::new(0, rank), Square::new(3, rank))
        }
    }

    /// The victim and its square, resolving en passant and unresolved
    /// captures against the board.
    fn resolve_capture(&self, m: Move) -> Option<(Piece, Square)> {
        if m.is_en_passant() {
            let sq = m.to().offset(-self.side_to_move.pawn_step())?;
            return self.mailbox[sq.idx()].map(|p| (p, sq));
        }
        let victim = if m.is_capture_resolved() {
            m.captured()
        } else {
            self.mailbox[m.to().idx()]
        };
        victim.map(|p| (p, m.to()))
    }

    /// Plays `m`, which must be pseudo-legal in this position.
    ///
    /// # Panics
    ///
    /// When the history stack is full.
    pub fn apply(&mut self, m: Move) {
        assert!(
            self.history.len() < HISTORY_CAPACITY,
            "position history overflow"
        );
        let us = self.side_to_move;
        let piece = m.piece();
        let (from, to) = (m.from(), m.to());
        debug_assert_eq!(self.mailbox[from.idx()], Some(piece), "{m:?} in {self:?}");

        let capture = self.resolve_capture(m);
        self.history.push(HistoryFrame {
            mv: m,
            captured: capture.map(|(p, _)| p),
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        self.hash ^= ZOBRIST.castling(self.castling) ^ ZOBRIST.en_passant(self.en_passant);

        if let Some((victim, sq)) = capture {
            self.remove(victim, sq);
        }
        self.remove(piece, from);
        self.put(m.promotion().unwrap_or(piece), to);
        if m.is_castle() {
            let (rook_from, rook_to) = Self::castle_rook_squares(to);
            let rook = Piece::new(PieceKind::Rook, us);
            self.remove(rook, rook_from);
            self.put(rook, rook_to);
        }

        self.castling = self.castling.after_move(from, to);
        self.en_passant = if m.is_double_push() {
            from.offset(us.pawn_step())
        } else {
            None
        };
        self.hash ^= ZOBRIST.castling(self.castling) ^ ZOBRIST.en_passant(self.en_passant);

        if piece.kind() == PieceKind::Pawn || capture.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = !us;
        self.hash ^= ZOBRIST.black_to_move;
    }

    /// Takes back `m`, which must be the most recently applied move.
    pub fn undo(&mut self, m: Move) {
        let frame = self.history.pop().expect("undo without a matching apply");
        debug_assert_eq!(frame.mv, m, "undo out of order");
        let m = frame.mv;
        let them = self.side_to_move;
        let us = !them;
        let piece = m.piece();
        let (from, to) = (m.from(), m.to());

        if m.is_castle() {
            let (rook_from, rook_to) = Self::castle_rook_squares(to);
            let rook = Piece::new(PieceKind::Rook, us);
            self.remove(rook, rook_to);
            self.put(rook, rook_from);
        }
        self.remove(m.promotion().unwrap_or(piece), to);
        self.put(piece, from);
        if let Some(victim) = frame.captured {
            let sq = if m.is_en_passant() {
                Square::at((to.index() as i8 - us.pawn_step()) as u8)
            } else {
                to
            };
            self.put(victim, sq);
        }

        self.side_to_move = us;
        self.castling = frame.castling;
        self.en_passant = frame.en_passant;
        self.halfmove_clock = frame.halfmove_clock;
        self.fullmove_number = frame.fullmove_number;
        self.hash = frame.hash;
    }

    /// Passes the turn without moving a piece.
    ///
    /// Flips the side to move and clears en passant; the counters are left
    /// alone. Only the search uses this.
    pub fn apply_null(&mut self) {
        assert!(
            self.history.len() < HISTORY_CAPACITY,
            "position history overflow"
        );
        self.history.push(HistoryFrame {
            mv: Move::NULL,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });
        self.hash ^= ZOBRIST.en_passant(self.en_passant) ^ ZOBRIST.black_to_move;
        self.en_passant = None;
        self.side_to_move = !self.side_to_move;
    }

    pub fn undo_null(&mut self) {
        let frame = self.history.pop().expect("undo_null without apply_null");
        debug_assert!(frame.mv.is_null(), "undo_null out of order");
        self.side_to_move = !self.side_to_move;
        self.en_passant = frame.en_passant;
        self.hash = frame.hash;
    }

    /// Parses a coordinate move (`e2e4`, `e7e8q`) and plays it if legal.
    pub fn apply_uci(&mut self, text: &str) -> Result<Move, PositionError> {
        let coord =
            CoordinateMove::parse(text).ok_or_else(|| PositionError::InvalidMove(text.to_string()))?;
        if self.piece_at(coord.from).is_none() {
            return Err(PositionError::NoPieceAt(coord.from));
        }
        let m = movegen::generate_moves(self)
            .iter()
            .copied()
            .find(|m| coord.matches(*m))
            .ok_or_else(|| PositionError::IllegalMove(text.to_string()))?;
        self.apply(m);
        Ok(m)
    }

    /// Plays a sequence of coordinate moves, stopping at the first failure.
    pub fn apply_moves<I, S>(&mut self, moves: I) -> Result<(), PositionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in moves {
            self.apply_uci(text.as_ref())?;
        }
        Ok(())
    }

    /// True if the current position occurred earlier since the last
    /// irreversible move. The scan stops at a null move.
    pub fn is_repetition(&self) -> bool {
        let window = (self.halfmove_clock as usize).min(self.history.len());
        self.history
            .iter()
            .rev()
            .take(window)
            .take_while(|frame| !frame.mv.is_null())
            .skip(1)
            .step_by(2)
            .any(|frame| frame.hash == self.hash)
    }

    /// True once a hundred plies have passed without a capture or pawn move.
    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// A copy carrying only the history that repetition detection can still
    /// reach.
    pub fn detached(&self) -> Position {
        let keep = (self.halfmove_clock as usize).min(self.history.len());
        let mut history = Vec::with_capacity(HISTORY_CAPACITY);
        history.extend_from_slice(&self.history[self.history.len() - keep..]);
        Position {
            history,
            ..self.clone()
        }
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of plies played since this position was set up.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// The most recent move, [`Move::NULL`] after a null move.
    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|frame| frame.mv)
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.idx()]
    }

    #[inline]
    pub fn pieces(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.boards[Piece::new(kind, color).index()]
    }

    #[inline]
    pub fn piece_bb(&self, piece: Piece) -> Bitboard {
        self.boards[piece.index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// Diagonal sliders (bishops and queens) of `color`.
    #[inline]
    pub fn diagonal_sliders(&self, color: Color) -> Bitboard {
        self.pieces(PieceKind::Bishop, color) | self.pieces(PieceKind::Queen, color)
    }

    /// Orthogonal sliders (rooks and queens) of `color`.
    #[inline]
    pub fn orthogonal_sliders(&self, color: Color) -> Bitboard {
        self.pieces(PieceKind::Rook, color) | self.pieces(PieceKind::Queen, color)
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(PieceKind::King, color)
            .lsb()
            .expect("every position has both kings")
    }

    /// True if the side to move is in check.
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        is_square_attacked(self, self.king_square(us), !us)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position({})", self.to_fen())?;
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map_or('.', |p| p.to_fen_char());
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn assert_consistent(pos: &Position) {
        assert_eq!(pos.hash(), pos.compute_hash());
        let mut union = Bitboard::EMPTY;
        for piece in Piece::ALL {
            let bb = pos.piece_bb(piece);
            assert!((union & bb).is_empty(), "boards overlap");
            union |= bb;
            for s in bb {
                assert_eq!(pos.piece_at(s), Some(piece));
            }
        }
        assert_eq!(union, pos.occupied());
        assert_eq!(
            pos.occupancy(Color::White) | pos.occupancy(Color::Black),
            union
        );
    }

    #[test]
    fn waiting_side_in_check_is_rejected() {
        assert_eq!(
            Position::from_fen("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::OpponentInCheck(Color::Black))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/3n4/4K3 b - - 0 1"),
            Err(FenError::OpponentInCheck(Color::White))
        );
        // Adjacent kings attack each other.
        assert!(Position::from_fen("8/8/8/8/8/8/4k3/4K3 w - - 0 1").is_err());
        // The side to move may be in check.
        assert!(Position::from_fen("4k3/4R3/8/8/8/8/8/4K3 b - - 0 1").is_ok());
    }

    #[test]
    fn startpos_layout() {
        let pos = Position::startpos();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.pieces(PieceKind::Pawn, Color::White).count(), 8);
        assert_eq!(pos.king_square(Color::White), Square::E1);
        assert_eq!(pos.king_square(Color::Black), Square::E8);
        assert_eq!(pos.to_fen(), Fen::STARTPOS);
        assert!(!pos.in_check());
        assert_consistent(&pos);
    }

    #[test]
    fn fen_round_trip_keeps_counters() {
        for fen in [
            Fen::STARTPOS,
            KIWIPETE,
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 37 61",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn apply_uci_updates_state() {
        let mut pos = Position::startpos();
        pos.apply_uci("e2e4").unwrap();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        pos.apply_uci("g8f6").unwrap();
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 2);
        assert_eq!(
            pos.to_fen(),
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2"
        );
        assert_consistent(&pos);
    }

    #[test]
    fn apply_uci_errors() {
        let mut pos = Position::startpos();
        assert_eq!(
            pos.apply_uci("e3e4"),
            Err(PositionError::NoPieceAt(sq("e3")))
        );
        assert!(matches!(
            pos.apply_uci("e2e5"),
            Err(PositionError::IllegalMove(_))
        ));
        assert!(matches!(
            pos.apply_uci("e7e5"),
            Err(PositionError::IllegalMove(_))
        ));
        assert!(matches!(pos.apply_uci("xx"), Err(PositionError::InvalidMove(_))));
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn castling_moves_rook_and_undo_restores() {
        let mut pos = Position::from_fen(KIWIPETE).unwrap();
        let before = pos.clone();
        let m = pos.apply_uci("e1g1").unwrap();
        assert!(m.is_castle());
        assert_eq!(pos.piece_at(Square::F1).map(|p| p.kind()), Some(PieceKind::Rook));
        assert_eq!(pos.piece_at(Square::H1), None);
        assert!(!pos.castling().has(Color::White, chess_core::Wing::King));
        assert!(!pos.castling().has(Color::White, chess_core::Wing::Queen));
        assert!(pos.castling().has(Color::Black, chess_core::Wing::King));
        assert_consistent(&pos);
        pos.undo(m);
        assert_eq!(pos, before);
    }

    #[test]
    fn en_passant_capture_and_undo() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();
        let m = pos.apply_uci("e5f6").unwrap();
        assert!(m.is_en_passant());
        assert_eq!(pos.piece_at(sq("f5")), None);
        assert_eq!(pos.occupancy(Color::Black).count(), 15);
        assert_consistent(&pos);
        pos.undo(m);
        assert_eq!(pos, before);
    }

    #[test]
    fn promotion_capture_and_undo() {
        let fen = "1r2k3/P7/8/8/8/8/8/4K3 w - - 5 40";
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();
        let m = pos.apply_uci("a7b8n").unwrap();
        assert_eq!(
            pos.piece_at(sq("b8")),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
        assert_eq!(pos.halfmove_clock(), 0);
        assert_consistent(&pos);
        pos.undo(m);
        assert_eq!(pos, before);
    }

    #[test]
    fn capturing_a_rook_clears_its_right() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1").unwrap();
        pos.apply_uci("g2a8").unwrap();
        assert!(!pos.castling().has(Color::Black, chess_core::Wing::Queen));
        assert!(pos.castling().has(Color::Black, chess_core::Wing::King));
        assert_consistent(&pos);
    }

    #[test]
    fn null_move_round_trip() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
                .unwrap();
        let before = pos.clone();
        pos.apply_null();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.last_move(), Some(Move::NULL));
        assert_consistent(&pos);
        pos.undo_null();
        assert_eq!(pos, before);
    }

    #[test]
    fn null_move_keeps_counters() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 70").unwrap();
        pos.apply_null();
        assert_eq!(pos.halfmove_clock(), 99);
        assert_eq!(pos.fullmove_number(), 70);
        pos.apply_uci("e8d8").unwrap();
        assert_eq!(pos.halfmove_clock(), 100);
        assert!(pos.is_fifty_move_draw());
    }

    #[test]
    fn repetition_scan_stops_at_null_move() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 10 1")
                .unwrap();
        pos.apply_moves(["g1f3"]).unwrap();
        let after_knight = pos.hash();
        pos.apply_moves(["g8f6"]).unwrap();
        pos.apply_null();
        pos.apply_moves(["f6g8"]).unwrap();
        pos.apply_null();
        // Same board and side as after g1f3, but only across null moves.
        assert_eq!(pos.hash(), after_knight);
        assert!(!pos.is_repetition());

        let mut pos = Position::startpos();
        pos.apply_null();
        pos.apply_moves(["g8f6", "g1f3", "f6g8", "f3g1"]).unwrap();
        assert!(pos.is_repetition());
    }

    #[test]
    fn knight_shuffle_repeats_and_restores_hash() {
        let mut pos = Position::startpos();
        let start = pos.hash();
        pos.apply_moves(["g1f3", "g8f6", "f3g1"]).unwrap();
        assert!(!pos.is_repetition());
        pos.apply_moves(["f6g8"]).unwrap();
        assert_eq!(pos.hash(), start);
        assert!(pos.is_repetition());
    }

    #[test]
    fn transpositions_share_a_hash() {
        let mut a = Position::startpos();
        a.apply_moves(["g1f3", "g8f6", "b1c3", "b8c6"]).unwrap();
        let mut b = Position::startpos();
        b.apply_moves(["b1c3", "b8c6", "g1f3", "g8f6"]).unwrap();
        assert_eq!(a.hash(), b.hash());

        // Same placement, but only one side has an en-passant square.
        let mut c = Position::startpos();
        c.apply_moves(["e2e4", "e7e5", "g1f3"]).unwrap();
        let mut d = Position::startpos();
        d.apply_moves(["g1f3", "e7e5", "e2e4"]).unwrap();
        assert_ne!(c.hash(), d.hash());

        let fresh = Position::from_fen(&d.to_fen()).unwrap();
        assert_eq!(d.hash(), fresh.hash());
    }

    #[test]
    fn fifty_move_counter() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 100 80").unwrap();
        assert!(pos.is_fifty_move_draw());
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 99 80").unwrap();
        assert!(!pos.is_fifty_move_draw());
    }

    #[test]
    fn detached_trims_unreachable_history() {
        let mut pos = Position::startpos();
        pos.apply_moves(["e2e4", "e7e5", "g1f3", "b8c6"]).unwrap();
        let snapshot = pos.detached();
        assert_eq!(snapshot.ply(), 2);
        assert_eq!(snapshot.hash(), pos.hash());
        assert_eq!(snapshot.to_fen(), pos.to_fen());
    }
}
