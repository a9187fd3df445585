//! Move generation.
//!
//! Pseudo-legal moves come from the attack tables; a legality filter then
//! removes moves that leave the mover's king attacked. Pinned pieces are
//! handled with a cheap ray test, and only king moves, en passant, and
//! check evasions pay for a full apply/test/undo.

mod attacks;
mod magics;
pub mod perft;

use crate::{Bitboard, Position};
use chess_core::{Color, Move, Piece, PieceKind, Square, Wing};

pub use attacks::{
    between, bishop_attacks, bishop_attacks_traced, king_attacks, knight_attacks, line,
    pawn_attacks, pawn_pushes, queen_attacks, rook_attacks, rook_attacks_traced,
};

/// Builds the sliding-piece and ray tables now instead of on first use.
pub fn init() {
    magics::init();
    let _ = line(Square::A1, Square::H8);
}

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so a fixed-size array
/// avoids heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true, keeping
    /// their relative order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum GenKind {
    All,
    /// Captures, en passant, and queen push-promotions.
    Noisy,
}

/// All legal moves for the side to move.
///
/// Takes `&mut` because some candidates are verified by playing them; the
/// position is restored before returning.
pub fn generate_moves(position: &mut Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, GenKind::All, &mut moves);
    retain_legal(position, &mut moves);
    moves
}

/// Legal captures, plus queen promotions by push, for quiescence search.
pub fn generate_captures(position: &mut Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, GenKind::Noisy, &mut moves);
    retain_legal(position, &mut moves);
    moves
}

/// All pseudo-legal moves: legal except that the mover's king may be left
/// attacked.
pub fn generate_pseudo_legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, GenKind::All, &mut moves);
    moves
}

fn generate_pseudo_legal(position: &Position, kind: GenKind, moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = !us;
    let occupied = position.occupied();
    let targets = match kind {
        GenKind::All => !position.occupancy(us),
        GenKind::Noisy => position.occupancy(them),
    };

    generate_pawn_moves(position, kind, moves);

    for piece_kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        let piece = Piece::new(piece_kind, us);
        for from in position.piece_bb(piece) {
            let attacks = match piece_kind {
                PieceKind::Knight => knight_attacks(from),
                PieceKind::Bishop => bishop_attacks(from, occupied),
                PieceKind::Rook => rook_attacks(from, occupied),
                PieceKind::Queen => queen_attacks(from, occupied),
                _ => king_attacks(from),
            };
            for to in attacks & targets {
                moves.push(match position.piece_at(to) {
                    Some(victim) => Move::capture(from, to, piece, victim),
                    None => Move::new(from, to, piece),
                });
            }
        }
    }

    if kind == GenKind::All {
        generate_castling_moves(position, moves);
    }
}

fn push_promotions(moves: &mut MoveList, base: Move, kinds: &[PieceKind]) {
    for &kind in kinds {
        moves.push(base.with_promotion(kind));
    }
}

fn generate_pawn_moves(position: &Position, kind: GenKind, moves: &mut MoveList) {
    let us = position.side_to_move();
    let pawn = Piece::new(PieceKind::Pawn, us);
    let their_pieces = position.occupancy(!us);
    let occupied = position.occupied();
    let push_kinds: &[PieceKind] = match kind {
        GenKind::All => &PieceKind::PROMOTIONS,
        GenKind::Noisy => &[PieceKind::Queen],
    };

    for from in position.piece_bb(pawn) {
        let promoting = (from.rank() as i8 + us.pawn_step() / 8) as u8 == us.promotion_rank();

        for to in pawn_pushes(from, us, occupied) {
            if promoting {
                push_promotions(moves, Move::new(from, to, pawn), push_kinds);
            } else if kind == GenKind::All {
                moves.push(if to.rank().abs_diff(from.rank()) == 2 {
                    Move::double_push(from, to, pawn)
                } else {
                    Move::new(from, to, pawn)
                });
            }
        }

        let attacks = pawn_attacks(from, us);
        for to in attacks & their_pieces {
            let Some(victim) = position.piece_at(to) else {
                continue;
            };
            let m = Move::capture(from, to, pawn, victim);
            if promoting {
                push_promotions(moves, m, &PieceKind::PROMOTIONS);
            } else {
                moves.push(m);
            }
        }

        if let Some(ep) = position.en_passant() {
            if attacks.contains(ep) {
                let victim = Piece::new(PieceKind::Pawn, !us);
                moves.push(Move::en_passant(from, ep, pawn, victim));
            }
        }
    }
}

fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = !us;
    let rights = position.castling();
    if rights.is_empty() {
        return;
    }
    let rank = us.back_rank();
    let king_from = Square::new(4, rank);
    let king = Piece::new(PieceKind::King, us);
    let rook = Piece::new(PieceKind::Rook, us);
    if position.piece_at(king_from) != Some(king) || is_square_attacked(position, king_from, them)
    {
        return;
    }

    for (wing, rook_file, king_file, transit_file) in
        [(Wing::King, 7, 6, 5), (Wing::Queen, 0, 2, 3)]
    {
        let rook_from = Square::new(rook_file, rank);
        let king_to = Square::new(king_file, rank);
        let transit = Square::new(transit_file, rank);
        if rights.has(us, wing)
            && position.piece_at(rook_from) == Some(rook)
            && (between(king_from, rook_from) & position.occupied()).is_empty()
            && !is_square_attacked(position, transit, them)
            && !is_square_attacked(position, king_to, them)
        {
            moves.push(Move::castle(king_from, king_to, king));
        }
    }
}

fn retain_legal(position: &mut Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let king = position.king_square(us);
    let in_check = position.in_check();
    moves.retain(|m| is_legal(position, m, king, in_check));
}

/// Whether a pseudo-legal move keeps the mover's king safe.
fn is_legal(position: &mut Position, m: Move, king: Square, in_check: bool) -> bool {
    if in_check || m.piece().kind() == PieceKind::King || m.is_en_passant() {
        return leaves_king_safe(position, m);
    }

    let from = m.from();
    let ray = line(king, from);
    if ray.is_empty() {
        return true;
    }

    let them = !position.side_to_move();
    let occupied = position.occupied() ^ Bitboard::from_square(from);
    let pinners = if king.rank() == from.rank() || king.file() == from.file() {
        rook_attacks(king, occupied) & position.orthogonal_sliders(them)
    } else {
        bishop_attacks(king, occupied) & position.diagonal_sliders(them)
    };
    (pinners & ray).is_empty() || ray.contains(m.to())
}

fn leaves_king_safe(position: &mut Position, m: Move) -> bool {
    let us = position.side_to_move();
    position.apply(m);
    let safe = !is_square_attacked(position, position.king_square(us), !us);
    position.undo(m);
    safe
}

/// True if `sq` is attacked by any piece of `by`.
///
/// Each attack pattern is placed on `sq` and intersected with the matching
/// enemy pieces.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let occupied = position.occupied();

    if (pawn_attacks(sq, !by) & position.pieces(PieceKind::Pawn, by)).is_not_empty() {
        return true;
    }
    if (knight_attacks(sq) & position.pieces(PieceKind::Knight, by)).is_not_empty() {
        return true;
    }
    if (bishop_attacks(sq, occupied) & position.diagonal_sliders(by)).is_not_empty() {
        return true;
    }
    if (rook_attacks(sq, occupied) & position.orthogonal_sliders(by)).is_not_empty() {
        return true;
    }
    (king_attacks(sq) & position.pieces(PieceKind::King, by)).is_not_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn pseudo_legal_includes_pinned_moves() {
        let mut pos = Position::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let pseudo = generate_pseudo_legal_moves(&pos);
        let legal = generate_moves(&mut pos);
        let pinned = sq("e2");
        assert_eq!(pseudo.iter().filter(|m| m.from() == pinned).count(), 9);
        assert!(!legal.iter().any(|m| m.from() == pinned));
        assert!(legal.iter().all(|m| pseudo.contains(*m)));
    }

    fn uci_set(moves: &MoveList) -> Vec<String> {
        let mut v: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
        v.sort();
        v
    }

    #[test]
    fn movelist_push_and_retain() {
        let pawn = Piece::new(PieceKind::Pawn, Color::White);
        let mut list = MoveList::new();
        assert!(list.is_empty());
        list.push(Move::new(sq("e2"), sq("e3"), pawn));
        list.push(Move::double_push(sq("e2"), sq("e4"), pawn));
        list.push(Move::new(sq("d2"), sq("d3"), pawn));
        assert_eq!(list.len(), 3);
        list.retain(|m| !m.is_double_push());
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].to_uci(), "d2d3");
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let mut pos = Position::startpos();
        let moves = generate_moves(&mut pos);
        assert_eq!(moves.len(), 20);
        assert_eq!(moves.iter().filter(|m| m.is_double_push()).count(), 8);
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn generated_captures_are_resolved() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let moves = generate_moves(&mut pos);
        for m in &moves {
            assert!(m.is_capture_resolved());
            assert_eq!(m.captured(), pos.piece_at(m.to()), "{m}");
        }
        let captures = generate_captures(&mut pos);
        assert_eq!(captures.len(), 8);
        assert!(captures.iter().all(|m| m.is_capture()));
    }

    #[test]
    fn attacked_squares() {
        let pos = Position::startpos();
        assert!(is_square_attacked(&pos, sq("e3"), Color::White));
        assert!(is_square_attacked(&pos, sq("f3"), Color::White));
        assert!(!is_square_attacked(&pos, sq("e4"), Color::White));
        assert!(is_square_attacked(&pos, sq("e6"), Color::Black));
        assert!(!is_square_attacked(&pos, sq("e1"), Color::Black));
    }

    #[test]
    fn castling_both_wings() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn no_castling_through_or_out_of_check() {
        // f1 attacked by the rook on f8.
        let mut pos = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));

        let mut pos = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn queenside_castling_ignores_attacked_b_file() {
        let mut pos = Position::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        assert!(moves.contains(&"e1c1".to_string()));
    }

    #[test]
    fn pinned_piece_stays_on_line() {
        // Bishop e2 pinned by the rook on e8; it has no legal moves.
        let mut pos = Position::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let moves = generate_moves(&mut pos);
        assert!(moves.iter().all(|m| m.from() != sq("e2")));

        // Rook e2 pinned on the file may slide along it and capture.
        let mut pos = Position::from_fen("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        let rook_moves: Vec<_> = moves.iter().filter(|m| m.starts_with("e2")).collect();
        assert_eq!(rook_moves.len(), 6);
        assert!(moves.contains(&"e2e8".to_string()));
    }

    #[test]
    fn horizontal_en_passant_pin() {
        let mut pos = Position::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        assert!(!moves.contains(&"e5d6".to_string()));
    }

    #[test]
    fn en_passant_generated() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let moves = generate_moves(&mut pos);
        let ep: Vec<_> = moves.iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to_uci(), "e5f6");
    }

    #[test]
    fn promotions_by_push_and_capture() {
        let mut pos = Position::from_fen("1r5k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let moves = uci_set(&generate_moves(&mut pos));
        for suffix in ["q", "r", "b", "n"] {
            assert!(moves.contains(&format!("a7a8{suffix}")));
            assert!(moves.contains(&format!("a7b8{suffix}")));
        }
        let captures = uci_set(&generate_captures(&mut pos));
        assert_eq!(
            captures,
            vec!["a7a8q", "a7b8b", "a7b8n", "a7b8q", "a7b8r"]
        );
    }

    #[test]
    fn check_evasions_only() {
        // Knight check: king must move or the knight must be taken.
        let mut pos = Position::from_fen("4k3/8/8/8/8/5n2/8/R3K3 w - - 0 1").unwrap();
        assert!(pos.in_check());
        let moves = uci_set(&generate_moves(&mut pos));
        assert!(moves.iter().all(|m| m.starts_with("e1")));
        assert_eq!(moves, vec!["e1d1", "e1e2", "e1f1", "e1f2"]);
    }

    #[test]
    fn checkmate_has_no_moves() {
        let mut pos =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert!(pos.in_check());
        assert!(generate_moves(&mut pos).is_empty());
    }
}
