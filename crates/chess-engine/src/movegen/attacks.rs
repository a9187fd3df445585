//! Attack tables for the non-sliding pieces, pawn pushes, and ray geometry.

use crate::Bitboard;
use chess_core::{Color, Square};
use std::sync::OnceLock;

pub use super::magics::{
    bishop_attacks, bishop_attacks_traced, queen_attacks, rook_attacks, rook_attacks_traced,
};

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&[
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
]);

const KING_ATTACKS: [Bitboard; 64] = leaper_table(&[
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
]);

/// Diagonal capture squares, `[color][square]`.
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(1, 1), (1, -1)]),
    leaper_table(&[(-1, 1), (-1, -1)]),
];

/// Builds a per-square table from (rank, file) offsets, dropping targets that
/// fall off the board.
const fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let r = rank + offsets[i].0;
            let f = file + offsets[i].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    table
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.idx()]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.idx()]
}

/// Squares a pawn of `color` on `sq` captures on.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.idx()]
}

/// Forward pushes for a pawn of `color` on `sq`.
///
/// The single push is blocked by any occupant. The double push exists only
/// from the pawn's home rank and needs both the intermediate and landing
/// squares empty.
#[inline]
pub fn pawn_pushes(sq: Square, color: Color, occupied: Bitboard) -> Bitboard {
    let single = match sq.offset(color.pawn_step()) {
        Some(target) if !occupied.contains(target) => target,
        _ => return Bitboard::EMPTY,
    };
    let mut pushes = Bitboard::from_square(single);
    if sq.rank() == color.pawn_rank() {
        if let Some(double) = single.offset(color.pawn_step()) {
            if !occupied.contains(double) {
                pushes.set(double);
            }
        }
    }
    pushes
}

/// Line and segment geometry between square pairs.
struct RayTables {
    /// Squares strictly between two aligned squares; empty if not aligned.
    between: Vec<[Bitboard; 64]>,
    /// The full edge-to-edge line through two aligned squares; empty if not
    /// aligned.
    line: Vec<[Bitboard; 64]>,
}

static RAY_TABLES: OnceLock<RayTables> = OnceLock::new();

fn ray_tables() -> &'static RayTables {
    RAY_TABLES.get_or_init(|| {
        let mut between = vec![[Bitboard::EMPTY; 64]; 64];
        let mut line = vec![[Bitboard::EMPTY; 64]; 64];
        for a in Square::all() {
            let a_bb = Bitboard::from_square(a);
            for b in Square::all() {
                if a == b {
                    continue;
                }
                let b_bb = Bitboard::from_square(b);
                for (empty_rays, traced) in [
                    (
                        bishop_attacks_traced(a, Bitboard::EMPTY),
                        bishop_attacks_traced as fn(Square, Bitboard) -> Bitboard,
                    ),
                    (rook_attacks_traced(a, Bitboard::EMPTY), rook_attacks_traced),
                ] {
                    if empty_rays.contains(b) {
                        between[a.idx()][b.idx()] = traced(a, b_bb) & traced(b, a_bb);
                        line[a.idx()][b.idx()] =
                            (empty_rays & traced(b, Bitboard::EMPTY)) | a_bb | b_bb;
                    }
                }
            }
        }
        RayTables { between, line }
    })
}

/// Squares strictly between `a` and `b` when they share a rank, file or
/// diagonal.
#[inline]
pub fn between(a: Square, b: Square) -> Bitboard {
    ray_tables().between[a.idx()][b.idx()]
}

/// The whole line through `a` and `b` (both included) when aligned.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    ray_tables().line[a.idx()][b.idx()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn knight_counts() {
        assert_eq!(knight_attacks(sq("d4")).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(sq("a4")).count(), 4);
        let e4 = knight_attacks(sq("e4"));
        for target in ["d6", "f6", "g5", "g3", "f2", "d2", "c3", "c5"] {
            assert!(e4.contains(sq(target)), "{target}");
        }
    }

    #[test]
    fn king_counts() {
        assert_eq!(king_attacks(sq("d4")).count(), 8);
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(sq("a4")).count(), 5);
    }

    #[test]
    fn pawn_captures_by_color() {
        let white = pawn_attacks(sq("d4"), Color::White);
        assert_eq!(white, Bitboard::from_squares(&[sq("c5"), sq("e5")]));
        let black = pawn_attacks(sq("d4"), Color::Black);
        assert_eq!(black, Bitboard::from_squares(&[sq("c3"), sq("e3")]));
        assert_eq!(pawn_attacks(sq("a4"), Color::White).count(), 1);
        assert_eq!(pawn_attacks(sq("d8"), Color::White).count(), 0);
    }

    #[test]
    fn pawn_pushes_respect_blockers() {
        let empty = Bitboard::EMPTY;
        assert_eq!(
            pawn_pushes(sq("e2"), Color::White, empty),
            Bitboard::from_squares(&[sq("e3"), sq("e4")])
        );
        assert_eq!(
            pawn_pushes(sq("e7"), Color::Black, empty),
            Bitboard::from_squares(&[sq("e6"), sq("e5")])
        );
        assert_eq!(
            pawn_pushes(sq("e3"), Color::White, empty),
            Bitboard::from_square(sq("e4"))
        );

        let blocked_landing = Bitboard::from_square(sq("e4"));
        assert_eq!(
            pawn_pushes(sq("e2"), Color::White, blocked_landing),
            Bitboard::from_square(sq("e3"))
        );
        let blocked_front = Bitboard::from_square(sq("e3"));
        assert!(pawn_pushes(sq("e2"), Color::White, blocked_front).is_empty());
    }

    #[test]
    fn between_and_line() {
        assert_eq!(
            between(Square::A1, sq("d4")),
            Bitboard::from_squares(&[sq("b2"), sq("c3")])
        );
        assert_eq!(between(Square::E1, Square::H1), Bitboard::from_squares(&[Square::F1, Square::G1]));
        assert!(between(Square::A1, sq("b3")).is_empty());
        assert!(between(Square::A1, Square::B1).is_empty());

        let file_e = line(Square::E1, sq("e5"));
        assert_eq!(file_e.count(), 8);
        assert!(file_e.contains(Square::E8));
        assert!(line(Square::A1, sq("b3")).is_empty());
        assert_eq!(line(sq("c3"), sq("d4")), line(Square::A1, Square::H8));
    }
}
