//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth;
//! the totals are compared against published values.

use super::generate_moves;
use crate::Position;
use chess_core::Move;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;

/// Counts leaf nodes at `depth`. The position is restored on return.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &m in &moves {
        position.apply(m);
        nodes += perft(position, depth - 1);
        position.undo(m);
    }
    nodes
}

/// Per-root-move subtree counts, sorted by coordinate notation.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let moves = generate_moves(position);
    let mut results = Vec::with_capacity(moves.len());
    for &m in &moves {
        position.apply(m);
        results.push((m, perft(position, depth - 1)));
        position.undo(m);
    }
    results.sort_by_key(|(m, _)| m.to_uci());
    results
}

/// [`perft`] with root moves shared out across `threads` workers.
///
/// Each worker pulls root moves from a shared counter and walks them on its
/// own copy of the position.
pub fn perft_parallel(position: &Position, depth: u32, threads: usize) -> u64 {
    let mut root = position.detached();
    if depth <= 1 || threads <= 1 {
        return perft(&mut root, depth);
    }

    let moves = generate_moves(&mut root);
    let next = AtomicUsize::new(0);
    let total = AtomicU64::new(0);

    thread::scope(|scope| {
        for _ in 0..threads.min(moves.len()) {
            let mut local = root.clone();
            let (moves, next, total) = (&moves, &next, &total);
            scope.spawn(move || loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                let Some(&m) = moves.as_slice().get(i) else {
                    break;
                };
                local.apply(m);
                total.fetch_add(perft(&mut local, depth - 1), Ordering::Relaxed);
                local.undo(m);
            });
        }
    });

    total.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_shallow() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 0), 1);
        assert_eq!(perft(&mut position, 1), 20);
        assert_eq!(perft(&mut position, 2), 400);
        assert_eq!(perft(&mut position, 3), 8902);
        assert_eq!(position, Position::startpos());
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut position = Position::startpos();
        let divided = perft_divide(&mut position, 3);
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 8902);
        assert_eq!(divided[0].0.to_uci(), "a2a3");
        let e2e4 = divided.iter().find(|(m, _)| m.to_uci() == "e2e4").unwrap();
        assert_eq!(e2e4.1, 600);
    }

    #[test]
    fn parallel_matches_serial() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft_parallel(&position, 3, 4), 97862);
        assert_eq!(perft_parallel(&position, 1, 4), 48);
    }

    // Positions 3-5 from the Chess Programming Wiki perft results.
    #[test]
    fn endgame_position() {
        let mut position = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&mut position, 1), 14);
        assert_eq!(perft(&mut position, 2), 191);
        assert_eq!(perft(&mut position, 3), 2812);
        assert_eq!(perft(&mut position, 4), 43238);
    }

    #[test]
    fn promotion_heavy_position() {
        let mut position =
            Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
                .unwrap();
        assert_eq!(perft(&mut position, 1), 6);
        assert_eq!(perft(&mut position, 2), 264);
        assert_eq!(perft(&mut position, 3), 9467);
    }

    #[test]
    fn position_five() {
        let mut position =
            Position::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8")
                .unwrap();
        assert_eq!(perft(&mut position, 1), 44);
        assert_eq!(perft(&mut position, 2), 1486);
        assert_eq!(perft(&mut position, 3), 62379);
    }
}
