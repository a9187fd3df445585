//! Static evaluation and the evaluation cache.

use crate::Position;
use chess_core::{Color, PieceKind};
use std::sync::atomic::{AtomicU64, Ordering};

/// A scoring function: centipawns, positive favors the side to move.
pub type EvalFn = fn(&Position) -> i32;

/// Material value of a piece kind in centipawns. Kings are not counted.
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0,
    }
}

/// Material balance from the side to move's point of view.
pub fn evaluate(position: &Position) -> i32 {
    let us = position.side_to_move();
    let material = |color: Color| -> i32 {
        PieceKind::ALL
            .iter()
            .map(|&kind| position.pieces(kind, color).count() as i32 * piece_value(kind))
            .sum()
    };
    material(us) - material(!us)
}

/// Hash-indexed cache of evaluation results, always-replace.
///
/// Entries are stored as `(key ^ data, data)` so a slot torn by a
/// concurrent writer fails the key check and reads as a miss. A hit may
/// still belong to a different position with the same hash; callers treat
/// the value as advisory.
pub struct EvalCache {
    slots: Box<[[AtomicU64; 2]]>,
    mask: usize,
}

impl EvalCache {
    const BLACK_BIT: u64 = 1 << 32;

    /// A cache with at least `entries` slots, rounded up to a power of two.
    pub fn new(entries: usize) -> Self {
        let len = entries.max(1).next_power_of_two();
        let slots = (0..len)
            .map(|_| [AtomicU64::new(0), AtomicU64::new(0)])
            .collect();
        EvalCache {
            slots,
            mask: len - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, hash: u64) -> &[AtomicU64; 2] {
        &self.slots[hash as usize & self.mask]
    }

    /// The cached score for `hash` from `side`'s point of view.
    pub fn probe(&self, hash: u64, side: Color) -> Option<i32> {
        let slot = self.slot(hash);
        let check = slot[0].load(Ordering::Relaxed);
        let data = slot[1].load(Ordering::Relaxed);
        if data == 0 || check ^ data != hash {
            return None;
        }
        let score = data as u32 as i32;
        let stored_for_black = data & Self::BLACK_BIT != 0;
        Some(if stored_for_black == (side == Color::Black) {
            score
        } else {
            -score
        })
    }

    /// Records `score`, computed with `side` to move.
    pub fn store(&self, hash: u64, side: Color, score: i32) {
        let mut data = score as u32 as u64;
        if side == Color::Black {
            data |= Self::BLACK_BIT;
        }
        // Tags the entry as occupied even for a White score of zero.
        data |= 1 << 33;
        let slot = self.slot(hash);
        slot[0].store(hash ^ data, Ordering::Relaxed);
        slot[1].store(data, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot[0].store(0, Ordering::Relaxed);
            slot[1].store(0, Ordering::Relaxed);
        }
    }

    /// Evaluates through the cache.
    pub fn evaluate(&self, position: &Position, eval: EvalFn) -> i32 {
        let side = position.side_to_move();
        if let Some(score) = self.probe(position.hash(), side) {
            return score;
        }
        let score = eval(position);
        self.store(position.hash(), side, score);
        score
    }
}
