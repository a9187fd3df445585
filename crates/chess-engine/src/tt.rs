//! Transposition table.
//!
//! A fixed-size, power-of-two array of slots indexed by the low bits of the
//! Zobrist hash. Each slot is two relaxed atomics holding `key ^ data` and
//! `data`; any torn or stale read fails the key check and is a miss, so the
//! table is shared between search threads without locks.

use crate::search::{MATE, MAX_PLY};
use chess_core::Move;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Which side of the search window a stored score lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// The true score.
    Exact = 1,
    /// The score failed high: true score >= stored.
    Lower = 2,
    /// The score failed low: true score <= stored.
    Upper = 3,
}

impl Bound {
    fn from_bits(bits: u64) -> Option<Self> {
        match bits & 0b11 {
            1 => Some(Bound::Exact),
            2 => Some(Bound::Lower),
            3 => Some(Bound::Upper),
            _ => None,
        }
    }
}

/// Converts a root-relative mate score to one relative to the node at `ply`.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE - MAX_PLY as i32 {
        score + ply as i32
    } else if score <= -(MATE - MAX_PLY as i32) {
        score - ply as i32
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`].
#[inline]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE - MAX_PLY as i32 {
        score - ply as i32
    } else if score <= -(MATE - MAX_PLY as i32) {
        score + ply as i32
    } else {
        score
    }
}

/// A decoded table entry. `score` is node-relative; use
/// [`TtEntry::score_at`] to read it back at a given ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub hash: u64,
    pub best_move: Move,
    pub score: i32,
    pub depth: u8,
    pub generation: u8,
    pub bound: Bound,
}

impl TtEntry {
    const SCORE_SHIFT: u32 = 32;
    const DEPTH_SHIFT: u32 = 48;
    const GENERATION_SHIFT: u32 = 56;
    const BOUND_SHIFT: u32 = 62;

    fn pack(&self) -> u64 {
        self.best_move.bits() as u64
            | ((self.score as i16 as u16 as u64) << Self::SCORE_SHIFT)
            | ((self.depth as u64) << Self::DEPTH_SHIFT)
            | (((self.generation & TranspositionTable::GENERATION_MASK) as u64)
                << Self::GENERATION_SHIFT)
            | ((self.bound as u64) << Self::BOUND_SHIFT)
    }

    fn unpack(hash: u64, data: u64) -> Option<Self> {
        Some(TtEntry {
            hash,
            bound: Bound::from_bits(data >> Self::BOUND_SHIFT)?,
            best_move: Move::from_bits(data as u32),
            score: (data >> Self::SCORE_SHIFT) as u16 as i16 as i32,
            depth: (data >> Self::DEPTH_SHIFT) as u8,
            generation: ((data >> Self::GENERATION_SHIFT) as u8) & TranspositionTable::GENERATION_MASK,
        })
    }

    /// The stored score, corrected for a node at `ply` from the root.
    #[inline]
    pub fn score_at(&self, ply: usize) -> i32 {
        score_from_tt(self.score, ply)
    }

    /// The score if this entry may cut off a search of `depth` with window
    /// `(alpha, beta)` at `ply`.
    ///
    /// Requires `self.depth >= depth`. Exact entries are always usable;
    /// lower bounds only at or above `beta`; upper bounds only at or below
    /// `alpha`.
    pub fn usable_score(&self, alpha: i32, beta: i32, depth: u8, ply: usize) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        let score = self.score_at(ply);
        match self.bound {
            Bound::Exact => Some(score),
            Bound::Lower if score >= beta => Some(score),
            Bound::Upper if score <= alpha => Some(score),
            _ => None,
        }
    }
}

pub struct TranspositionTable {
    slots: Box<[[AtomicU64; 2]]>,
    mask: usize,
    generation: AtomicU8,
}

impl TranspositionTable {
    const GENERATION_MASK: u8 = 0x3F;

    /// A table with at least `entries` slots, rounded up to a power of two.
    pub fn new(entries: usize) -> Self {
        let len = entries.max(1).next_power_of_two();
        let slots = (0..len)
            .map(|_| [AtomicU64::new(0), AtomicU64::new(0)])
            .collect();
        tracing::debug!(entries = len, "transposition table allocated");
        TranspositionTable {
            slots,
            mask: len - 1,
            generation: AtomicU8::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Starts a new search generation; entries from older generations
    /// become replaceable regardless of depth.
    pub fn new_generation(&self) {
        let next = self.generation().wrapping_add(1) & Self::GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot[0].store(0, Ordering::Relaxed);
            slot[1].store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
        tracing::debug!("transposition table cleared");
    }

    #[inline]
    fn slot(&self, hash: u64) -> &[AtomicU64; 2] {
        &self.slots[hash as usize & self.mask]
    }

    /// Reads whatever occupies the slot for `hash`, whichever key it holds.
    fn load(&self, hash: u64) -> Option<TtEntry> {
        let slot = self.slot(hash);
        let check = slot[0].load(Ordering::Relaxed);
        let data = slot[1].load(Ordering::Relaxed);
        TtEntry::unpack(check ^ data, data)
    }

    /// The entry stored for `hash`, if any.
    pub fn probe(&self, hash: u64) -> Option<TtEntry> {
        self.load(hash).filter(|entry| entry.hash == hash)
    }

    /// Records a search result.
    ///
    /// `score` is root-relative and is converted for storage using `ply`.
    /// The slot is overwritten when it is empty, when its entry comes from
    /// another generation, or when it holds the same position searched less
    /// deeply than `depth`.
    pub fn store(&self, hash: u64, score: i32, depth: u8, bound: Bound, best_move: Move, ply: usize) {
        let generation = self.generation();
        let existing = self.load(hash);
        let mut best_move = best_move;
        if let Some(old) = existing {
            let same_position = old.hash == hash;
            let replace =
                old.generation != generation || (same_position && depth > old.depth);
            if !replace {
                return;
            }
            if same_position && best_move.is_null() {
                best_move = old.best_move;
            }
        }

        let entry = TtEntry {
            hash,
            best_move,
            score: score_to_tt(score, ply),
            depth,
            generation,
            bound,
        };
        let data = entry.pack();
        let slot = self.slot(hash);
        slot[0].store(hash ^ data, Ordering::Relaxed);
        slot[1].store(data, Ordering::Relaxed);
    }

    /// Per-mille of sampled slots written in the current generation.
    pub fn hashfull(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let generation = self.generation();
        let used = self.slots[..sample]
            .iter()
            .filter(|slot| {
                let data = slot[1].load(Ordering::Relaxed);
                TtEntry::unpack(0, data).is_some_and(|e| e.generation == generation)
            })
            .count();
        (used * 1000 / sample) as u32
    }
}
