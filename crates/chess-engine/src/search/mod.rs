//! Iterative-deepening alpha-beta search.
//!
//! A [`Searcher`] holds one thread's search state (killers, principal
//! variation, statistics) and shares the transposition table, evaluation
//! cache and stop flag with the other workers.

pub mod time;

use crate::eval::{piece_value, EvalCache, EvalFn};
use crate::movegen::{generate_captures, generate_moves, MoveList};
use crate::tt::{Bound, TranspositionTable};
use crate::Position;
use chess_core::{Color, Move};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Score for delivering mate at the root.
pub const MATE: i32 = 30_000;
/// Outside every reachable score.
pub const INFINITY: i32 = 31_000;
/// Deepest ply any search line may reach, quiescence included.
pub const MAX_PLY: usize = 128;
/// Deepest nominal iteration; the gap to [`MAX_PLY`] absorbs extensions.
pub const MAX_SEARCH_DEPTH: u8 = 100;

/// Draw score offered to the side that did not start the search.
const CONTEMPT: i32 = 10;
const NULL_MOVE_REDUCTION: i32 = 2;
/// Moves searched at full depth before reductions start.
const LMR_FULL_DEPTH_MOVES: usize = 3;
const LMR_MIN_DEPTH: i32 = 3;
/// Longest line rebuilt from the transposition table after a cutoff.
const PV_TT_WALK: usize = 16;
/// Stop deepening once a mate this close to the maximum is proven.
const MATE_FOUND: i32 = MATE - 100;

/// Counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Main-search and quiescence nodes.
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
    pub null_cutoffs: u64,
    pub lmr_researches: u64,
    pub beta_cutoffs: u64,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn nps(&self) -> u64 {
        let micros = self.elapsed.as_micros().max(1);
        (self.nodes as u128 * 1_000_000 / micros) as u64
    }
}

/// The outcome of a completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    /// Centipawns from the side to move, or a mate score.
    pub score: i32,
    pub depth: u8,
    pub pv: Vec<Move>,
    pub stats: SearchStats,
}

impl SearchResult {
    /// Full moves to mate, negative when the side to move is getting mated.
    pub fn mate_in(&self) -> Option<i32> {
        let plies = MATE - self.score.abs();
        if plies > MAX_PLY as i32 {
            return None;
        }
        let moves = (plies + 1) / 2;
        Some(if self.score > 0 { moves } else { -moves })
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {} score ", self.depth)?;
        match self.mate_in() {
            Some(moves) => write!(f, "mate {moves}")?,
            None => write!(f, "cp {}", self.score)?,
        }
        write!(
            f,
            " nodes {} nps {} time {}",
            self.stats.nodes,
            self.stats.nps(),
            self.stats.elapsed.as_millis()
        )?;
        if !self.pv.is_empty() {
            f.write_str(" pv")?;
            for m in &self.pv {
                write!(f, " {m}")?;
            }
        }
        Ok(())
    }
}

/// Triangular principal-variation table: row `ply` holds the best line
/// found from that ply, in `moves[ply][ply..len[ply]]`.
struct PvTable {
    moves: Box<[[Move; MAX_PLY + 1]; MAX_PLY + 1]>,
    len: [usize; MAX_PLY + 1],
}

impl PvTable {
    fn new() -> Self {
        PvTable {
            moves: Box::new([[Move::NULL; MAX_PLY + 1]; MAX_PLY + 1]),
            len: [0; MAX_PLY + 1],
        }
    }

    #[inline]
    fn clear(&mut self, ply: usize) {
        self.len[ply] = ply;
    }

    /// Sets row `ply` to `m` followed by the child's line.
    fn update(&mut self, ply: usize, m: Move) {
        self.moves[ply][ply] = m;
        let child_len = self.len[ply + 1].max(ply + 1);
        for i in ply + 1..child_len {
            self.moves[ply][i] = self.moves[ply + 1][i];
        }
        self.len[ply] = child_len;
    }

    fn line(&self, ply: usize) -> &[Move] {
        &self.moves[ply][ply..self.len[ply]]
    }
}

/// One thread's search state.
pub struct Searcher {
    tt: Arc<TranspositionTable>,
    eval_cache: Arc<EvalCache>,
    eval: EvalFn,
    stop: Arc<AtomicBool>,
    killers: Box<[[Move; 2]; MAX_PLY + 1]>,
    pv: PvTable,
    stats: SearchStats,
    root_side: Color,
    aborted: bool,
    started: Instant,
}

impl Searcher {
    pub fn new(
        tt: Arc<TranspositionTable>,
        eval_cache: Arc<EvalCache>,
        eval: EvalFn,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Searcher {
            tt,
            eval_cache,
            eval,
            stop,
            killers: Box::new([[Move::NULL; 2]; MAX_PLY + 1]),
            pv: PvTable::new(),
            stats: SearchStats::default(),
            root_side: Color::White,
            aborted: false,
            started: Instant::now(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Deepens from `start_depth` to `max_depth`, calling `on_depth` after
    /// each completed iteration.
    ///
    /// Returns the last completed iteration, or `None` if the stop flag cut
    /// off the first one. The position is always left as it was given.
    pub fn iterate<F>(
        &mut self,
        position: &mut Position,
        start_depth: u8,
        max_depth: u8,
        mut on_depth: F,
    ) -> Option<SearchResult>
    where
        F: FnMut(&SearchResult),
    {
        self.stats = SearchStats::default();
        self.killers.fill([Move::NULL; 2]);
        self.root_side = position.side_to_move();
        self.aborted = false;
        self.started = Instant::now();

        let max_depth = max_depth.min(MAX_SEARCH_DEPTH);
        let mut completed = None;
        for depth in start_depth.max(1)..=max_depth {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let Some(score) = self.search(position, depth as i32, 0, -INFINITY, INFINITY) else {
                break;
            };

            let pv = self.pv.line(0).to_vec();
            let best_move = pv.first().copied().unwrap_or(Move::NULL);
            self.stats.elapsed = self.started.elapsed();
            let result = SearchResult {
                best_move,
                score,
                depth,
                pv,
                stats: self.stats,
            };
            tracing::debug!(
                depth,
                score,
                nodes = self.stats.nodes,
                best = %best_move,
                "iteration complete"
            );
            on_depth(&result);
            completed = Some(result);

            if score.abs() >= MATE_FOUND {
                break;
            }
        }
        completed
    }

    /// True once the search must unwind. Sticky for the rest of the search.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if !self.aborted && self.stop.load(Ordering::Relaxed) {
            self.aborted = true;
        }
        self.aborted
    }

    #[inline]
    fn static_eval(&self, position: &Position) -> i32 {
        self.eval_cache.evaluate(position, self.eval)
    }

    #[inline]
    fn draw_score(&self, position: &Position) -> i32 {
        if position.side_to_move() == self.root_side {
            -CONTEMPT
        } else {
            CONTEMPT
        }
    }

    /// Alpha-beta over `depth` plies from a node `ply` plies below the root.
    ///
    /// `None` means the search was stopped and the subtree has no score.
    fn search(
        &mut self,
        position: &mut Position,
        depth: i32,
        ply: usize,
        mut alpha: i32,
        beta: i32,
    ) -> Option<i32> {
        self.pv.clear(ply);
        if self.should_stop() {
            return None;
        }
        if ply > 0 && (position.is_fifty_move_draw() || position.is_repetition()) {
            return Some(self.draw_score(position));
        }
        if ply >= MAX_PLY {
            return Some(self.static_eval(position));
        }

        let hash = position.hash();
        let mut tt_move = Move::NULL;
        if let Some(entry) = self.tt.probe(hash) {
            self.stats.tt_hits += 1;
            tt_move = entry.best_move;
            if ply > 0 {
                let probe_depth = depth.clamp(0, u8::MAX as i32) as u8;
                if let Some(score) = entry.usable_score(alpha, beta, probe_depth, ply) {
                    self.stats.tt_cutoffs += 1;
                    if !tt_move.is_null() {
                        self.pv_from_tt(position, ply);
                    }
                    return Some(score);
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(position, ply, alpha, beta);
        }
        self.stats.nodes += 1;

        let in_check = position.in_check();
        if ply > 0
            && !in_check
            && depth >= 3
            && position.last_move().is_some_and(|m| !m.is_null())
        {
            position.apply_null();
            let score = self.search(
                position,
                depth - 1 - NULL_MOVE_REDUCTION,
                ply + 1,
                -beta,
                -beta + 1,
            );
            position.undo_null();
            if -score? >= beta {
                self.stats.null_cutoffs += 1;
                return Some(beta);
            }
        }

        let mut moves = generate_moves(position);
        if moves.is_empty() {
            return Some(if in_check { -MATE + ply as i32 } else { 0 });
        }
        self.order_moves(&mut moves, tt_move, ply);

        let original_alpha = alpha;
        let mut best_move = Move::NULL;
        for (i, &m) in moves.iter().enumerate() {
            position.apply(m);
            let extension = i32::from(position.in_check());
            let reduce = i >= LMR_FULL_DEPTH_MOVES
                && depth >= LMR_MIN_DEPTH
                && extension == 0
                && !m.is_capture();
            let score = self.search_move(position, depth - 1 + extension, ply, alpha, beta, reduce);
            position.undo(m);
            let score = score?;

            if score >= beta {
                self.stats.beta_cutoffs += 1;
                self.tt.store(hash, beta, depth as u8, Bound::Lower, m, ply);
                if !m.is_capture() {
                    self.record_killer(ply, m);
                }
                return Some(beta);
            }
            if score > alpha {
                alpha = score;
                best_move = m;
                self.pv.update(ply, m);
            }
        }

        let bound = if alpha > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(hash, alpha, depth as u8, bound, best_move, ply);
        Some(alpha)
    }

    /// Searches the child reached by the move just applied, trying a
    /// reduced null-window search first when `reduce` is set.
    fn search_move(
        &mut self,
        position: &mut Position,
        depth: i32,
        ply: usize,
        alpha: i32,
        beta: i32,
        reduce: bool,
    ) -> Option<i32> {
        if reduce {
            let reduced = -self.search(position, depth - 1, ply + 1, -alpha - 1, -alpha)?;
            if reduced <= alpha {
                return Some(reduced);
            }
            self.stats.lmr_researches += 1;
        }
        Some(-self.search(position, depth, ply + 1, -beta, -alpha)?)
    }

    /// Capture-only search below the horizon.
    fn quiescence(
        &mut self,
        position: &mut Position,
        ply: usize,
        mut alpha: i32,
        beta: i32,
    ) -> Option<i32> {
        self.pv.clear(ply);
        if self.should_stop() {
            return None;
        }
        self.stats.nodes += 1;
        self.stats.qnodes += 1;
        if ply >= MAX_PLY {
            return Some(self.static_eval(position));
        }

        let hash = position.hash();
        if let Some(entry) = self.tt.probe(hash) {
            self.stats.tt_hits += 1;
            if let Some(score) = entry.usable_score(alpha, beta, 0, ply) {
                self.stats.tt_cutoffs += 1;
                return Some(score);
            }
        }

        let stand_pat = self.static_eval(position);
        if stand_pat >= beta {
            self.tt.store(hash, beta, 0, Bound::Lower, Move::NULL, ply);
            return Some(beta);
        }
        alpha = alpha.max(stand_pat);

        let mut captures = generate_captures(position);
        captures
            .as_mut_slice()
            .sort_by_key(|m| std::cmp::Reverse(mvv_lva(*m)));

        let mut best_move = Move::NULL;
        for &m in captures.iter() {
            position.apply(m);
            let score = self.quiescence(position, ply + 1, -beta, -alpha);
            position.undo(m);
            let score = -score?;

            if score >= beta {
                self.tt.store(hash, beta, 0, Bound::Lower, m, ply);
                return Some(beta);
            }
            if score > alpha {
                alpha = score;
                best_move = m;
                self.pv.update(ply, m);
            }
        }

        let bound = if best_move.is_null() {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.tt.store(hash, alpha, 0, bound, best_move, ply);
        Some(alpha)
    }

    /// TT move first, then this ply's killers, then generation order.
    fn order_moves(&self, moves: &mut MoveList, tt_move: Move, ply: usize) {
        let killers = self.killers[ply];
        moves.as_mut_slice().sort_by_key(|&m| {
            if m == tt_move {
                0
            } else if m == killers[0] {
                1
            } else if m == killers[1] {
                2
            } else {
                3
            }
        });
    }

    fn record_killer(&mut self, ply: usize, m: Move) {
        let slot = &mut self.killers[ply];
        if slot[0] != m {
            slot[1] = slot[0];
            slot[0] = m;
        }
    }

    /// Rebuilds the line below a TT cutoff at `ply` by following stored
    /// best moves, checking each one is legal before playing it.
    fn pv_from_tt(&mut self, position: &mut Position, ply: usize) {
        let mut played = Vec::new();
        let mut len = ply;
        let limit = (ply + PV_TT_WALK).min(MAX_PLY);
        while len < limit {
            let Some(entry) = self.tt.probe(position.hash()) else {
                break;
            };
            let m = entry.best_move;
            if m.is_null() || !generate_moves(position).contains(m) {
                break;
            }
            self.pv.moves[ply][len] = m;
            len += 1;
            position.apply(m);
            played.push(m);
            if position.is_repetition() {
                break;
            }
        }
        for m in played.into_iter().rev() {
            position.undo(m);
        }
        self.pv.len[ply] = len;
    }
}

/// Most valuable victim, least valuable attacker.
fn mvv_lva(m: Move) -> i32 {
    let victim = m.captured().map_or(0, |p| piece_value(p.kind()));
    let promotion = m.promotion().map_or(0, |p| piece_value(p.kind()));
    victim * 10 + promotion - piece_value(m.piece().kind()) / 10
}
