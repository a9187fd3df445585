//! The threaded search engine.
//!
//! Long-lived workers block on a job channel between searches. A search
//! hands each worker a snapshot of the current position, then polls the
//! results channel until the main worker finishes or the time budget runs
//! out, in which case the shared stop flag is raised and the engine waits
//! for every worker to acknowledge before returning.

use crate::eval::{evaluate, EvalCache, EvalFn};
use crate::movegen::{self, generate_moves, perft::perft_divide, perft::perft_parallel};
use crate::search::time::SearchParams;
use crate::search::{SearchResult, SearchStats, Searcher, MATE, MAX_SEARCH_DEPTH};
use crate::tt::TranspositionTable;
use crate::{EngineConfig, EngineError, Position, PositionError};
use chess_core::Move;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Requests that a running search stop at its next poll.
///
/// Cloneable and usable from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

struct SearchJob {
    position: Position,
    start_depth: u8,
    max_depth: u8,
    report: bool,
}

enum WorkerMessage {
    Progress(SearchResult),
    Finished {
        worker: usize,
        result: Option<SearchResult>,
    },
}

struct Worker {
    jobs: Sender<SearchJob>,
    thread: Option<JoinHandle<()>>,
}

/// Tables and flags shared by every worker.
#[derive(Clone)]
struct Shared {
    tt: Arc<TranspositionTable>,
    eval_cache: Arc<EvalCache>,
    eval: EvalFn,
    stop: Arc<AtomicBool>,
}

pub struct Engine {
    config: EngineConfig,
    position: Position,
    shared: Shared,
    workers: Vec<Worker>,
    results: Receiver<WorkerMessage>,
    results_tx: Sender<WorkerMessage>,
}

impl Engine {
    /// An engine using the material evaluator.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_evaluator(config, evaluate)
    }

    /// An engine scoring leaves with `eval`.
    pub fn with_evaluator(config: EngineConfig, eval: EvalFn) -> Result<Self, EngineError> {
        config.validate()?;
        movegen::init();
        let shared = Shared {
            tt: Arc::new(TranspositionTable::new(config.hash_entries)),
            eval_cache: Arc::new(EvalCache::new(config.eval_cache_entries)),
            eval,
            stop: Arc::new(AtomicBool::new(false)),
        };
        let (results_tx, results) = unbounded();
        let mut engine = Engine {
            config,
            position: Position::startpos(),
            shared,
            workers: Vec::new(),
            results,
            results_tx,
        };
        engine.spawn_workers()?;
        Ok(engine)
    }

    fn spawn_worker(&self, id: usize) -> Result<Worker, EngineError> {
        let (jobs_tx, jobs) = unbounded();
        let shared = self.shared.clone();
        let results = self.results_tx.clone();
        let thread = thread::Builder::new()
            .name(format!("search-{id}"))
            .spawn(move || worker_loop(id, jobs, results, shared))
            .map_err(EngineError::Spawn)?;
        Ok(Worker {
            jobs: jobs_tx,
            thread: Some(thread),
        })
    }

    fn spawn_workers(&mut self) -> Result<(), EngineError> {
        for id in 0..self.config.threads {
            let worker = self.spawn_worker(id)?;
            self.workers.push(worker);
        }
        tracing::debug!(threads = self.workers.len(), "search workers started");
        Ok(())
    }

    /// Replaces workers whose threads have exited.
    fn revive_workers(&mut self) -> Result<(), EngineError> {
        for id in 0..self.workers.len() {
            let alive = self.workers[id]
                .thread
                .as_ref()
                .is_some_and(|t| !t.is_finished());
            if alive {
                continue;
            }
            if let Some(thread) = self.workers[id].thread.take() {
                if thread.join().is_err() {
                    tracing::warn!(worker = id, "search worker panicked");
                }
            }
            self.workers[id] = self.spawn_worker(id)?;
            tracing::warn!(worker = id, "search worker respawned");
        }
        Ok(())
    }

    fn shutdown_workers(&mut self) {
        self.shared.stop.store(true, Ordering::Relaxed);
        for mut worker in self.workers.drain(..) {
            drop(worker.jobs);
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    tracing::warn!("search worker panicked");
                }
            }
        }
        tracing::debug!("search workers stopped");
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Applies new settings, resizing tables and respawning workers as
    /// needed. Table contents are kept when the sizes do not change.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        config.validate()?;
        self.shutdown_workers();
        if config.hash_entries != self.config.hash_entries {
            self.shared.tt = Arc::new(TranspositionTable::new(config.hash_entries));
        }
        if config.eval_cache_entries != self.config.eval_cache_entries {
            self.shared.eval_cache = Arc::new(EvalCache::new(config.eval_cache_entries));
        }
        self.config = config;
        self.shared.stop.store(false, Ordering::Relaxed);
        self.spawn_workers()
    }

    /// Forgets everything learned: clears the tables and resets to the
    /// starting position.
    pub fn new_game(&mut self) {
        self.shared.tt.clear();
        self.shared.eval_cache.clear();
        self.position = Position::startpos();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.shared.stop))
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Sets the position from FEN followed by coordinate moves.
    pub fn set_position_from<I, S>(&mut self, fen: &str, moves: I) -> Result<(), PositionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut position = Position::from_fen(fen)?;
        position.apply_moves(moves)?;
        self.position = position;
        Ok(())
    }

    pub fn search(&mut self, params: &SearchParams) -> Result<SearchResult, EngineError> {
        self.search_with_progress(params, |_| {})
    }

    /// Searches the current position, calling `on_progress` once per
    /// completed depth.
    ///
    /// The returned move is never null while a legal move exists: if no
    /// iteration completes, the first legal move is returned.
    pub fn search_with_progress<F>(
        &mut self,
        params: &SearchParams,
        mut on_progress: F,
    ) -> Result<SearchResult, EngineError>
    where
        F: FnMut(&SearchResult),
    {
        let started = Instant::now();
        let game_ply = (self.position.fullmove_number().saturating_sub(1)) * 2
            + self.position.side_to_move().index() as u32;
        let budget = params.budget(game_ply, self.config.move_overhead());
        let max_depth = params
            .depth
            .unwrap_or(self.config.max_depth)
            .clamp(1, self.config.max_depth.min(MAX_SEARCH_DEPTH));

        tracing::info!(
            fen = %self.position,
            max_depth,
            budget_ms = budget.map(|b| b.as_millis() as u64),
            threads = self.workers.len(),
            "search started"
        );

        self.revive_workers()?;
        self.shared.tt.new_generation();
        self.shared.stop.store(false, Ordering::Relaxed);
        let snapshot = self.position.detached();
        for (id, worker) in self.workers.iter().enumerate() {
            let job = SearchJob {
                position: snapshot.clone(),
                // Helpers start one ply deeper on odd ids to desynchronize.
                start_depth: 1 + (id % 2) as u8,
                max_depth,
                report: id == 0,
            };
            worker
                .jobs
                .send(job)
                .map_err(|_| EngineError::WorkerDisconnected)?;
        }

        let mut pending = self.workers.len();
        let mut best: Option<SearchResult> = None;
        let mut timed_out = false;
        while pending > 0 {
            if !timed_out && budget.is_some_and(|b| started.elapsed() >= b) {
                self.shared.stop.store(true, Ordering::Relaxed);
                timed_out = true;
            }
            match self.results.recv_timeout(self.config.poll_interval()) {
                Ok(WorkerMessage::Progress(result)) => {
                    on_progress(&result);
                    best = Some(result);
                }
                Ok(WorkerMessage::Finished { worker, result }) => {
                    pending -= 1;
                    if worker == 0 {
                        if let Some(result) = result {
                            best = Some(result);
                        }
                        // Helpers only feed the table; release them.
                        self.shared.stop.store(true, Ordering::Relaxed);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let dead = self
                        .workers
                        .iter()
                        .any(|w| w.thread.as_ref().map_or(true, |t| t.is_finished()));
                    if dead {
                        return Err(EngineError::WorkerDisconnected);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::WorkerDisconnected)
                }
            }
        }

        let mut result = match best {
            Some(result) if !result.best_move.is_null() => result,
            _ => self.fallback_result(),
        };
        result.stats.elapsed = started.elapsed();

        tracing::info!(
            best = %result.best_move,
            score = result.score,
            depth = result.depth,
            nodes = result.stats.nodes,
            elapsed_ms = result.stats.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(result)
    }

    /// The first legal move, or a null move with the terminal score when
    /// there is none.
    fn fallback_result(&mut self) -> SearchResult {
        let moves = generate_moves(&mut self.position);
        let (best_move, score) = match moves.iter().next() {
            Some(&m) => {
                tracing::warn!(fallback = %m, "no iteration completed, playing first legal move");
                (m, 0)
            }
            None if self.position.in_check() => (Move::NULL, -MATE),
            None => (Move::NULL, 0),
        };
        SearchResult {
            best_move,
            score,
            depth: 0,
            pv: if best_move.is_null() {
                Vec::new()
            } else {
                vec![best_move]
            },
            stats: SearchStats::default(),
        }
    }

    /// Leaf count of the legal move tree from the current position, using
    /// the configured thread count.
    pub fn perft(&self, depth: u32) -> u64 {
        perft_parallel(&self.position, depth, self.config.threads)
    }

    /// Per-root-move leaf counts.
    pub fn divide(&self, depth: u32) -> Vec<(Move, u64)> {
        perft_divide(&mut self.position.detached(), depth)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown_workers();
    }
}

fn worker_loop(
    id: usize,
    jobs: Receiver<SearchJob>,
    results: Sender<WorkerMessage>,
    shared: Shared,
) {
    let new_searcher = || {
        Searcher::new(
            Arc::clone(&shared.tt),
            Arc::clone(&shared.eval_cache),
            shared.eval,
            Arc::clone(&shared.stop),
        )
    };
    let mut searcher = new_searcher();
    // A closed job channel is the shutdown signal.
    while let Ok(job) = jobs.recv() {
        let SearchJob {
            mut position,
            start_depth,
            max_depth,
            report,
        } = job;
        let run = panic::catch_unwind(AssertUnwindSafe(|| {
            searcher.iterate(&mut position, start_depth, max_depth, |r| {
                if report {
                    let _ = results.send(WorkerMessage::Progress(r.clone()));
                }
            })
        }));
        let result = match run {
            Ok(result) if report => result,
            Ok(_) => None,
            Err(_) => {
                tracing::error!(worker = id, "search panicked, result discarded");
                searcher = new_searcher();
                None
            }
        };
        if results
            .send(WorkerMessage::Finished { worker: id, result })
            .is_err()
        {
            break;
        }
    }
    tracing::debug!(worker = id, "search worker exiting");
}
