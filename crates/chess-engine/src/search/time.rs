//! Search limits and per-move time budgeting.

use std::time::Duration;

/// Shortest budget handed to a clock-based search.
pub const MIN_BUDGET: Duration = Duration::from_millis(50);

/// A player's clock under a time control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub remaining: Duration,
    pub increment: Duration,
    /// Moves until the next time control, when the control has one.
    pub moves_to_go: Option<u32>,
}

/// What bounds a search.
///
/// Limits combine: the search ends at whichever is hit first. With no limit
/// at all the search runs to the configured maximum depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub depth: Option<u8>,
    pub move_time: Option<Duration>,
    pub clock: Option<Clock>,
    /// Ignore time entirely and run until stopped or out of depth.
    pub infinite: bool,
}

impl SearchParams {
    pub fn depth(depth: u8) -> Self {
        SearchParams {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn move_time(time: Duration) -> Self {
        SearchParams {
            move_time: Some(time),
            ..Default::default()
        }
    }

    pub fn clock(clock: Clock) -> Self {
        SearchParams {
            clock: Some(clock),
            ..Default::default()
        }
    }

    pub fn infinite() -> Self {
        SearchParams {
            infinite: true,
            ..Default::default()
        }
    }

    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = Some(depth);
        self
    }

    /// The wall-clock budget for this search, if any.
    ///
    /// A fixed move time wins over a clock. `game_ply` is the number of
    /// half-moves played in the game and feeds the moves-to-go estimate.
    pub fn budget(&self, game_ply: u32, overhead: Duration) -> Option<Duration> {
        if self.infinite {
            return None;
        }
        if let Some(time) = self.move_time {
            return Some(time.saturating_sub(overhead).max(Duration::from_millis(1)));
        }
        self.clock
            .as_ref()
            .map(|clock| clock_budget(clock, game_ply, overhead))
    }
}

/// Expected moves left in the game by phase, for clocks without a
/// moves-to-go count.
pub fn estimated_moves_to_go(game_ply: u32) -> u32 {
    match game_ply {
        0..=19 => 40,
        20..=59 => 30,
        _ => 20,
    }
}

/// `remaining / moves_to_go + increment / 2`, less `overhead`, capped at a
/// fifth of the remaining time and never below [`MIN_BUDGET`].
pub fn clock_budget(clock: &Clock, game_ply: u32, overhead: Duration) -> Duration {
    let moves_to_go = match clock.moves_to_go {
        Some(n) if (1..=200).contains(&n) => n,
        supplied => {
            if let Some(n) = supplied {
                tracing::warn!(
                    moves_to_go = n,
                    "ignoring unreasonable moves-to-go, using phase estimate"
                );
            }
            estimated_moves_to_go(game_ply)
        }
    };

    let budget = clock.remaining / moves_to_go + clock.increment / 2;
    budget
        .saturating_sub(overhead)
        .min(clock.remaining / 5)
        .max(MIN_BUDGET)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn clock(remaining: u64, increment: u64, moves_to_go: Option<u32>) -> Clock {
        Clock {
            remaining: ms(remaining),
            increment: ms(increment),
            moves_to_go,
        }
    }

    #[test]
    fn moves_to_go_splits_remaining_time() {
        assert_eq!(clock_budget(&clock(60_000, 0, Some(30)), 0, ms(0)), ms(2_000));
        assert_eq!(
            clock_budget(&clock(60_000, 2_000, Some(30)), 0, ms(0)),
            ms(3_000)
        );
        assert_eq!(
            clock_budget(&clock(60_000, 2_000, Some(30)), 0, ms(100)),
            ms(2_900)
        );
    }

    #[test]
    fn phase_estimate_when_missing_or_unreasonable() {
        assert_eq!(clock_budget(&clock(40_000, 0, None), 10, ms(0)), ms(1_000));
        assert_eq!(clock_budget(&clock(30_000, 0, None), 40, ms(0)), ms(1_000));
        assert_eq!(clock_budget(&clock(20_000, 0, None), 80, ms(0)), ms(1_000));
        assert_eq!(clock_budget(&clock(40_000, 0, Some(0)), 10, ms(0)), ms(1_000));
        assert_eq!(clock_budget(&clock(40_000, 0, Some(500)), 10, ms(0)), ms(1_000));
    }

    #[test]
    fn capped_and_floored() {
        // One move to go would use everything; the cap keeps 80%.
        assert_eq!(clock_budget(&clock(10_000, 0, Some(1)), 0, ms(0)), ms(2_000));
        assert_eq!(clock_budget(&clock(100, 0, Some(1)), 0, ms(0)), MIN_BUDGET);
    }

    #[test]
    fn params_budget() {
        assert_eq!(SearchParams::depth(5).budget(0, ms(10)), None);
        assert_eq!(SearchParams::infinite().budget(0, ms(10)), None);
        assert_eq!(
            SearchParams::move_time(ms(500)).budget(0, ms(10)),
            Some(ms(490))
        );
        let params = SearchParams::clock(clock(60_000, 0, Some(30))).with_depth(4);
        assert_eq!(params.depth, Some(4));
        assert_eq!(params.budget(0, ms(0)), Some(ms(2_000)));
    }
}
