//! Per-game solution-space tracker. Spec §3 ("Match"), §4.2.

pub mod adaptive;
pub mod recommend;

use fixedbitset::FixedBitSet;

use crate::Code;
use crate::Context;
use crate::context::feedback::FeedbackIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Pending,
    Won,
    Lost,
}

/// one guess/feedback pair in a match's history.
pub type Turn = (Code, FeedbackIndex);

/// a single code-breaker's progress against one secret: history, state,
/// and (if tracking is enabled) the bit set of still-plausible secrets.
pub struct Match<'a> {
    ctx: &'a Context,
    turns: Vec<Turn>,
    state: MatchState,
    solution_space: Option<FixedBitSet>,
    num_solutions: u32,
}

impl<'a> Match<'a> {
    /// `track = true` maintains `solution_space`/`num_solutions`; disable it
    /// for matches the recommender/adaptive code-maker never need to query
    /// (e.g. a human code-breaker playing without a hint), saving the
    /// `⌈M/8⌉`-byte bit set per spec §5.
    pub fn new(ctx: &'a Context, track: bool) -> Self {
        let solution_space = track.then(|| {
            let mut bits = FixedBitSet::with_capacity(ctx.num_codes() as usize);
            bits.set_range(.., true);
            bits
        });
        Self {
            ctx,
            turns: Vec::new(),
            state: MatchState::Pending,
            num_solutions: if track { ctx.num_codes() } else { 0 },
            solution_space,
        }
    }

    pub fn context(&self) -> &'a Context {
        self.ctx
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// `u32::MAX` when tracking is disabled, matching the original's
    /// `UINT16_MAX` sentinel for "unavailable" (spec §4.2/§7: degraded mode
    /// makes the recommendation/count unavailable, not a crash).
    pub fn num_solutions(&self) -> u32 {
        if self.solution_space.is_some() {
            self.num_solutions
        } else {
            u32::MAX
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.solution_space.is_some()
    }

    pub(crate) fn solution_space(&self) -> Option<&FixedBitSet> {
        self.solution_space.as_ref()
    }

    /// append `(guess, fb)`, shrink the tracked solution space to codes
    /// still consistent with every turn so far, and update `state`.
    /// Total: never fails. Spec §4.2.
    pub fn constrain(&mut self, guess: Code, fb: FeedbackIndex) {
        if let Some(bits) = self.solution_space.as_mut() {
            let mut remaining = 0u32;
            for code in 0..self.ctx.num_codes() {
                if bits.contains(code as usize) {
                    if self.ctx.feedback(guess, code) == fb {
                        remaining += 1;
                    } else {
                        bits.set(code as usize, false);
                    }
                }
            }
            self.num_solutions = remaining;
        }
        self.turns.push((guess, fb));

        let won = fb == self.ctx.winning_feedback();
        self.state = if won {
            MatchState::Won
        } else if self.turns.len() as u8 >= self.ctx.options().max_guesses {
            MatchState::Lost
        } else {
            MatchState::Pending
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;
    use crate::code::from_digits;

    fn ctx() -> Context {
        Context::new(Options::new(6, 4, 10).unwrap())
    }

    #[test]
    fn scenario_3_win_on_first_guess() {
        let ctx = ctx();
        let secret = from_digits(&ctx.options(), &[3, 3, 3, 3]);
        let mut m = Match::new(&ctx, true);
        let fb = ctx.feedback(secret, secret);
        m.constrain(secret, fb);
        assert_eq!(m.state(), MatchState::Won);
        assert_eq!(m.turn_count(), 1);
    }

    #[test]
    fn constrain_is_monotone_and_matches_definition() {
        let ctx = ctx();
        let secret = from_digits(&ctx.options(), &[2, 1, 3, 5]);
        let mut m = Match::new(&ctx, true);
        let before = m.num_solutions();
        let guess = from_digits(&ctx.options(), &[2, 3, 1, 4]);
        let fb = ctx.feedback(guess, secret);
        m.constrain(guess, fb);
        assert!(m.num_solutions() <= before);

        let expected: u32 = (0..ctx.num_codes())
            .filter(|&c| ctx.feedback(guess, c) == fb)
            .count() as u32;
        assert_eq!(m.num_solutions(), expected);
    }

    #[test]
    fn replay_reproduces_state() {
        let ctx = ctx();
        let secret = from_digits(&ctx.options(), &[0, 0, 1, 1]);
        let mut live = Match::new(&ctx, true);
        let mut history = Vec::new();
        for guess_digits in [[1, 0, 0, 2], [0, 0, 1, 1]] {
            let guess = from_digits(&ctx.options(), &guess_digits);
            let fb = ctx.feedback(guess, secret);
            live.constrain(guess, fb);
            history.push((guess, fb));
        }

        let mut replay = Match::new(&ctx, true);
        for (guess, fb) in history {
            replay.constrain(guess, fb);
        }
        assert_eq!(replay.num_solutions(), live.num_solutions());
        assert_eq!(replay.state(), live.state());
    }

    #[test]
    fn untracked_match_reports_sentinel_count() {
        let ctx = ctx();
        let mut m = Match::new(&ctx, false);
        assert_eq!(m.num_solutions(), u32::MAX);
        let secret = from_digits(&ctx.options(), &[1, 1, 2, 2]);
        m.constrain(secret, ctx.feedback(secret, secret));
        assert_eq!(m.num_solutions(), u32::MAX);
        assert_eq!(m.state(), MatchState::Won);
    }
}
