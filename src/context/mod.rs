//! Immutable per-configuration parameters and derived structures. Spec §3.

pub mod difficulty;
pub mod feedback;
pub mod table;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::OnceLock;

use crate::Code;
use crate::Options;
use crate::solver::recommend::Strategy;
use feedback::FeedbackIndex;
use feedback::FeedbackTables;
use table::FbTable;

/// the guess recommended against an empty history, and the guess
/// recommended after receiving each possible first feedback. Built once
/// per strategy, on first use, and immutable afterwards (spec §3
/// invariant: "once a cache flag is true, the cached value is immutable").
struct RecommendationCache {
    first_guess: Code,
    second_guess: Vec<Code>,
}

pub struct Context {
    opts: Options,
    tables: FeedbackTables,
    ranking: OnceLock<Vec<u8>>,
    fb_table: OnceLock<Option<FbTable>>,
    rec_cache: Mutex<HashMap<Strategy, RecommendationCache>>,
}

impl Context {
    pub fn new(opts: Options) -> Self {
        let tables = FeedbackTables::build(opts.num_slots);
        Self {
            opts,
            tables,
            ranking: OnceLock::new(),
            fb_table: OnceLock::new(),
            rec_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> Options {
        self.opts
    }

    pub fn num_codes(&self) -> u32 {
        self.opts.num_codes()
    }

    pub fn num_feedbacks(&self) -> u8 {
        self.tables.num_feedbacks()
    }

    pub fn encode(&self, bulls: u8, cows: u8) -> FeedbackIndex {
        self.tables.encode(bulls, cows)
    }

    pub fn decode(&self, idx: FeedbackIndex) -> (u8, u8) {
        self.tables.decode(idx)
    }

    pub fn winning_feedback(&self) -> FeedbackIndex {
        self.tables.winning(self.opts.num_slots)
    }

    /// `feedback(a, b)`: O(1) once the table is populated (lazily, on first
    /// call to this method), else O(N + K). Spec §4.1.
    pub fn feedback(&self, a: Code, b: Code) -> FeedbackIndex {
        let table = self
            .fb_table
            .get_or_init(|| FbTable::try_build(&self.opts, &self.tables));
        match table {
            Some(table) => table.get(a, b),
            None => {
                let (bulls, cows) = feedback::bulls_cows(&self.opts, a, b);
                self.tables.encode(bulls, cows)
            }
        }
    }

    /// whether the pairwise table is (or ever will be) populated for this
    /// context; exposed so tests and the adaptive code-maker can tell
    /// whether they're in degraded (on-the-fly) mode.
    pub fn has_feedback_table(&self) -> bool {
        matches!(self.fb_table.get(), Some(Some(_)))
    }

    /// difficulty ranking per spec §4.4, built and memoized on first use.
    pub fn difficulty_ranking(&self) -> &[u8] {
        self.ranking
            .get_or_init(|| difficulty::rank_by_total_count(&self.opts, &self.tables))
    }

    /// the turn-0 and turn-1 recommendation caches for `strategy`,
    /// building them on first request. Spec §4.3: "caches for turn 0 and
    /// turn 1 ... are mandatory when T*M is large"; here they're always
    /// built lazily and shared across every `Match` over this `Context`.
    pub(crate) fn cached_guess(&self, strategy: Strategy, turn: usize, last_fb: Option<FeedbackIndex>) -> Option<Code> {
        let mut guard = self.rec_cache.lock().expect("recommendation cache mutex");
        if !guard.contains_key(&strategy) {
            let cache = self.build_recommendation_cache(strategy);
            guard.insert(strategy, cache);
        }
        let cache = guard.get(&strategy).expect("just inserted");
        match (turn, last_fb) {
            (0, _) => Some(cache.first_guess),
            (1, Some(fb)) => Some(cache.second_guess[fb as usize]),
            _ => None,
        }
    }

    fn build_recommendation_cache(&self, strategy: Strategy) -> RecommendationCache {
        use crate::solver::Match;
        use crate::solver::recommend::recommend_uncached;

        let opening = Match::new(self, true);
        let first_guess = recommend_uncached(self, &opening, strategy);

        let mut second_guess = vec![0 as Code; self.num_feedbacks() as usize];
        for fb in 0..self.num_feedbacks() {
            let mut m = Match::new(self, true);
            m.constrain(first_guess, fb);
            second_guess[fb as usize] = recommend_uncached(self, &m, strategy);
        }

        RecommendationCache {
            first_guess,
            second_guess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_matches_table_and_fallback() {
        let ctx = Context::new(Options::new(4, 3, 10).unwrap());
        for a in 0..ctx.num_codes() {
            for b in 0..ctx.num_codes() {
                let viactx = ctx.feedback(a, b);
                let (bulls, cows) = feedback::bulls_cows(&ctx.opts, a, b);
                assert_eq!(viactx, ctx.encode(bulls, cows));
            }
        }
    }

    #[test]
    fn decode_encode_roundtrip_through_context() {
        let ctx = Context::new(Options::new(6, 4, 10).unwrap());
        for idx in 0..ctx.num_feedbacks() {
            let (b, w) = ctx.decode(idx);
            assert_eq!(ctx.encode(b, w), idx);
        }
    }
}
