//! Min-max / min-average guess recommendation. Spec §4.3.

use crate::Code;
use crate::Context;
use crate::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `score(g) = max_f part(g, f)`.
    MinMax,
    /// `score(g) = sum_f part(g, f)^2 / |space|`, equivalently the expected
    /// residual count; computed here as `sum_s part(g, feedback(g, s))`
    /// (spec §4.3 notes the two forms are equivalent up to the constant
    /// `|space|` divisor, which doesn't change which guess is minimal).
    MinAverage,
}

/// all codes attaining the minimum score, needed by the adaptive
/// code-maker (spec §4.3's `recommend_candidates`). `None` when `m` isn't
/// tracking its solution space — recommendation is unavailable in that
/// degraded mode (spec §7).
pub fn recommend_candidates(ctx: &Context, m: &Match, strategy: Strategy) -> Option<Vec<Code>> {
    let bits = m.solution_space()?;
    if bits.count_ones(..) == 0 {
        return Some(Vec::new());
    }
    if bits.count_ones(..) == 1 {
        let only = bits.ones().next().expect("count_ones == 1") as Code;
        return Some(vec![only]);
    }

    let mut best_score: Option<u64> = None;
    let mut best: Vec<Code> = Vec::new();
    let f = ctx.num_feedbacks() as usize;
    let mut parts = vec![0u32; f];
    for g in 0..ctx.num_codes() {
        parts.iter_mut().for_each(|p| *p = 0);
        for s in bits.ones() {
            let fb = ctx.feedback(g, s as Code) as usize;
            parts[fb] += 1;
        }
        let score = match strategy {
            Strategy::MinMax => parts.iter().copied().max().unwrap_or(0) as u64,
            Strategy::MinAverage => parts.iter().map(|&p| (p as u64) * (p as u64)).sum(),
        };
        match best_score {
            None => {
                best_score = Some(score);
                best.push(g);
            }
            Some(current) if score < current => {
                best_score = Some(score);
                best.clear();
                best.push(g);
            }
            Some(current) if score == current => best.push(g),
            _ => {}
        }
    }
    Some(best)
}

/// the full recommendation algorithm with no cache lookup, used both as
/// the public fallback and to populate `Context`'s turn-0/turn-1 caches
/// (which must not recursively consult themselves).
pub(crate) fn recommend_uncached(ctx: &Context, m: &Match, strategy: Strategy) -> Code {
    recommend_candidates(ctx, m, strategy)
        .expect("recommend_uncached is only called on tracking matches")
        .into_iter()
        .min()
        .expect("solution space is non-empty when recommending")
}

/// `recommend(match) -> Code`, spec §4.3: ties broken by lowest code index,
/// the unique remaining solution returned directly when `|space| == 1`,
/// and the turn-0/turn-1 caches consulted before falling back to the full
/// `O(M^2)` scan.
pub fn recommend(ctx: &Context, m: &Match, strategy: Strategy) -> Option<Code> {
    if !m.is_tracking() {
        return None;
    }
    let last_fb = m.history().last().map(|&(_, fb)| fb);
    if let Some(cached) = ctx.cached_guess(strategy, m.turn_count(), last_fb) {
        return Some(cached);
    }
    Some(recommend_uncached(ctx, m, strategy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Options;
    use crate::code::digits;

    #[test]
    fn unique_solution_is_returned_directly() {
        let ctx = Context::new(Options::new(4, 2, 10).unwrap());
        let mut m = Match::new(&ctx, true);
        // drive the space down to exactly one code, then recommend should
        // return it without scanning.
        let all: Vec<Code> = (0..ctx.num_codes()).collect();
        let secret = all[5];
        loop {
            let guess = recommend(&ctx, &m, Strategy::MinMax).expect("tracking enabled");
            let fb = ctx.feedback(guess, secret);
            m.constrain(guess, fb);
            if m.num_solutions() == 1 || fb == ctx.winning_feedback() {
                break;
            }
        }
        if m.num_solutions() == 1 {
            let rec = recommend(&ctx, &m, Strategy::MinMax).unwrap();
            assert_eq!(rec, secret);
        }
    }

    #[test]
    fn scenario_4_opening_guess_and_residual_space() {
        // K=6 N=4: the min-max opening guess is from the "1122" family —
        // two distinct colors, each appearing twice — and the residual
        // space after a (0,0) response has size 256.
        let ctx = Context::new(Options::new(6, 4, 10).unwrap());
        let m = Match::new(&ctx, true);
        let guess = recommend(&ctx, &m, Strategy::MinMax).expect("tracking enabled");
        let ds = digits(&ctx.options(), guess);
        let mut counts = [0u8; 6];
        for d in ds {
            counts[d as usize] += 1;
        }
        let mut sorted: Vec<u8> = counts.iter().copied().filter(|&c| c > 0).collect();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![2, 2], "expected two colors each appearing twice");

        let fb00 = ctx.encode(0, 0);
        let mut after = Match::new(&ctx, true);
        after.constrain(guess, fb00);
        assert_eq!(after.num_solutions(), 256);
    }

    #[test]
    fn recommender_optimality_small_space() {
        // Invariant 5 (finite check): the returned guess truly minimizes
        // score(g) over every candidate guess, for small K/N.
        let ctx = Context::new(Options::new(3, 2, 10).unwrap());
        let m = Match::new(&ctx, true);
        for strategy in [Strategy::MinMax, Strategy::MinAverage] {
            let got = recommend(&ctx, &m, strategy).unwrap();
            let bits = m.solution_space().unwrap();
            let f = ctx.num_feedbacks() as usize;
            let score_of = |g: Code| {
                let mut parts = vec![0u32; f];
                for s in bits.ones() {
                    parts[ctx.feedback(g, s as Code) as usize] += 1;
                }
                match strategy {
                    Strategy::MinMax => parts.iter().copied().max().unwrap_or(0) as u64,
                    Strategy::MinAverage => parts.iter().map(|&p| (p as u64) * (p as u64)).sum(),
                }
            };
            let best = (0..ctx.num_codes()).map(score_of).min().unwrap();
            assert_eq!(score_of(got), best);
        }
    }
}
