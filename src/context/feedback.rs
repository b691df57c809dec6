//! Raw feedback computation and the encode/decode enumeration. Spec §3, §4.1.

use crate::Code;
use crate::Options;
use crate::code::digit;

/// a feedback index into `[0, F)`.
pub type FeedbackIndex = u8;

/// `(bulls, cows)` scored without any lookup table: O(N + K). Used to
/// populate the table and as the fallback when the table isn't built.
pub fn bulls_cows(opts: &Options, a: Code, b: Code) -> (u8, u8) {
    let n = opts.num_slots;
    let k = opts.num_colors as usize;
    let mut counts_a = vec![0u8; k];
    let mut counts_b = vec![0u8; k];
    let mut bulls = 0u8;
    for i in 0..n {
        let da = digit(opts, a, i);
        let db = digit(opts, b, i);
        counts_a[da as usize] += 1;
        counts_b[db as usize] += 1;
        if da == db {
            bulls += 1;
        }
    }
    let hits: u8 = counts_a
        .iter()
        .zip(counts_b.iter())
        .map(|(&x, &y)| x.min(y))
        .sum();
    (bulls, hits - bulls)
}

/// bidirectional encode/decode tables over the valid `(b, w)` pairs,
/// enumerated outer-`b`-ascending, inner-`w`-ascending, skipping
/// `b + w > N` and the unreachable `(N - 1, 1)` case. Spec §3.
pub struct FeedbackTables {
    /// `encode[b][w]` is `Some(index)` for every valid pair.
    encode: Vec<Vec<Option<FeedbackIndex>>>,
    decode: Vec<(u8, u8)>,
}

impl FeedbackTables {
    pub fn build(num_slots: u8) -> Self {
        let n = num_slots as usize;
        let mut encode = vec![vec![None; n + 1]; n + 1];
        let mut decode = Vec::new();
        let mut counter: FeedbackIndex = 0;
        for b in 0..=n {
            for w in 0..=n {
                let excluded = b + w > n || (b == n.saturating_sub(1) && w == 1 && n > 0);
                if !excluded {
                    encode[b][w] = Some(counter);
                    decode.push((b as u8, w as u8));
                    counter += 1;
                }
            }
        }
        Self { encode, decode }
    }

    pub fn num_feedbacks(&self) -> u8 {
        self.decode.len() as u8
    }

    pub fn encode(&self, bulls: u8, cows: u8) -> FeedbackIndex {
        self.encode[bulls as usize][cows as usize].expect("bulls/cows must be a reachable pair")
    }

    pub fn decode(&self, idx: FeedbackIndex) -> (u8, u8) {
        self.decode[idx as usize]
    }

    pub fn winning(&self, num_slots: u8) -> FeedbackIndex {
        self.encode(num_slots, 0)
    }
}
