//! Dense pairwise feedback table. Spec §4.1, §5 ("Memory").

use crate::Code;
use crate::Options;
use crate::context::feedback::FeedbackIndex;
use crate::context::feedback::FeedbackTables;
use crate::context::feedback::bulls_cows;

/// refuse to build a table larger than this many bytes; callers fall back
/// to on-the-fly computation instead. Spec §5 gives ~1.6 MiB at M=1296 and
/// ~100 MiB at M=10^4 as reference points; 64 MiB covers the former
/// comfortably while still refusing pathological configurations.
pub const TABLE_MEMORY_CAP_BYTES: u64 = 64 * 1024 * 1024;

pub struct FbTable {
    num_codes: u32,
    entries: Vec<FeedbackIndex>,
}

impl FbTable {
    /// `None` if the table would exceed `TABLE_MEMORY_CAP_BYTES`.
    pub fn try_build(opts: &Options, tables: &FeedbackTables) -> Option<Self> {
        let m = opts.num_codes() as u64;
        if m.saturating_mul(m) > TABLE_MEMORY_CAP_BYTES {
            return None;
        }
        let m = m as u32;
        let mut entries = vec![0u8; (m as usize) * (m as usize)];
        for a in 0..m {
            for b in 0..=a {
                let (bulls, cows) = bulls_cows(opts, a, b);
                let idx = tables.encode(bulls, cows);
                entries[(a as usize) * (m as usize) + b as usize] = idx;
                entries[(b as usize) * (m as usize) + a as usize] = idx;
            }
        }
        Some(Self {
            num_codes: m,
            entries,
        })
    }

    pub fn get(&self, a: Code, b: Code) -> FeedbackIndex {
        self.entries[(a as usize) * (self.num_codes as usize) + b as usize]
    }
}
