//! The cascaded K0 -> K1 -> K2 -> K3 search, K4/K5 derivation, and
//! full-corpus validation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::approx::{derive_k4_k5, LEVELS};
use crate::cipher::{decrypt_halves, RoundKeys};
use crate::corpus::PairCorpus;

/// Emitted once a 6-tuple decrypts every pair in the corpus back to its
/// stored plaintext.
pub type RecoveredKey = RoundKeys;

const INNER_SPACE: u32 = 1 << 12;
const OUTER_SPACE: u32 = 1 << 20;

/// Builds the inner 32-bit candidate from a 12-bit inner search index, per
/// the construction rule in the data model: the top two bits of each inner
/// byte are left at zero.
fn construct_inner(c: u32) -> u32 {
    (((c >> 6) & 0x3F) << 16) | ((c & 0x3F) << 8)
}

/// Extends a fixed inner key with the outer 20-bit search index into a full
/// 32-bit subkey candidate.
fn construct_outer(o: u32, inner_key: u32) -> u32 {
    let a0 = (((o & 0xF) >> 2) << 6) + ((inner_key >> 16) & 0xFF);
    let a1 = ((o & 0x3) << 6) + ((inner_key >> 8) & 0xFF);
    let b0 = (o >> 12) & 0xFF;
    let b3 = (o >> 4) & 0xFF;
    let b1 = b0 ^ a0;
    let b2 = b3 ^ a1;
    (b0 << 24) | (b1 << 16) | (b2 << 8) | b3
}

/// Shared state across the search, including the parallel K0 workers: the
/// accepted-key sink and the cap that gates early termination.
struct SearchState {
    max_keys: usize,
    found: Mutex<Vec<RecoveredKey>>,
    cancelled: AtomicBool,
}

impl SearchState {
    fn new(max_keys: usize) -> Self {
        SearchState {
            max_keys,
            found: Mutex::new(Vec::new()),
            cancelled: AtomicBool::new(false),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Records a validated key tuple. Sets the cancellation flag once the
    /// cap is reached so no further workers keep searching.
    fn accept(&self, keys: RecoveredKey) {
        let mut found = self.found.lock().unwrap();
        if found.len() >= self.max_keys {
            self.cancelled.store(true, Ordering::Relaxed);
            return;
        }
        info!(
            k0 = format!("{:#010x}", keys[0]),
            k1 = format!("{:#010x}", keys[1]),
            k2 = format!("{:#010x}", keys[2]),
            k3 = format!("{:#010x}", keys[3]),
            k4 = format!("{:#010x}", keys[4]),
            k5 = format!("{:#010x}", keys[5]),
            "recovered key tuple"
        );
        found.push(keys);
        if found.len() >= self.max_keys {
            self.cancelled.store(true, Ordering::Relaxed);
        }
    }
}

/// Consistency filter: a candidate is consistent iff the predicate returns
/// the same value on every pair in the corpus. Short-circuits on the first
/// pair that disagrees with pair 0.
fn is_consistent(
    corpus: &PairCorpus,
    predicate: crate::approx::Predicate,
    prefix: &[u32],
    candidate: u32,
) -> bool {
    let expected = predicate(&corpus.pair(0), prefix, candidate);
    for i in 1..corpus.count() {
        if predicate(&corpus.pair(i), prefix, candidate) != expected {
            return false;
        }
    }
    true
}

/// Derives K4/K5 from pair 0 and validates the full 6-tuple by trial
/// decryption across the entire corpus (not just pair 0), so a corrupted
/// pair 0 surfaces as a validation failure rather than a wrong accepted key.
fn finalize(corpus: &PairCorpus, prefix: &[u32; 4], state: &SearchState) {
    let (k4, k5) = derive_k4_k5(&corpus.pair(0), prefix[0], prefix[1], prefix[2], prefix[3]);
    let keys: RoundKeys = [prefix[0], prefix[1], prefix[2], prefix[3], k4, k5];

    for i in 0..corpus.count() {
        let (pl, pr) = decrypt_halves(corpus.c_left(i), corpus.c_right(i), &keys);
        if pl != corpus.p_left(i) || pr != corpus.p_right(i) {
            return;
        }
    }
    state.accept(keys);
}

/// The single recursive procedure that implements all four cascade levels,
/// parameterized by level index and the K0 inner-range restriction used to
/// split work across the rayon worker pool.
fn recurse(
    corpus: &PairCorpus,
    level: usize,
    inner_range: std::ops::Range<u32>,
    prefix: &mut Vec<u32>,
    state: &SearchState,
) {
    if state.is_cancelled() {
        return;
    }

    let predicates = &LEVELS[level];
    for c in inner_range {
        if state.is_cancelled() {
            return;
        }
        let inner_key = construct_inner(c);
        if !is_consistent(corpus, predicates.inner, prefix, inner_key) {
            continue;
        }

        for o in 0..OUTER_SPACE {
            if state.is_cancelled() {
                return;
            }
            let candidate = construct_outer(o, inner_key);
            if !is_consistent(corpus, predicates.outer, prefix, candidate) {
                continue;
            }

            prefix.push(candidate);
            if level == 3 {
                let confirmed: [u32; 4] = prefix[0..4].try_into().unwrap();
                finalize(corpus, &confirmed, state);
            } else {
                recurse(corpus, level + 1, 0..INNER_SPACE, prefix, state);
            }
            prefix.pop();
        }
    }
}

/// Runs the cascaded search over the whole corpus, splitting the K0 inner
/// range across a rayon worker pool. Returns every validated key tuple, up
/// to `max_keys`, in discovery order within each worker (workers themselves
/// interleave, so overall order across workers is not guaranteed).
pub fn search(corpus: &PairCorpus, max_keys: usize) -> Vec<RecoveredKey> {
    let state = SearchState::new(max_keys);
    let workers = rayon::current_num_threads().max(1) as u32;
    let chunk = INNER_SPACE.div_ceil(workers).max(1);

    let chunks: Vec<std::ops::Range<u32>> = (0..INNER_SPACE)
        .step_by(chunk as usize)
        .map(|start| start..(start + chunk).min(INNER_SPACE))
        .collect();

    debug!(chunks = chunks.len(), "partitioned K0 inner range");

    chunks.into_par_iter().for_each(|range| {
        let mut prefix = Vec::with_capacity(4);
        recurse(corpus, 0, range, &mut prefix, &state);
    });

    state.found.into_inner().unwrap()
}
