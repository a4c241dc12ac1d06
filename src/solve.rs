//! Non-recursive exhaustive search over the active lists, backtracking by
//! walking each block's candidate chain instead of recursing.

use std::ops::ControlFlow;

use crate::bitvec::BitVec;
use crate::config::SolverConfig;
use crate::echelon::EchelonSystem;
use crate::prepare::ActiveList;

#[cfg(feature = "trace")]
use tracing::trace;

/// Counters accumulated during a [`solve`] run.
///
/// `nodes` counts every candidate visited across every block (a descend or
/// an advance-to-next-candidate both count once); `xors` counts GF(2) word
/// XORs spent maintaining the running solution state and bucket indices.
/// Both stay internally consistent even when the search stops early because
/// the callback requested it or [`SolverConfig::solution_cap`] was hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Candidates visited across every block.
    pub nodes: u64,
    /// GF(2) word XORs spent maintaining state and bucket indices.
    pub xors: u64,
    /// Satisfying assignments found.
    pub solutions: u64,
}

/// One search-stack frame: the candidate currently selected at this block.
/// XOR is its own inverse, so undoing a frame's contribution to the running
/// solution and to later blocks' bucket indices is the same operation as
/// applying it, and no extra saved state is needed to backtrack.
struct Frame {
    /// Arena slot of the candidate currently tried at this block.
    slot: u32,
}

/// Exhaustively search `active` for every assignment whose per-block sum
/// lands in that block's candidate set, invoking `on_solution` with the
/// resulting n-bit solution vector for each one found.
///
/// `on_solution` returns [`ControlFlow::Break`] to stop the search early
/// (e.g. once the caller only wants the first solution); this mirrors the
/// original design's "callback signals cancellation" contract without a
/// sentinel error type.
///
/// A system with zero blocks has exactly one (trivially true) solution: the
/// all-zero vector, reported with `nodes = 1` and `xors = 0`.
pub fn solve(
    active: &ActiveList,
    echelon: &EchelonSystem,
    config: &SolverConfig,
    mut on_solution: impl FnMut(&BitVec) -> ControlFlow<(), ()>,
) -> SolveStats {
    let n = echelon.system().nrows();
    let m = active.len();
    let mut stats = SolveStats::default();

    if m == 0 {
        let x = BitVec::zeros(n);
        stats.nodes = 1;
        if on_solution(&x) == ControlFlow::Break(()) {
            // still counts as a single found solution
        }
        stats.solutions = 1;
        return stats;
    }

    // `index_value[j]` is the running bucket index for block j, updated
    // incrementally as earlier blocks commit a candidate.
    let mut index_value: Vec<u64> = vec![0; m];
    let mut x = BitVec::zeros(n);
    let mut stack: Vec<Frame> = Vec::with_capacity(m);

    let mut i = 0usize;
    let mut descending = true;

    // Rows that never become a pivot for any block (`Σ p_j < n`) contribute
    // nothing to any block's echelon M, so every block-candidate combination
    // is compatible with any setting of them: they are free dimensions of
    // the solution space that must be enumerated, not left at zero.
    let free_rows: Vec<usize> = (echelon.total_pivots()..n).collect();

    'search: loop {
        if descending {
            if i == m {
                // full per-block assignment found: emit one solution per
                // setting of the free rows on top of it
                let brk = emit_free_variants(
                    &mut x,
                    &free_rows,
                    echelon.accumulator(),
                    config,
                    &mut stats,
                    &mut on_solution,
                ) == ControlFlow::Break(());
                if brk {
                    break 'search;
                }
                i -= 1;
                descending = false;
                continue;
            }

            let entry = active.entry(i);
            let bucket = index_value[i] as usize;
            let slot = entry.lut[bucket];
            stats.nodes += 1;

            match slot {
                Some(s) => {
                    apply_candidate(active, i, s, &mut x, &mut index_value, &mut stats);
                    stack.push(Frame { slot: s });
                    i += 1;
                }
                None => {
                    // no candidate in this bucket: backtrack
                    if i == 0 {
                        break 'search;
                    }
                    i -= 1;
                    descending = false;
                }
            }
        } else {
            // Advance: undo the candidate at frame i, try the next link in
            // its chain.
            let frame = stack.pop().expect("frame exists for visited block");
            let cur_slot = frame.slot;
            undo_candidate(active, i, cur_slot, &mut x, &mut index_value, &mut stats);

            let next_slot = active.entry(i).arena[cur_slot as usize].next;
            match next_slot {
                Some(s) => {
                    apply_candidate(active, i, s, &mut x, &mut index_value, &mut stats);
                    stack.push(Frame { slot: s });
                    i += 1;
                    descending = true;
                }
                None => {
                    if i == 0 {
                        break 'search;
                    }
                    i -= 1;
                    // stays in Advance mode
                }
            }
        }
    }

    stats
}

/// Apply block `i`'s candidate at arena slot `slot`: XOR its `sum_row` into
/// the running solution and propagate its precomputed deltas into every
/// later block's bucket index.
fn apply_candidate(
    active: &ActiveList,
    i: usize,
    slot: u32,
    x: &mut BitVec,
    index_value: &mut [u64],
    stats: &mut SolveStats,
) {
    let cand = &active.entry(i).arena[slot as usize];
    // A zero sum-row (first == None) contributes nothing to the running
    // state, so the XOR is skipped rather than counted as work.
    if cand.first.is_some() {
        x.xor_assign(&cand.sum_row);
        stats.xors += cand.sum_row.word_count() as u64;
    }
    for j in (i + 1)..active.len() {
        let delta = cand.deltas[j];
        let width = active.entry(j).width;
        let p = active.entry(j).pivots;
        index_value[j] ^= delta.index_part(width, p);
        stats.xors += 1;
    }
}

/// Inverse of [`apply_candidate`]: GF(2) XOR is its own inverse, so undoing
/// is the same operation applied again.
fn undo_candidate(
    active: &ActiveList,
    i: usize,
    slot: u32,
    x: &mut BitVec,
    index_value: &mut [u64],
    stats: &mut SolveStats,
) {
    apply_candidate(active, i, slot, x, index_value, stats);
}

/// Recursively enumerate every setting of `free_rows[idx..]` on top of `x`,
/// XOR-ing in `accumulator[free_rows[idx]]` for the "set" branch and
/// restoring `x` before returning so the caller's block-search state is
/// untouched. Each of the `2^free_rows.len()` resulting vectors is reported
/// through `on_solution` exactly once.
fn emit_free_variants(
    x: &mut BitVec,
    free_rows: &[usize],
    accumulator: &[BitVec],
    config: &SolverConfig,
    stats: &mut SolveStats,
    on_solution: &mut impl FnMut(&BitVec) -> ControlFlow<(), ()>,
) -> ControlFlow<(), ()> {
    emit_free_variants_rec(x, 0, free_rows, accumulator, config, stats, on_solution)
}

fn emit_free_variants_rec(
    x: &mut BitVec,
    idx: usize,
    free_rows: &[usize],
    accumulator: &[BitVec],
    config: &SolverConfig,
    stats: &mut SolveStats,
    on_solution: &mut impl FnMut(&BitVec) -> ControlFlow<(), ()>,
) -> ControlFlow<(), ()> {
    if idx == free_rows.len() {
        stats.solutions += 1;
        #[cfg(feature = "trace")]
        trace!(solutions = stats.solutions, "solution found");
        if on_solution(x) == ControlFlow::Break(()) {
            return ControlFlow::Break(());
        }
        if config.solution_cap > 0 && stats.solutions >= config.solution_cap {
            return ControlFlow::Break(());
        }
        return ControlFlow::Continue(());
    }

    if emit_free_variants_rec(x, idx + 1, free_rows, accumulator, config, stats, on_solution)
        == ControlFlow::Break(())
    {
        return ControlFlow::Break(());
    }

    let row = free_rows[idx];
    x.xor_assign(&accumulator[row]);
    stats.xors += 1;
    let result = emit_free_variants_rec(x, idx + 1, free_rows, accumulator, config, stats, on_solution);
    x.xor_assign(&accumulator[row]);
    result
}
