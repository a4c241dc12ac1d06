//! Opt-in parallel extension: shards the search by the first block's
//! candidate choice, one `rayon` task per shard.

use std::ops::ControlFlow;

use rayon::prelude::*;

use crate::bitvec::BitVec;
use crate::config::SolverConfig;
use crate::echelon::EchelonSystem;
use crate::prepare::ActiveList;
use crate::solve::{solve, SolveStats};

/// Run [`solve`] with the search sharded over the first block's candidates:
/// each shard fixes one first-block candidate, then runs the ordinary
/// sequential engine over blocks `1..m` starting from that candidate's
/// contribution. Shards run concurrently via `rayon`; this function blocks
/// until all of them finish, then sums counters and concatenates solutions.
///
/// Solutions are collected per shard rather than streamed through a single
/// callback, since shards do not share a call stack. Returns the combined
/// [`SolveStats`] and every solution found, in shard order (not overall
/// chain order, unlike the sequential [`solve`]).
pub fn solve_parallel_by_first_block(
    active: &ActiveList,
    echelon: &EchelonSystem,
    config: &SolverConfig,
) -> (SolveStats, Vec<BitVec>) {
    if active.is_empty() {
        let mut stats = SolveStats::default();
        let mut out = Vec::new();
        solve(active, echelon, config, |x| {
            out.push(x.clone());
            ControlFlow::Continue(())
        });
        stats.nodes = 1;
        stats.solutions = out.len() as u64;
        return (stats, out);
    }

    // Block 0's bucket index is always 0 (no earlier block exists to feed it
    // a running-state contribution), so only the chain at `lut[0]` is ever
    // reachable — sharding over every arena slot would try buckets the
    // sequential engine could never select.
    let first = active.entry(0);
    let mut first_slots = Vec::new();
    let mut next = first.lut[0];
    while let Some(slot) = next {
        first_slots.push(slot);
        next = first.arena[slot as usize].next;
    }

    let shard_results: Vec<(SolveStats, Vec<BitVec>)> = first_slots
        .into_par_iter()
        .map(|slot| solve_shard(active, echelon, config, slot))
        .collect();

    let mut total_stats = SolveStats::default();
    let mut solutions = Vec::new();
    for (stats, mut sols) in shard_results {
        total_stats.nodes += stats.nodes;
        total_stats.xors += stats.xors;
        total_stats.solutions += stats.solutions;
        solutions.append(&mut sols);
    }
    (total_stats, solutions)
}

/// Run the sequential engine on blocks `1..m`, with block 0 fixed to the
/// candidate at `first_slot`.
fn solve_shard(
    active: &ActiveList,
    echelon: &EchelonSystem,
    config: &SolverConfig,
    first_slot: u32,
) -> (SolveStats, Vec<BitVec>) {
    let n = echelon.system().nrows();
    let m = active.len();
    let cand = &active.entry(0).arena[first_slot as usize];

    let mut x = BitVec::zeros(n);
    x.xor_assign(&cand.sum_row);
    let mut stats = SolveStats {
        nodes: 1,
        xors: cand.sum_row.word_count() as u64,
        solutions: 0,
    };

    let mut solutions = Vec::new();
    let free_rows: Vec<usize> = (echelon.total_pivots()..n).collect();

    if m == 1 {
        emit_free_variants(&mut x, &free_rows, echelon.accumulator(), config, &mut stats, &mut solutions);
        return (stats, solutions);
    }

    // Seed the remaining blocks' bucket indices with block 0's contribution,
    // then run the ordinary engine over a view that treats block 1 as the
    // new root. We reuse `solve`'s state machine by building a throwaway
    // sub-active-list view is unnecessary: instead walk blocks 1..m directly
    // with the same algorithm `solve` uses, seeded from this shard's state.
    let mut index_value: Vec<u64> = vec![0; m];
    for j in 1..m {
        let delta = cand.deltas[j];
        let width = active.entry(j).width;
        let p = active.entry(j).pivots;
        index_value[j] ^= delta.index_part(width, p);
        stats.xors += 1;
    }

    let mut stack: Vec<u32> = Vec::with_capacity(m - 1);
    let mut i = 1usize;
    let mut descending = true;

    loop {
        if descending {
            if i == m {
                let brk = emit_free_variants(
                    &mut x,
                    &free_rows,
                    echelon.accumulator(),
                    config,
                    &mut stats,
                    &mut solutions,
                );
                if brk {
                    break;
                }
                i -= 1;
                descending = false;
                continue;
            }
            let bucket = index_value[i] as usize;
            stats.nodes += 1;
            match active.entry(i).lut[bucket] {
                Some(s) => {
                    apply(active, i, s, &mut x, &mut index_value, &mut stats);
                    stack.push(s);
                    i += 1;
                }
                None => {
                    if i == 1 {
                        break;
                    }
                    i -= 1;
                    descending = false;
                }
            }
        } else {
            let cur = stack.pop().expect("frame exists for visited block");
            apply(active, i, cur, &mut x, &mut index_value, &mut stats); // undo (self-inverse)
            match active.entry(i).arena[cur as usize].next {
                Some(s) => {
                    apply(active, i, s, &mut x, &mut index_value, &mut stats);
                    stack.push(s);
                    i += 1;
                    descending = true;
                }
                None => {
                    if i == 1 {
                        break;
                    }
                    i -= 1;
                }
            }
        }
    }

    (stats, solutions)
}

fn apply(
    active: &ActiveList,
    i: usize,
    slot: u32,
    x: &mut BitVec,
    index_value: &mut [u64],
    stats: &mut SolveStats,
) {
    let cand = &active.entry(i).arena[slot as usize];
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

/// Shard-local counterpart of `solve`'s free-row enumeration: rows that
/// never became a pivot for any block contribute nothing to any block's
/// echelon M, so every setting of them is a distinct solution. Collects
/// into `out` instead of invoking a callback since shards don't share a
/// call stack; `true` is returned once `config.solution_cap` is hit.
fn emit_free_variants(
    x: &mut BitVec,
    free_rows: &[usize],
    accumulator: &[BitVec],
    config: &SolverConfig,
    stats: &mut SolveStats,
    out: &mut Vec<BitVec>,
) -> bool {
    emit_free_variants_rec(x, 0, free_rows, accumulator, config, stats, out)
}

fn emit_free_variants_rec(
    x: &mut BitVec,
    idx: usize,
    free_rows: &[usize],
    accumulator: &[BitVec],
    config: &SolverConfig,
    stats: &mut SolveStats,
    out: &mut Vec<BitVec>,
) -> bool {
    if idx == free_rows.len() {
        stats.solutions += 1;
        out.push(x.clone());
        return config.solution_cap > 0 && stats.solutions >= config.solution_cap;
    }

    if emit_free_variants_rec(x, idx + 1, free_rows, accumulator, config, stats, out) {
        return true;
    }

    let row = free_rows[idx];
    x.xor_assign(&accumulator[row]);
    stats.xors += 1;
    let capped = emit_free_variants_rec(x, idx + 1, free_rows, accumulator, config, stats, out);
    x.xor_assign(&accumulator[row]);
    capped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echelon::echelonize;
    use crate::prepare::prepare;
    use crate::system::MrhsSystem;

    #[test]
    fn test_parallel_matches_sequential_solution_count() {
        let mut sys = MrhsSystem::new(2, &[2, 2], &[2, 3]).unwrap();
        sys.set_m_bit(0, 0, 0, true);
        sys.set_m_bit(1, 1, 1, true);
        sys.set_s_row(0, 0, 0).unwrap();
        sys.set_s_row(0, 1, 1).unwrap();
        sys.set_s_row(1, 0, 0).unwrap();
        sys.set_s_row(1, 1, 1).unwrap();
        sys.set_s_row(1, 2, 2).unwrap();

        let ech = echelonize(sys);
        let active = prepare(&ech);
        let config = SolverConfig::default();

        let mut seq_count = 0;
        solve(&active, &ech, &config, |_| {
            seq_count += 1;
            ControlFlow::Continue(())
        });

        let (par_stats, par_solutions) = solve_parallel_by_first_block(&active, &ech, &config);
        assert_eq!(par_stats.solutions as usize, seq_count);
        assert_eq!(par_solutions.len(), seq_count);
    }

    fn as_value(v: &BitVec) -> u64 {
        let mut out = 0u64;
        for i in 0..v.len() {
            if v.get(i) {
                out |= 1 << i;
            }
        }
        out
    }

    #[test]
    fn test_parallel_matches_exact_solution_set_with_cross_block_index_and_free_row() {
        // Same rank-deficient system as solve's scenario-A test: a block
        // with p_j > 0 fed a nonzero index contribution from an earlier
        // block, plus one globally-unpivoted free row.
        let mut sys = MrhsSystem::new(3, &[2, 2], &[2, 2]).unwrap();
        sys.set_m_bit(0, 0, 0, true);
        sys.set_m_bit(0, 1, 1, true);
        sys.set_m_bit(0, 2, 0, true);
        sys.set_m_bit(0, 2, 1, true);
        sys.set_m_bit(1, 0, 0, true);
        sys.set_m_bit(1, 0, 1, true);
        sys.set_m_bit(1, 1, 0, true);
        sys.set_m_bit(1, 2, 1, true);
        sys.set_s_row(0, 0, 0b00).unwrap();
        sys.set_s_row(0, 1, 0b11).unwrap();
        sys.set_s_row(1, 0, 0b00).unwrap();
        sys.set_s_row(1, 1, 0b10).unwrap();

        let ech = echelonize(sys);
        let active = prepare(&ech);
        let config = SolverConfig::default();

        let (_stats, solutions) = solve_parallel_by_first_block(&active, &ech, &config);
        let mut values: Vec<u64> = solutions.iter().map(as_value).collect();
        values.sort_unstable();
        assert_eq!(values, vec![0b000, 0b111]);
    }
}

