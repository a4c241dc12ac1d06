//! Builds the per-block active lists (lookup tables over partial XOR sums)
//! that the search engine walks.

use crate::bitvec::BitVec;
use crate::bitword::BlockWord;
use crate::echelon::EchelonSystem;

#[cfg(feature = "trace")]
use tracing::trace;

/// One candidate right-hand side for a block, arena-allocated.
///
/// `sum_row` is the n-dimensional vector that, XORed into the running
/// solution state, selects this candidate's pivot bits (the sum of the
/// accumulator rows at this block's pivot positions where the candidate's
/// pivot part has a 1). `deltas[j]` (for `j` after this candidate's own
/// block) is `sum_row`'s precomputed contribution to block `j`'s bucket key,
/// letting `solve` maintain each block's index value incrementally instead
/// of recomputing an n-wide dot product at every node visit.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub(crate) value: BlockWord,
    pub(crate) sum_row: BitVec,
    pub(crate) first: Option<usize>,
    pub(crate) next: Option<u32>,
    pub(crate) deltas: Vec<BlockWord>,
}

/// One block's lookup table: `2^(l-p)` bucket heads into a contiguous arena
/// of [`Candidate`] records, chained by `next`.
#[derive(Debug, Clone)]
pub struct ActiveListEntry {
    pub(crate) width: u32,
    pub(crate) pivots: u32,
    pub(crate) lut: Vec<Option<u32>>,
    pub(crate) arena: Vec<Candidate>,
}

impl ActiveListEntry {
    /// Index mask width: `l - p`.
    #[inline]
    pub fn index_width(&self) -> u32 {
        self.width - self.pivots
    }

    /// Number of surviving (de-duplicated) candidates.
    #[inline]
    pub fn candidate_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of buckets in the lookup table (`2^(l-p)`).
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.lut.len()
    }
}

/// The full active list: one [`ActiveListEntry`] per block, in block order.
#[derive(Debug, Clone)]
pub struct ActiveList {
    pub(crate) entries: Vec<ActiveListEntry>,
}

impl ActiveList {
    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow block `j`'s active list entry.
    #[inline]
    pub fn entry(&self, j: usize) -> &ActiveListEntry {
        &self.entries[j]
    }
}

/// Build the active list for an echelonized system.
///
/// Candidates are de-duplicated by value (duplicate S-block entries would
/// otherwise cause the same solution to be emitted more than once) and
/// inserted at the head of their bucket, so within a bucket the chain order
/// is the reverse of the S-block's input order.
pub fn prepare(system: &EchelonSystem) -> ActiveList {
    let nblocks = system.system().nblocks();
    let n = system.system().nrows();
    let mut entries = Vec::with_capacity(nblocks);

    // Precompute sum_rows first so later blocks can reference earlier ones
    // when building delta contributions.
    let mut per_block_candidates: Vec<Vec<Candidate>> = Vec::with_capacity(nblocks);

    for j in 0..nblocks {
        let block = &system.system().blocks()[j];
        let width = block.width();
        let p = system.pivot_counts()[j] as u32;
        let row_offset = system.pivot_row_offset(j);

        let mut arena: Vec<Candidate> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for s_row in 0..block.s().nrows() {
            let value = block.s().row(s_row);
            if !seen.insert(value) {
                continue;
            }

            let pivot_part = value.pivot_part(width, p);
            let mut sum_row = BitVec::zeros(n);
            for i in 0..p {
                if (pivot_part >> (p - 1 - i)) & 1 == 1 {
                    sum_row.xor_assign(&system.accumulator()[row_offset + i as usize]);
                }
            }
            let first = sum_row.first_set_bit();

            arena.push(Candidate {
                value,
                sum_row,
                first,
                next: None,
                deltas: Vec::new(),
            });
        }

        #[cfg(feature = "trace")]
        trace!(
            block = j,
            buckets = 1usize << (width - p),
            candidates = arena.len(),
            "built active list entry"
        );

        per_block_candidates.push(arena);
    }

    // Fill in deltas: candidate in block i contributes to every later
    // block j's bucket index via dot(sum_row, M_j).
    for i in 0..nblocks {
        let len = per_block_candidates[i].len();
        for idx in 0..len {
            let sum_row = per_block_candidates[i][idx].sum_row.clone();
            let mut deltas = vec![BlockWord::ZERO; nblocks];
            for j in (i + 1)..nblocks {
                let m_j = system.system().blocks()[j].m();
                let mut acc = BlockWord::ZERO;
                for r in 0..n {
                    if sum_row.get(r) {
                        acc ^= m_j.row(r);
                    }
                }
                deltas[j] = acc;
            }
            per_block_candidates[i][idx].deltas = deltas;
        }
    }

    // Now build LUTs with head-insertion (reverse of S-block order), and
    // move candidates into their block's arena.
    for j in 0..nblocks {
        let block = &system.system().blocks()[j];
        let width = block.width();
        let p = system.pivot_counts()[j] as u32;
        let index_width = width - p;
        let bucket_count = 1usize << index_width;

        let mut lut = vec![None; bucket_count];
        let mut arena = Vec::with_capacity(per_block_candidates[j].len());

        for mut cand in per_block_candidates[j].drain(..) {
            let index_part = cand.value.index_part(width, p) as usize;
            cand.next = lut[index_part];
            let slot = arena.len() as u32;
            arena.push(cand);
            lut[index_part] = Some(slot);
        }

        entries.push(ActiveListEntry {
            width,
            pivots: p,
            lut,
            arena,
        });
    }

    ActiveList { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::echelon::echelonize;
    use crate::system::MrhsSystem;

    #[test]
    fn test_dedup_identical_candidates() {
        let mut sys = MrhsSystem::new(2, &[2], &[3]).unwrap();
        sys.set_s_row(0, 0, 0b01).unwrap();
        sys.set_s_row(0, 1, 0b01).unwrap();
        sys.set_s_row(0, 2, 0b10).unwrap();
        let ech = echelonize(sys);
        let al = prepare(&ech);
        assert_eq!(al.entry(0).candidate_count(), 2);
    }

    #[test]
    fn test_bucket_count_matches_index_width() {
        let sys = MrhsSystem::new(3, &[3], &[1]).unwrap();
        let ech = echelonize(sys);
        let al = prepare(&ech);
        // no pivots (all-zero M) => index width == full width == 3
        assert_eq!(al.entry(0).bucket_count(), 1 << 3);
    }

    #[test]
    fn test_head_insertion_reverses_order() {
        let mut sys = MrhsSystem::new(2, &[2], &[2]).unwrap();
        sys.set_s_row(0, 0, 0b00).unwrap();
        sys.set_s_row(0, 1, 0b00).unwrap();
        // Both candidates share index_part (no pivots here since M is zero),
        // so they land in the same bucket; head-insertion means the chain
        // starts with the later S-row.
        let ech = echelonize(sys);
        let al = prepare(&ech);
        // Both rows are identical after echelonization with an all-zero M and
        // equal values, so they are deduplicated to a single candidate.
        assert_eq!(al.entry(0).candidate_count(), 1);
    }
}
