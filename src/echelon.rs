//! Reduces an [`MrhsSystem`]'s M-blocks to echelon form with pivots packed at
//! the most-significant bits of each block, recording the row operations
//! applied and the column permutation induced in every block.

use crate::bitvec::BitVec;
use crate::system::MrhsSystem;

#[cfg(feature = "trace")]
use tracing::{debug, trace};

/// An [`MrhsSystem`] after [`echelonize`], carrying the pivot counts, the
/// accumulator `A` (`A . M_original = M_echelon`, row operations only), and
/// the column permutation applied to each block.
///
/// `prepare` only accepts this type, turning the "echelonize before prepare"
/// precondition from the original design into a compile-time guarantee
/// instead of a runtime abort.
#[derive(Debug, Clone)]
pub struct EchelonSystem {
    system: MrhsSystem,
    pivots: Vec<usize>,
    /// `column_perm[j][echelon_index] = original_index` for block `j`.
    column_perm: Vec<Vec<usize>>,
    /// Row accumulator: `a[r]` is an n-bit vector such that
    /// `(a[r] dot M_original_j) == M_echelon_j.row(r)` for every block `j`.
    a: Vec<BitVec>,
}

impl EchelonSystem {
    /// The underlying system, with M in echelon form and S permuted to match.
    #[inline]
    pub fn system(&self) -> &MrhsSystem {
        &self.system
    }

    /// Pivot count `p_j` for each block, in block order.
    #[inline]
    pub fn pivot_counts(&self) -> &[usize] {
        &self.pivots
    }

    /// Total pivots across all blocks (`Σ p_j`).
    #[inline]
    pub fn total_pivots(&self) -> usize {
        self.pivots.iter().sum()
    }

    /// Global row index of block `j`'s first pivot row (`r_j` in the spec).
    #[inline]
    pub fn pivot_row_offset(&self, block: usize) -> usize {
        self.pivots[..block].iter().sum()
    }

    /// `A`'s rows: `a[r] . M_original_j == M_echelon_j.row(r)` for every block.
    #[inline]
    pub fn accumulator(&self) -> &[BitVec] {
        &self.a
    }

    /// The column permutation applied to block `j`:
    /// `column_perm[echelon_index] == original_index`.
    #[inline]
    pub fn column_permutation(&self, block: usize) -> &[usize] {
        &self.column_perm[block]
    }
}

/// Echelonize `system`'s M-blocks in place (conceptually — the consuming
/// signature expresses that the precondition "echelonize before prepare" now
/// holds for the returned value), packing pivots at the MSB of each block and
/// mirroring every column swap into the corresponding S-block.
///
/// Never fails: a block that contributes no pivots (`p_j = 0`) is valid and
/// only participates in indexing.
pub fn echelonize(mut system: MrhsSystem) -> EchelonSystem {
    let n = system.nrows();
    let nblocks = system.nblocks();

    let mut a: Vec<BitVec> = (0..n).map(|i| BitVec::unit(n, i)).collect();
    let mut pivots = Vec::with_capacity(nblocks);
    let mut column_perm: Vec<Vec<usize>> = Vec::with_capacity(nblocks);

    let mut r = 0usize;
    for j in 0..nblocks {
        let width = system.blocks()[j].width();
        let mut perm: Vec<usize> = (0..width as usize).collect();
        let mut p = 0u32;

        let mut c = 0u32;
        while c < width {
            let found = system.blocks()[j].m().find_pivot_row(r, c);
            if let Some(r_prime) = found {
                if r_prime != r {
                    for block in system.blocks_mut() {
                        block.m_mut().swap_rows(r, r_prime);
                    }
                    a.swap(r, r_prime);
                }
                for r_other in 0..n {
                    if r_other != r && system.blocks()[j].m().bit(r_other, c) {
                        for block in system.blocks_mut() {
                            block.m_mut().xor_row_into(r, r_other);
                        }
                        let row_r = a[r].clone();
                        a[r_other].xor_assign(&row_r);
                    }
                }
                if c != p {
                    system.blocks_mut()[j].m_mut().swap_columns(c, p);
                    system.blocks_mut()[j].s_mut().swap_columns(c, p);
                    perm.swap(c as usize, p as usize);
                }
                r += 1;
                p += 1;
            }
            c += 1;
        }

        #[cfg(feature = "trace")]
        trace!(block = j, pivots = p, rows_consumed = r, "echelonized block");

        pivots.push(p as usize);
        column_perm.push(perm);
    }

    #[cfg(feature = "trace")]
    debug!(total_pivots = pivots.iter().sum::<usize>(), n, "echelonize complete");

    EchelonSystem {
        system,
        pivots,
        column_perm,
        a,
    }
}
