//! The MRHS system: a pair of per-block M/S matrices, the input to the solver.

use crate::bitword::{BlockWord, WORD_WIDTH};
use crate::block_matrix::BlockMatrix;
use crate::error::{Result, SolverError};

/// A single block's pair of matrices: `m` (n × l) and `s` (k × l), the
/// allowed right-hand sides for that block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    m: BlockMatrix,
    s: BlockMatrix,
}

impl Block {
    /// Active column count shared by `m` and `s`.
    #[inline]
    pub fn width(&self) -> u32 {
        self.m.width()
    }

    /// The block's constraint matrix.
    #[inline]
    pub fn m(&self) -> &BlockMatrix {
        &self.m
    }

    /// The block's constraint matrix, mutably.
    #[inline]
    pub fn m_mut(&mut self) -> &mut BlockMatrix {
        &mut self.m
    }

    /// The block's allowed right-hand sides.
    #[inline]
    pub fn s(&self) -> &BlockMatrix {
        &self.s
    }

    /// The block's allowed right-hand sides, mutably.
    #[inline]
    pub fn s_mut(&mut self) -> &mut BlockMatrix {
        &mut self.s
    }
}

/// An MRHS system: `n` rows shared by every M-block, and `m.len()` blocks
/// each pairing an M-matrix with its allowed right-hand-side set S.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrhsSystem {
    nrows: usize,
    blocks: Vec<Block>,
}

impl MrhsSystem {
    /// Construct a system with `nrows` rows and one block per entry of
    /// `blocksizes`/`rhscounts` (block `j` gets width `blocksizes[j]` and
    /// `rhscounts[j]` candidate rhs values, all initially zero).
    ///
    /// Returns [`SolverError::InvalidBlockWidth`] if a width is zero or
    /// exceeds the machine word width, or [`SolverError::DimensionMismatch`]
    /// if the two arrays differ in length.
    pub fn new(nrows: usize, blocksizes: &[u32], rhscounts: &[usize]) -> Result<Self> {
        if blocksizes.len() != rhscounts.len() {
            return Err(SolverError::DimensionMismatch {
                block: blocksizes.len().max(rhscounts.len()),
                expected_rows: blocksizes.len(),
                actual_rows: rhscounts.len(),
            });
        }

        let mut blocks = Vec::with_capacity(blocksizes.len());
        for (j, (&width, &k)) in blocksizes.iter().zip(rhscounts.iter()).enumerate() {
            if width == 0 || width > WORD_WIDTH {
                return Err(SolverError::InvalidBlockWidth {
                    block: j,
                    width,
                    max: WORD_WIDTH,
                });
            }
            blocks.push(Block {
                m: BlockMatrix::zeros(nrows, width),
                s: BlockMatrix::zeros(k, width),
            });
        }

        Ok(MrhsSystem { nrows, blocks })
    }

    /// Row count shared by every M-block.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of blocks.
    #[inline]
    pub fn nblocks(&self) -> usize {
        self.blocks.len()
    }

    /// Borrow the blocks in order.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Borrow the blocks mutably.
    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// Set a bit of M-block `block` at (row, col).
    pub fn set_m_bit(&mut self, block: usize, row: usize, col: u32, value: bool) {
        self.blocks[block].m_mut().set_bit(row, col, value);
    }

    /// Set a full row of S-block `block` from an LSB-aligned integer.
    ///
    /// Returns [`SolverError::RhsWidthExceeded`] if `value` has bits set
    /// outside the block's active width.
    pub fn set_s_row(&mut self, block: usize, row: usize, value: u64) -> Result<()> {
        let width = self.blocks[block].width();
        if width < WORD_WIDTH && (value >> width) != 0 {
            return Err(SolverError::RhsWidthExceeded {
                block,
                value,
                width,
            });
        }
        let word = BlockWord::from_lsb_value(value, width);
        self.blocks[block].s_mut().set_row(row, word);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_valid_system() {
        let sys = MrhsSystem::new(3, &[2, 2], &[2, 2]).unwrap();
        assert_eq!(sys.nrows(), 3);
        assert_eq!(sys.nblocks(), 2);
        assert_eq!(sys.blocks()[0].width(), 2);
    }

    #[test]
    fn test_mismatched_arrays_rejected() {
        let err = MrhsSystem::new(3, &[2, 2], &[2]).unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_invalid_width_rejected() {
        let err = MrhsSystem::new(3, &[0], &[1]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidBlockWidth { .. }));

        let err = MrhsSystem::new(3, &[65], &[1]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidBlockWidth { .. }));
    }

    #[test]
    fn test_set_s_row_width_check() {
        let mut sys = MrhsSystem::new(3, &[2], &[1]).unwrap();
        assert!(sys.set_s_row(0, 0, 0b11).is_ok());
        let err = sys.set_s_row(0, 0, 0b100).unwrap_err();
        assert!(matches!(err, SolverError::RhsWidthExceeded { .. }));
    }

    #[test]
    fn test_empty_block_system() {
        let sys = MrhsSystem::new(0, &[], &[]).unwrap();
        assert_eq!(sys.nblocks(), 0);
    }
}
