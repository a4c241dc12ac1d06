//! Error types for the MRHS solver.
//!
//! This module defines every precondition violation the crate can report,
//! all surfaced through a single [`SolverError`] rather than a process abort.

use thiserror::Error;

/// Primary error type for the MRHS solver core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Construction was given arrays of mismatched length, or a block's row
    /// count does not match the system's row count.
    #[error("dimension mismatch in block {block}: expected {expected_rows} rows, got {actual_rows}")]
    DimensionMismatch {
        /// Block index the mismatch was found at.
        block: usize,
        /// Row count the caller's arrays implied.
        expected_rows: usize,
        /// Row count actually supplied.
        actual_rows: usize,
    },

    /// `blocksizes`/`rhscounts` arrays passed to `MrhsSystem::new` differ in
    /// length from `nblocks`, or a block width is zero or exceeds the
    /// machine word width.
    #[error("invalid block width {width} for block {block} (must be 1..={max})")]
    InvalidBlockWidth {
        /// Offending block index.
        block: usize,
        /// Width that was rejected.
        width: u32,
        /// Largest width the crate supports.
        max: u32,
    },

    /// An S-block entry has bits set outside its block's active width.
    #[error("rhs value {value:#x} in block {block} exceeds its {width}-bit width")]
    RhsWidthExceeded {
        /// Block the offending row belongs to.
        block: usize,
        /// The out-of-range value.
        value: u64,
        /// The block's active width.
        width: u32,
    },

    /// `prepare` was asked to size an arena/lookup table that does not fit in
    /// memory. Practically unreachable since Rust's global allocator aborts
    /// the process on OOM; modeled for API completeness.
    #[error("allocation failure while preparing active list for block {block}")]
    AllocationFailure {
        /// Block whose active list allocation failed.
        block: usize,
    },
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = SolverError::DimensionMismatch {
            block: 2,
            expected_rows: 10,
            actual_rows: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("block 2"));
        assert!(msg.contains("10"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_rhs_width_exceeded_display() {
        let err = SolverError::RhsWidthExceeded {
            block: 0,
            value: 0xFF,
            width: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("0xff"));
        assert!(msg.contains("4-bit"));
    }
}
