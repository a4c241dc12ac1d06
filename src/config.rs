//! Solver-wide tunables, mirroring how the rest of this crate's callers
//! configure a run instead of threading individual parameters through.

/// Runtime configuration for [`crate::solve::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Stop the search once this many solutions have been found. `0` means
    /// unbounded (search until exhaustion or the callback breaks).
    pub solution_cap: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig { solution_cap: 0 }
    }
}
