//! MRHS Solver - GF(2) Multiple Right-Hand Sides linear system solver
//!
//! This library solves systems of the form: find a binary vector `x` such
//! that, for every block `j`, `x . M_j` is one of the rows of that block's
//! allowed right-hand-side matrix `S_j`. This is the core combinatorial
//! engine behind the Raddum-Zajac algebraic cryptanalysis technique.
//!
//! # Features
//!
//! - **Echelon reduction**: reduces every block's M-matrix to row-echelon
//!   form with pivots packed at the most significant bits, recording both
//!   the row operations (as an accumulator matrix) and the column
//!   permutation applied.
//! - **Active-list construction**: builds a per-block lookup table over
//!   candidate right-hand sides, keyed by the non-pivot ("index") bits,
//!   with precomputed incremental deltas for fast bucket-index maintenance.
//! - **Exhaustive search**: a non-recursive, backtracking depth-first
//!   search over the active lists, reporting every satisfying assignment.
//! - **Closed-form estimators**: analytical node/XOR-count predictions for
//!   sizing a search before running it.
//!
//! # Quick Start
//!
//! ```rust
//! use mrhs_solver::{echelonize, prepare, solve, MrhsSystem, SolverConfig};
//! use std::ops::ControlFlow;
//!
//! let mut system = MrhsSystem::new(2, &[2], &[2]).unwrap();
//! system.set_m_bit(0, 0, 0, true);
//! system.set_m_bit(0, 1, 1, true);
//! system.set_s_row(0, 0, 0b01).unwrap();
//! system.set_s_row(0, 1, 0b10).unwrap();
//!
//! let echelon = echelonize(system);
//! let active = prepare(&echelon);
//!
//! let mut found = Vec::new();
//! let stats = solve(&active, &echelon, &SolverConfig::default(), |x| {
//!     found.push(x.clone());
//!     ControlFlow::Continue(())
//! });
//! assert_eq!(stats.solutions as usize, found.len());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]

pub mod bitvec;
pub mod bitword;
pub mod block_matrix;
pub mod config;
pub mod echelon;
pub mod error;
pub mod estimators;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod prepare;
pub mod solve;
pub mod system;

pub use bitvec::BitVec;
pub use bitword::BlockWord;
pub use block_matrix::BlockMatrix;
pub use config::SolverConfig;
pub use echelon::{echelonize, EchelonSystem};
pub use error::{Result, SolverError};
pub use estimators::{expected_nodes, expected_xor1, expected_xor2};
#[cfg(feature = "parallel")]
pub use parallel::solve_parallel_by_first_block;
pub use prepare::{prepare, ActiveList, ActiveListEntry, Candidate};
pub use solve::{solve, SolveStats};
pub use system::{Block, MrhsSystem};

/// Crate version, as recorded in `Cargo.toml`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
