//! Closed-form analytical estimators for search cost, used for instance
//! sizing and as sanity checks against measured [`crate::solve::SolveStats`].

use crate::echelon::EchelonSystem;

/// Per-block branching factor `B_j = |S_j| . 2^(p_j - l_j)`.
fn branching_factors(echelon: &EchelonSystem) -> Vec<f64> {
    echelon
        .system()
        .blocks()
        .iter()
        .zip(echelon.pivot_counts())
        .map(|(block, &p)| {
            let l = block.width() as i32;
            let k = block.s().nrows() as f64;
            k * 2f64.powi(p as i32 - l)
        })
        .collect()
}

/// Expected number of search nodes visited (`N_total`).
///
/// `1 + Σ_{i=2..m} Π_{j=1..i-1} B_j`, one-indexed per the closed-form
/// definition; `m < 2` degenerates to the root term alone.
pub fn expected_nodes(echelon: &EchelonSystem) -> f64 {
    let b = branching_factors(echelon);
    let m = b.len();
    let mut total = 1.0;
    for i in 2..=m {
        total += b[..i - 1].iter().product::<f64>();
    }
    total
}

/// Expected sum-row XOR count, upper bound (`N_xor1`).
///
/// `Σ_{i=2..m} (m - i + 1) . Π_{j=1..i-1} B_j`.
pub fn expected_xor1(echelon: &EchelonSystem) -> f64 {
    let b = branching_factors(echelon);
    let m = b.len();
    let mut total = 0.0;
    for i in 2..=m {
        let prefix: f64 = b[..i - 1].iter().product();
        total += (m - i + 1) as f64 * prefix;
    }
    total
}

/// Expected sum-row XOR count, refined with pivot reduction (`N_xor2`).
///
/// `Σ_{i=2..m} (1 - 2^(-p_{i-1})) . (m - i + 1) . Π_{j=1..i-1} B_j`.
pub fn expected_xor2(echelon: &EchelonSystem) -> f64 {
    let b = branching_factors(echelon);
    let m = b.len();
    let pivots = echelon.pivot_counts();
    let mut total = 0.0;
    for i in 2..=m {
        let prefix: f64 = b[..i - 1].iter().product();
        let p_prev = pivots[i - 2] as i32;
        let reduction = 1.0 - 2f64.powi(-p_prev);
        total += reduction * (m - i + 1) as f64 * prefix;
    }
    total
}
