use std::ops::ControlFlow;

use criterion::{criterion_group, criterion_main, Criterion};
use mrhs_solver::{echelonize, estimators, prepare, solve, MrhsSystem, SolverConfig};

fn build_system(nblocks: usize, width: u32, rhs_per_block: usize) -> MrhsSystem {
    let blocksizes = vec![width; nblocks];
    let rhscounts = vec![rhs_per_block; nblocks];
    let mut system = MrhsSystem::new(width as usize, &blocksizes, &rhscounts).unwrap();

    for j in 0..nblocks {
        for row in 0..(width as usize) {
            system.set_m_bit(j, row, row as u32, true);
        }
        for k in 0..rhs_per_block {
            let value = (k as u64).wrapping_mul(0x9E37_79B9) & ((1u64 << width) - 1);
            system.set_s_row(j, k, value).unwrap();
        }
    }
    system
}

fn bench_echelonize(c: &mut Criterion) {
    c.bench_function("echelonize_4x8", |b| {
        b.iter(|| {
            let system = build_system(4, 8, 4);
            echelonize(system)
        });
    });
}

fn bench_prepare(c: &mut Criterion) {
    let system = build_system(4, 8, 4);
    let echelon = echelonize(system);
    c.bench_function("prepare_4x8", |b| {
        b.iter(|| prepare(&echelon));
    });
}

fn bench_solve(c: &mut Criterion) {
    let system = build_system(4, 8, 4);
    let echelon = echelonize(system);
    let active = prepare(&echelon);
    let config = SolverConfig::default();
    c.bench_function("solve_4x8", |b| {
        b.iter(|| {
            solve(&active, &echelon, &config, |_| ControlFlow::Continue(()));
        });
    });
}

fn bench_estimators(c: &mut Criterion) {
    let system = build_system(6, 10, 8);
    let echelon = echelonize(system);
    c.bench_function("estimators_6x10", |b| {
        b.iter(|| {
            (
                estimators::expected_nodes(&echelon),
                estimators::expected_xor1(&echelon),
                estimators::expected_xor2(&echelon),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_echelonize,
    bench_prepare,
    bench_solve,
    bench_estimators
);
criterion_main!(benches);
