//! Single-Vector Operation Benchmarks
//!
//! Measures the per-call cost of the lanewise protocol on one species per
//! element width: plain and masked lanewise operators, reductions,
//! permutations and shape conversions.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lanewise::simd::{
    Associative, Binary, Conversion, FloatSpecies256, IntSpecies256, Mask, Shuffle, Vector,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_floats(rng: &mut StdRng) -> Vector<f32, 8> {
    FloatSpecies256::new().iota().add(Vector::from_array(std::array::from_fn(|_| rng.random())))
}

fn random_ints(rng: &mut StdRng) -> Vector<i32, 8> {
    IntSpecies256::new().iota().add(Vector::from_array(std::array::from_fn(|_| rng.random())))
}

fn benchmark_lanewise(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = random_floats(&mut rng);
    let b = random_floats(&mut rng);
    let m = Mask::<f32, 8>::from_long(0b1011_0110);

    let mut group = c.benchmark_group("Lanewise_f32x8");
    group.bench_function("add", |bench| {
        bench.iter(|| black_box(a).lanewise(Binary::Add, &black_box(b)))
    });
    group.bench_function("add_masked", |bench| {
        bench.iter(|| black_box(a).lanewise_masked(Binary::Add, &black_box(b), &m))
    });
    group.bench_function("fma", |bench| {
        bench.iter(|| black_box(a).fma(black_box(b), black_box(a)))
    });
    group.bench_function("hypot", |bench| {
        bench.iter(|| black_box(a).lanewise(Binary::Hypot, &black_box(b)))
    });
    group.finish();
}

fn benchmark_reduce(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let floats = random_floats(&mut rng);
    let ints = random_ints(&mut rng);

    let mut group = c.benchmark_group("Reduce");
    group.bench_function("f32x8_add", |bench| {
        bench.iter(|| black_box(floats).reduce_lanes(Associative::Add))
    });
    group.bench_function("i32x8_xor", |bench| {
        bench.iter(|| black_box(ints).reduce_lanes(Associative::Xor))
    });
    group.finish();
}

fn benchmark_permutation(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(9);
    let v = random_ints(&mut rng);
    let w = random_ints(&mut rng);
    let reverse = Shuffle::<i32, 8>::iota(7, -1, true);
    let zip = Shuffle::<i32, 8>::make_zip(0).unwrap_or(reverse);
    let m = Mask::<i32, 8>::from_long(0b0101_1100);

    let mut group = c.benchmark_group("Permutation_i32x8");
    group.bench_function("rearrange", |bench| {
        bench.iter(|| black_box(v).rearrange(&reverse))
    });
    group.bench_function("rearrange_two_source", |bench| {
        bench.iter(|| black_box(v).rearrange_with(&zip, &w))
    });
    group.bench_function("compress", |bench| {
        bench.iter(|| black_box(v).compress(&m))
    });
    group.bench_function("slice", |bench| {
        bench.iter(|| black_box(v).slice(3, &w))
    });
    group.finish();
}

fn benchmark_conversion(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let v = random_ints(&mut rng);

    let mut group = c.benchmark_group("Conversion_i32x8");
    group.bench_function("convert_f64_part1", |bench| {
        bench.iter(|| {
            black_box(v).convert_shape::<f64, 4>(Conversion::Convert, black_box(1))
        })
    });
    group.bench_function("reinterpret_i8", |bench| {
        bench.iter(|| black_box(v).reinterpret_shape::<i8, 32>(0))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_lanewise,
    benchmark_reduce,
    benchmark_permutation,
    benchmark_conversion
);
criterion_main!(benches);
