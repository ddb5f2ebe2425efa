//! Bulk kernels over whole slices.
//!
//! Each kernel comes in three flavours: a `scalar_*` reference loop, a
//! `simd_*` loop over full vectors with a masked tail, and a `par_simd_*`
//! form that splits large inputs across the rayon thread pool.

use crate::simd::{Associative, Binary};

pub trait SimdLanewise<Rhs = Self> {
    type Output;

    fn scalar_lanewise(self, op: Binary, rhs: Rhs) -> Self::Output;
    fn simd_lanewise(self, op: Binary, rhs: Rhs) -> Self::Output;
    fn par_simd_lanewise(self, op: Binary, rhs: Rhs) -> Self::Output;
}

pub trait SimdReduce {
    type Output;

    fn scalar_reduce(self, op: Associative) -> Self::Output;
    fn simd_reduce(self, op: Associative) -> Self::Output;
    fn par_simd_reduce(self, op: Associative) -> Self::Output;
}
