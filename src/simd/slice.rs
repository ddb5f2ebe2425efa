//! Slice implementations of the bulk kernels.
//!
//! Every element kind runs on its 256-bit species. Output buffers are
//! allocated zeroed and filled one vector at a time; the final partial vector
//! goes through `index_in_range` masked loads and stores.

use log::trace;
use rayon::prelude::*;

use crate::error::{arithmetic_error, length_mismatch, Result};
use crate::simd::traits::{SimdLanewise, SimdReduce};
use crate::simd::{Associative, Binary, Element, Mask, Species, Vector};
use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_SIMD_THRESHOLD};

use half::f16;

/// Validates a bulk lanewise call before any output is produced.
fn check_lanewise<T: Element>(op: Binary, a: &[T], b: &[T]) -> Result<()> {
    op.check(T::KIND)?;
    if a.len() != b.len() {
        return Err(length_mismatch(
            a.len(),
            b.len(),
            "slices must be the same length",
        ));
    }
    if op == Binary::Div && T::KIND.is_integral() {
        if let Some(index) = b.iter().position(|&e| e == T::ZERO) {
            return Err(arithmetic_error(format!(
                "division by zero at index {}",
                index
            )));
        }
    }
    Ok(())
}

/// Rounds the rayon chunk size down to a whole number of vectors.
#[inline(always)]
fn parallel_chunk<const N: usize>() -> usize {
    (PARALLEL_CHUNK_SIZE / N).max(1) * N
}

pub fn scalar_lanewise<T: Element>(a: &[T], b: &[T], op: Binary) -> Result<Vec<T>> {
    check_lanewise(op, a, b)?;

    Ok(a.iter().zip(b.iter()).map(|(&x, &y)| T::binary(op, x, y)).collect())
}

#[inline(always)]
fn simd_lanewise_block<T: Element, const N: usize>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    op: Binary,
) -> Result<()> {
    let species = Species::<T, N>::new();
    let bound = species.loop_bound(a.len());

    for i in (0..bound).step_by(N) {
        let x = Vector::<T, N>::from_slice(a, i)?;
        let y = Vector::<T, N>::from_slice(b, i)?;
        x.lanewise(op, &y)?.into_slice(c, i)?;
    }

    if bound < a.len() {
        let m = Mask::<T, N>::index_in_range(bound, a.len());
        let x = Vector::from_slice_masked(a, bound, &m)?;
        let y = Vector::from_slice_masked(b, bound, &m)?;
        x.lanewise_masked(op, &y, &m)?.into_slice_masked(c, bound, &m)?;
    }

    Ok(())
}

pub fn simd_lanewise<T: Element, const N: usize>(a: &[T], b: &[T], op: Binary) -> Result<Vec<T>> {
    check_lanewise(op, a, b)?;

    let mut c = vec![T::ZERO; a.len()];
    simd_lanewise_block::<T, N>(a, b, &mut c, op)?;

    Ok(c)
}

pub fn par_simd_lanewise<T: Element, const N: usize>(
    a: &[T],
    b: &[T],
    op: Binary,
) -> Result<Vec<T>> {
    if a.len() <= PARALLEL_SIMD_THRESHOLD {
        return simd_lanewise::<T, N>(a, b, op);
    }
    check_lanewise(op, a, b)?;

    let chunk = parallel_chunk::<N>();
    trace!(
        "parallel {} over {} x {} in chunks of {}",
        op.name(),
        a.len(),
        T::KIND,
        chunk
    );

    let mut c = vec![T::ZERO; a.len()];
    c.par_chunks_mut(chunk)
        .zip(a.par_chunks(chunk))
        .zip(b.par_chunks(chunk))
        .try_for_each(|((c_chunk, a_chunk), b_chunk)| {
            simd_lanewise_block::<T, N>(a_chunk, b_chunk, c_chunk, op)
        })?;

    Ok(c)
}

pub fn scalar_reduce<T: Element>(a: &[T], op: Associative) -> Result<T> {
    op.check(T::KIND)?;

    let binary = op.as_binary();
    Ok(a.iter().fold(T::identity(op), |acc, &x| T::binary(binary, acc, x)))
}

pub fn simd_reduce<T: Element, const N: usize>(a: &[T], op: Associative) -> Result<T> {
    op.check(T::KIND)?;

    let species = Species::<T, N>::new();
    let binary = op.as_binary();
    let identity = species.broadcast(T::identity(op));
    let bound = species.loop_bound(a.len());

    let tail = if bound < a.len() {
        let m = Mask::<T, N>::index_in_range(bound, a.len());
        Some(identity.blend(&Vector::from_slice_masked(a, bound, &m)?, &m))
    } else {
        None
    };
    let chunks = (0..bound)
        .step_by(N)
        .map(|i| Vector::<T, N>::from_slice(a, i))
        .chain(tail.map(Ok));

    if op == Associative::FirstNonzero {
        // lane order matters, so chunks are combined front to back
        let mut acc = T::identity(op);
        for v in chunks {
            acc = T::binary(binary, acc, v?.reduce_lanes(op)?);
        }
        return Ok(acc);
    }

    let mut acc = identity;
    for v in chunks {
        acc = acc.lanewise(binary, &v?)?;
    }
    acc.reduce_lanes(op)
}

pub fn par_simd_reduce<T: Element, const N: usize>(a: &[T], op: Associative) -> Result<T> {
    if a.len() <= PARALLEL_SIMD_THRESHOLD {
        return simd_reduce::<T, N>(a, op);
    }
    op.check(T::KIND)?;

    let chunk = parallel_chunk::<N>();
    trace!(
        "parallel reduce {} over {} x {} in chunks of {}",
        op.name(),
        a.len(),
        T::KIND,
        chunk
    );

    let partials = a
        .par_chunks(chunk)
        .map(|a_chunk| simd_reduce::<T, N>(a_chunk, op))
        .collect::<Result<Vec<T>>>()?;

    let binary = op.as_binary();
    Ok(partials
        .into_iter()
        .fold(T::identity(op), |acc, x| T::binary(binary, acc, x)))
}

macro_rules! impl_bulk {
    ($t:ty, $lanes:literal) => {
        impl<'b> SimdLanewise<&'b [$t]> for &[$t] {
            type Output = Result<Vec<$t>>;

            #[inline(always)]
            fn scalar_lanewise(self, op: Binary, rhs: &'b [$t]) -> Self::Output {
                scalar_lanewise(self, rhs, op)
            }

            #[inline(always)]
            fn simd_lanewise(self, op: Binary, rhs: &'b [$t]) -> Self::Output {
                simd_lanewise::<$t, $lanes>(self, rhs, op)
            }

            #[inline(always)]
            fn par_simd_lanewise(self, op: Binary, rhs: &'b [$t]) -> Self::Output {
                par_simd_lanewise::<$t, $lanes>(self, rhs, op)
            }
        }

        impl SimdReduce for &[$t] {
            type Output = Result<$t>;

            #[inline(always)]
            fn scalar_reduce(self, op: Associative) -> Self::Output {
                scalar_reduce(self, op)
            }

            #[inline(always)]
            fn simd_reduce(self, op: Associative) -> Self::Output {
                simd_reduce::<$t, $lanes>(self, op)
            }

            #[inline(always)]
            fn par_simd_reduce(self, op: Associative) -> Self::Output {
                par_simd_reduce::<$t, $lanes>(self, op)
            }
        }
    };
}

impl_bulk!(i8, 32);
impl_bulk!(i16, 16);
impl_bulk!(i32, 8);
impl_bulk!(i64, 4);
impl_bulk!(f16, 16);
impl_bulk!(f32, 8);
impl_bulk!(f64, 4);
