//! Lane permutations.
//!
//! A [`Shuffle<T, N>`] stores one signed source index per lane, always in
//! `[-N, N)`. Non-negative indices name a lane directly; negative indices are
//! *exceptional*. Depending on the consumer an exceptional index is either
//! wrapped back into range (one-source [`Vector::rearrange`]) or interpreted as
//! `k + N` in a second source vector ([`Vector::rearrange_with`]).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::error::{
    check_index, check_window, invalid_part, invalid_shuffle_index, length_mismatch, Result,
};
use crate::simd::{Element, Mask, Species, Vector};

/// Brings an arbitrary source index into `[-lane_count, lane_count)`.
///
/// Indices in `[0, lane_count)` pass through. Everything else is reduced
/// modulo `lane_count` and shifted into the exceptional range, so `-1` stays
/// `-1` and, with four lanes, `5` becomes `-3`.
#[inline(always)]
pub fn partially_wrap_index(index: i32, lane_count: usize) -> i32 {
    partially_wrap_long(index as i64, lane_count)
}

#[inline(always)]
pub(crate) fn partially_wrap_long(index: i64, lane_count: usize) -> i32 {
    let n = lane_count as i64;
    if (0..n).contains(&index) {
        index as i32
    } else {
        (index.rem_euclid(n) - n) as i32
    }
}

/// Maps a partially wrapped index onto a lane in `[0, lane_count)`.
#[inline(always)]
pub fn wrap_index(index: i32, lane_count: usize) -> usize {
    let n = lane_count as i32;
    if lane_count.is_power_of_two() {
        (index & (n - 1)) as usize
    } else if index < 0 {
        (index + n) as usize
    } else {
        index as usize
    }
}

/// Per-lane permutation tied to the species `Species<T, N>`.
pub struct Shuffle<T: Element, const N: usize> {
    indices: [i32; N],
    _element: PhantomData<T>,
}

impl<T: Element, const N: usize> Clone for Shuffle<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element, const N: usize> Copy for Shuffle<T, N> {}

impl<T: Element, const N: usize> PartialEq for Shuffle<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.indices == other.indices
    }
}

impl<T: Element, const N: usize> Eq for Shuffle<T, N> {}

impl<T: Element, const N: usize> Hash for Shuffle<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.indices.hash(state);
    }
}

impl<T: Element, const N: usize> Shuffle<T, N> {
    /// Builds a shuffle from indices already in `[-N, N)`.
    #[inline(always)]
    pub(crate) fn from_wrapped(indices: [i32; N]) -> Self {
        let () = Species::<T, N>::VALID;
        debug_assert!(indices.iter().all(|&k| (-(N as i32)..N as i32).contains(&k)));
        Self {
            indices,
            _element: PhantomData,
        }
    }

    /// Lane `i` selects `f(i)`, partially wrapped.
    pub fn from_op(f: impl Fn(usize) -> i32) -> Self {
        Self::from_wrapped(std::array::from_fn(|i| partially_wrap_index(f(i), N)))
    }

    /// Lane `i` selects `start + i * step`.
    ///
    /// With `wrap` the index is reduced modulo `N` into a valid lane;
    /// otherwise it is partially wrapped and may be exceptional.
    pub fn iota(start: i32, step: i32, wrap: bool) -> Self {
        let n = N as i32;
        Self::from_op(|i| {
            let index = (i as i32).wrapping_mul(step).wrapping_add(start);
            if wrap {
                index.rem_euclid(n)
            } else {
                index
            }
        })
    }

    /// Reads `N` indices from `indices` at `offset`, partially wrapping each.
    pub fn from_array(indices: &[i32], offset: usize) -> Result<Self> {
        check_window(offset, N, indices.len())?;
        Ok(Self::from_op(|i| indices[offset + i]))
    }

    /// Builds a shuffle from exactly `N` raw indices, each of which must
    /// already lie in `[-N, N)`.
    pub fn try_from_indices(indices: &[i32]) -> Result<Self> {
        if indices.len() != N {
            return Err(length_mismatch(
                N,
                indices.len(),
                "shuffle indices must cover every lane",
            ));
        }
        let n = N as i32;
        if let Some((lane, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, k)| !(-n..n).contains(*k))
        {
            return Err(invalid_shuffle_index(lane, index, N));
        }
        Ok(Self::from_wrapped(std::array::from_fn(|i| indices[i])))
    }

    /// Interleaves half of two vectors: `part` 0 zips the low halves, `part` 1
    /// the high halves. Used with [`Vector::rearrange_with`].
    pub fn make_zip(part: usize) -> Result<Self> {
        if part > 1 {
            return Err(invalid_part(part as isize, "zip part must be 0 or 1"));
        }
        let origin = (part * N / 2) as i32;
        let n = N as i32;
        Ok(Self::from_wrapped(std::array::from_fn(|i| {
            let index = origin + (i / 2) as i32;
            if i % 2 == 0 {
                index
            } else {
                index - n
            }
        })))
    }

    /// De-interleaves two vectors: `part` 0 collects even lanes, `part` 1 odd
    /// lanes. Used with [`Vector::rearrange_with`].
    pub fn make_unzip(part: usize) -> Result<Self> {
        if part > 1 {
            return Err(invalid_part(part as isize, "unzip part must be 0 or 1"));
        }
        let n = N as i32;
        Ok(Self::from_wrapped(std::array::from_fn(|i| {
            let index = (2 * i + part) as i32;
            if index < n {
                index
            } else {
                index - 2 * n
            }
        })))
    }

    #[inline(always)]
    pub fn species(&self) -> Species<T, N> {
        Species::new()
    }

    #[inline(always)]
    pub const fn length(&self) -> usize {
        N
    }

    /// The raw index stored in lane `i`.
    pub fn lane_source(&self, i: usize) -> Result<i32> {
        check_index(i, N).map(|i| self.indices[i])
    }

    #[inline(always)]
    pub(crate) fn index(&self, i: usize) -> i32 {
        self.indices[i]
    }

    /// Lanes holding a non-exceptional index.
    pub fn lane_is_valid(&self) -> Mask<T, N> {
        Mask::from_fn(|i| self.indices[i] >= 0)
    }

    /// Every exceptional index replaced by the lane it wraps to.
    pub fn wrap_indexes(&self) -> Self {
        Self::from_wrapped(self.indices.map(|k| wrap_index(k, N) as i32))
    }

    /// Fails on the first exceptional index, otherwise returns the shuffle unchanged.
    pub fn check_indexes(&self) -> Result<Self> {
        match self.indices.iter().position(|&k| k < 0) {
            Some(lane) => Err(invalid_shuffle_index(lane, self.indices[lane], N)),
            None => Ok(*self),
        }
    }

    pub fn to_array(&self) -> [i32; N] {
        self.indices
    }

    /// Writes the `N` raw indices into `out` starting at `offset`.
    pub fn into_slice(&self, out: &mut [i32], offset: usize) -> Result<()> {
        check_window(offset, N, out.len())?;
        out[offset..offset + N].copy_from_slice(&self.indices);
        Ok(())
    }

    /// The indices as lane values of `T`.
    pub fn to_vector(&self) -> Vector<T, N> {
        Vector::from_array(self.indices.map(|k| T::from_index(k as i64)))
    }

    /// The indices as lanes of the same-width integral kind.
    pub fn to_bits_vector(&self) -> Vector<T::Integral, N> {
        Vector::from_array(self.indices.map(|k| T::Integral::from_index(k as i64)))
    }

    /// Permutes this shuffle by `other`: lane `i` of the result is the index
    /// this shuffle stores in lane `other[i]`, with `other` wrapped.
    pub fn rearrange(&self, other: &Self) -> Self {
        let order = Shuffle::<T::Integral, N>::from_wrapped(other.indices);
        let permuted = self.to_bits_vector().rearrange(&order).to_shuffle();
        Self::from_wrapped(permuted.indices)
    }

    /// Views the shuffle under another species with the same lane count.
    pub fn cast<U: Element, const M: usize>(&self) -> Result<Shuffle<U, M>> {
        if M != N {
            return Err(length_mismatch(
                N,
                M,
                format!("cannot cast a {}-lane shuffle to {} lanes", N, M),
            ));
        }
        Ok(Shuffle::from_wrapped(std::array::from_fn(|i| self.indices[i])))
    }
}

impl<T: Element, const N: usize> fmt::Display for Shuffle<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shuffle{:?}", self.indices)
    }
}

impl<T: Element, const N: usize> fmt::Debug for Shuffle<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
