//! Per-lane boolean masks.
//!
//! A [`Mask<T, N>`] is packed into the low `N` bits of a `u64` (lane `i` in
//! bit `i`); species never exceed 64 lanes, so the packed form always fits.
//! Bits at and above `N` are kept clear, which lets every derived quantity
//! (`true_count`, `first_true`, `last_true`, ...) be read straight off the
//! word.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::error::{capacity_exceeded, check_index, check_window, length_mismatch, Result};
use crate::simd::{Element, Species, Vector};

/// Boolean-per-lane value tied to the species `Species<T, N>`.
pub struct Mask<T: Element, const N: usize> {
    bits: u64,
    _element: PhantomData<T>,
}

impl<T: Element, const N: usize> Clone for Mask<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element, const N: usize> Copy for Mask<T, N> {}

impl<T: Element, const N: usize> PartialEq for Mask<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T: Element, const N: usize> Eq for Mask<T, N> {}

impl<T: Element, const N: usize> Hash for Mask<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
    }
}

/// The word with the low `count` bits set.
#[inline(always)]
pub(crate) const fn low_bits(count: usize) -> u64 {
    if count >= 64 {
        u64::MAX
    } else {
        (1u64 << count) - 1
    }
}

impl<T: Element, const N: usize> Mask<T, N> {
    const LANES: u64 = low_bits(N);

    #[inline(always)]
    pub(crate) fn from_bits(bits: u64) -> Self {
        let () = Species::<T, N>::VALID;
        Self {
            bits: bits & Self::LANES,
            _element: PhantomData,
        }
    }

    /// Lane `i` is `f(i)`.
    #[inline(always)]
    pub fn from_fn(mut f: impl FnMut(usize) -> bool) -> Self {
        let mut bits = 0u64;
        for i in 0..N {
            if f(i) {
                bits |= 1 << i;
            }
        }
        Self::from_bits(bits)
    }

    /// Every lane set to `bit`.
    #[inline(always)]
    pub fn all(bit: bool) -> Self {
        Self::from_bits(if bit { u64::MAX } else { 0 })
    }

    /// Lane `i` is bit `i` of `bits`; bits at and above `N` are ignored.
    #[inline(always)]
    pub fn from_long(bits: u64) -> Self {
        Self::from_bits(bits)
    }

    #[inline(always)]
    pub fn from_array(bits: [bool; N]) -> Self {
        Self::from_fn(|i| bits[i])
    }

    /// Reads `N` booleans from `bits` starting at `offset`.
    pub fn from_slice(bits: &[bool], offset: usize) -> Result<Self> {
        check_window(offset, N, bits.len())?;
        Ok(Self::from_fn(|i| bits[offset + i]))
    }

    /// Lane `i` is set iff `offset + i < limit`.
    #[inline(always)]
    pub fn index_in_range(offset: usize, limit: usize) -> Self {
        Self::from_bits(low_bits(limit.saturating_sub(offset)))
    }

    #[inline(always)]
    pub fn species(&self) -> Species<T, N> {
        Species::new()
    }

    #[inline(always)]
    pub const fn length(&self) -> usize {
        N
    }

    /// Unchecked lane read; `i` must be below `N`.
    #[inline(always)]
    pub(crate) fn test_lane(&self, i: usize) -> bool {
        self.bits >> i & 1 == 1
    }

    /// Bounds-checked lane read.
    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        check_index(i, N).map(|i| self.test_lane(i))
    }

    pub fn to_array(&self) -> [bool; N] {
        std::array::from_fn(|i| self.test_lane(i))
    }

    /// Writes the `N` lane booleans into `out` starting at `offset`.
    pub fn into_slice(&self, out: &mut [bool], offset: usize) -> Result<()> {
        check_window(offset, N, out.len())?;
        for (i, slot) in out[offset..offset + N].iter_mut().enumerate() {
            *slot = self.test_lane(i);
        }
        Ok(())
    }

    /// Packs the mask into a word, lane 0 in the least significant bit.
    pub fn to_long(&self) -> Result<u64> {
        if N > u64::BITS as usize {
            return Err(capacity_exceeded(N, u64::BITS as usize));
        }
        Ok(self.bits)
    }

    #[inline(always)]
    pub fn true_count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Lowest set lane, or `N` when no lane is set.
    #[inline(always)]
    pub fn first_true(&self) -> usize {
        if self.bits == 0 {
            N
        } else {
            self.bits.trailing_zeros() as usize
        }
    }

    /// Highest set lane, or `N` when no lane is set.
    #[inline(always)]
    pub fn last_true(&self) -> usize {
        if self.bits == 0 {
            N
        } else {
            (63 - self.bits.leading_zeros()) as usize
        }
    }

    #[inline(always)]
    pub fn any_true(&self) -> bool {
        self.bits != 0
    }

    #[inline(always)]
    pub fn all_true(&self) -> bool {
        self.bits == Self::LANES
    }

    #[inline(always)]
    pub fn and(&self, other: &Self) -> Self {
        Self::from_bits(self.bits & other.bits)
    }

    #[inline(always)]
    pub fn or(&self, other: &Self) -> Self {
        Self::from_bits(self.bits | other.bits)
    }

    #[inline(always)]
    pub fn xor(&self, other: &Self) -> Self {
        Self::from_bits(self.bits ^ other.bits)
    }

    /// Lanes set here and clear in `other`.
    #[inline(always)]
    pub fn and_not(&self, other: &Self) -> Self {
        Self::from_bits(self.bits & !other.bits)
    }

    /// Lanewise complement, i.e. `xor` against the all-true mask.
    #[inline(always)]
    pub fn not(&self) -> Self {
        self.xor(&Self::all(true))
    }

    /// Lanes where both masks agree; `==` compares whole masks.
    #[inline(always)]
    pub fn compare_eq(&self, other: &Self) -> Self {
        self.xor(other).not()
    }

    /// Moves the set lanes to the low end: the first `true_count` lanes are set.
    #[inline(always)]
    pub fn compress(&self) -> Self {
        Self::from_bits(low_bits(self.true_count()))
    }

    /// Views the mask under another species with the same lane count.
    ///
    /// Lane counts are compared at run time; masks of different lane counts
    /// have to go through [`Mask::to_array`] and the target species' mask
    /// factory instead.
    pub fn cast<U: Element, const M: usize>(&self) -> Result<Mask<U, M>> {
        if M != N {
            return Err(length_mismatch(
                N,
                M,
                format!("cannot cast a {}-lane mask to {} lanes", N, M),
            ));
        }
        Ok(Mask::from_bits(self.bits))
    }

    /// Set lanes become all ones, clear lanes zero.
    pub fn to_bits_vector(&self) -> Vector<T::Integral, N> {
        Vector::from_array(std::array::from_fn(|i| {
            if self.test_lane(i) {
                T::Integral::from_raw_bits(u64::MAX)
            } else {
                T::Integral::ZERO
            }
        }))
    }

    /// Set lanes hold the all-ones bit pattern of `T`, clear lanes zero.
    pub fn to_vector(&self) -> Vector<T, N> {
        Vector::from_array(std::array::from_fn(|i| {
            if self.test_lane(i) {
                T::from_raw_bits(u64::MAX)
            } else {
                T::ZERO
            }
        }))
    }
}

impl<T: Element, const N: usize> BitAnd for Mask<T, N> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(&rhs)
    }
}

impl<T: Element, const N: usize> BitOr for Mask<T, N> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(&rhs)
    }
}

impl<T: Element, const N: usize> BitXor for Mask<T, N> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        self.xor(&rhs)
    }
}

impl<T: Element, const N: usize> Not for Mask<T, N> {
    type Output = Self;

    fn not(self) -> Self {
        Mask::not(&self)
    }
}

impl<T: Element, const N: usize> fmt::Display for Mask<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mask[")?;
        for i in 0..N {
            f.write_str(if self.test_lane(i) { "T" } else { "." })?;
        }
        f.write_str("]")
    }
}

impl<T: Element, const N: usize> fmt::Debug for Mask<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
