//! The lanewise vector engine.
//!
//! Every elementwise operator funnels through one of three shape-preserving
//! templates (`u_op`, `b_op`, `t_op`) and their masked forms. A masked form
//! passes the first operand through unchanged in every mask-false lane; the
//! reductions are the one place where mask-false lanes instead contribute the
//! operator's identity.

use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};

use crate::error::{arithmetic_error, check_index, index_out_of_bounds, invalid_part, Result};
use crate::simd::shuffle::{partially_wrap_long, wrap_index};
use crate::simd::{
    Associative, Binary, Comparison, Element, FloatElement, IntegralElement, Mask, Shuffle,
    Species, Ternary, Test, Unary,
};

/// `N` lanes of `T`, one species of the vector family.
#[derive(Clone, Copy, PartialEq)]
pub struct Vector<T: Element, const N: usize> {
    lanes: [T; N],
}

impl<T: Element, const N: usize> Vector<T, N> {
    #[inline(always)]
    pub fn from_array(lanes: [T; N]) -> Self {
        let () = Species::<T, N>::VALID;
        Self { lanes }
    }

    #[inline(always)]
    pub fn to_array(&self) -> [T; N] {
        self.lanes
    }

    #[inline(always)]
    pub fn as_array(&self) -> &[T; N] {
        &self.lanes
    }

    #[inline(always)]
    pub fn species(&self) -> Species<T, N> {
        Species::new()
    }

    #[inline(always)]
    pub const fn length(&self) -> usize {
        N
    }

    /// Bounds-checked lane read.
    pub fn lane(&self, i: usize) -> Result<T> {
        check_index(i, N).map(|i| self.lanes[i])
    }

    /// A copy of this vector with lane `i` replaced by `e`.
    pub fn with_lane(&self, i: usize, e: T) -> Result<Self> {
        let i = check_index(i, N)?;
        let mut lanes = self.lanes;
        lanes[i] = e;
        Ok(Self::from_array(lanes))
    }

    /// Adds `i * scale` to lane `i`.
    pub fn add_index(&self, scale: i64) -> Self {
        self.u_op(|i, a| T::binary(Binary::Add, a, T::from_index((i as i64).wrapping_mul(scale))))
    }

    // Templates.

    #[inline(always)]
    pub(crate) fn u_op(&self, f: impl Fn(usize, T) -> T) -> Self {
        Self::from_array(std::array::from_fn(|i| f(i, self.lanes[i])))
    }

    #[inline(always)]
    pub(crate) fn u_op_masked(&self, m: &Mask<T, N>, f: impl Fn(usize, T) -> T) -> Self {
        self.u_op(|i, a| if m.test_lane(i) { f(i, a) } else { a })
    }

    #[inline(always)]
    pub(crate) fn b_op(&self, b: &Self, f: impl Fn(usize, T, T) -> T) -> Self {
        self.u_op(|i, a| f(i, a, b.lanes[i]))
    }

    #[inline(always)]
    pub(crate) fn b_op_masked(&self, b: &Self, m: &Mask<T, N>, f: impl Fn(usize, T, T) -> T) -> Self {
        self.u_op_masked(m, |i, a| f(i, a, b.lanes[i]))
    }

    #[inline(always)]
    pub(crate) fn t_op(&self, b: &Self, c: &Self, f: impl Fn(usize, T, T, T) -> T) -> Self {
        self.u_op(|i, a| f(i, a, b.lanes[i], c.lanes[i]))
    }

    #[inline(always)]
    pub(crate) fn t_op_masked(
        &self,
        b: &Self,
        c: &Self,
        m: &Mask<T, N>,
        f: impl Fn(usize, T, T, T) -> T,
    ) -> Self {
        self.u_op_masked(m, |i, a| f(i, a, b.lanes[i], c.lanes[i]))
    }

    // Lanewise operators.

    pub fn lanewise_unary(&self, op: Unary) -> Result<Self> {
        op.check(T::KIND)?;
        Ok(self.u_op(|_, a| T::unary(op, a)))
    }

    pub fn lanewise_unary_masked(&self, op: Unary, m: &Mask<T, N>) -> Result<Self> {
        op.check(T::KIND)?;
        Ok(self.u_op_masked(m, |_, a| T::unary(op, a)))
    }

    /// Applies `op` lane by lane against `b`.
    ///
    /// Integral division fails with `ArithmeticError` if any divisor lane is
    /// zero; no lane is computed in that case.
    pub fn lanewise(&self, op: Binary, b: &Self) -> Result<Self> {
        op.check(T::KIND)?;
        check_divisors(op, b, &Mask::all(true))?;
        Ok(self.b_op(b, |_, x, y| T::binary(op, x, y)))
    }

    /// Like [`Vector::lanewise`] but only mask-true lanes are computed (and,
    /// for division, only their divisors are checked).
    pub fn lanewise_masked(&self, op: Binary, b: &Self, m: &Mask<T, N>) -> Result<Self> {
        op.check(T::KIND)?;
        check_divisors(op, b, m)?;
        Ok(self.b_op_masked(b, m, |_, x, y| T::binary(op, x, y)))
    }

    /// `op` against `e` broadcast to every lane.
    pub fn lanewise_scalar(&self, op: Binary, e: T) -> Result<Self> {
        self.lanewise(op, &Self::from_array([e; N]))
    }

    /// [`Vector::lanewise_scalar`] in mask-true lanes.
    pub fn lanewise_scalar_masked(&self, op: Binary, e: T, m: &Mask<T, N>) -> Result<Self> {
        self.lanewise_masked(op, &Self::from_array([e; N]), m)
    }

    pub fn lanewise_ternary(&self, op: Ternary, b: &Self, c: &Self) -> Result<Self> {
        op.check(T::KIND)?;
        Ok(self.t_op(b, c, |_, x, y, z| T::ternary(op, x, y, z)))
    }

    pub fn lanewise_ternary_masked(
        &self,
        op: Ternary,
        b: &Self,
        c: &Self,
        m: &Mask<T, N>,
    ) -> Result<Self> {
        op.check(T::KIND)?;
        Ok(self.t_op_masked(b, c, m, |_, x, y, z| T::ternary(op, x, y, z)))
    }

    // Operators defined for every kind, so they cannot fail.

    #[inline(always)]
    pub fn add(self, b: Self) -> Self {
        self.b_op(&b, |_, x, y| T::binary(Binary::Add, x, y))
    }

    #[inline(always)]
    pub fn sub(self, b: Self) -> Self {
        self.b_op(&b, |_, x, y| T::binary(Binary::Sub, x, y))
    }

    #[inline(always)]
    pub fn mul(self, b: Self) -> Self {
        self.b_op(&b, |_, x, y| T::binary(Binary::Mul, x, y))
    }

    #[inline(always)]
    pub fn min(self, b: Self) -> Self {
        self.b_op(&b, |_, x, y| T::binary(Binary::Min, x, y))
    }

    #[inline(always)]
    pub fn max(self, b: Self) -> Self {
        self.b_op(&b, |_, x, y| T::binary(Binary::Max, x, y))
    }

    #[inline(always)]
    pub fn neg(self) -> Self {
        self.u_op(|_, a| T::unary(Unary::Neg, a))
    }

    #[inline(always)]
    pub fn abs(self) -> Self {
        self.u_op(|_, a| T::unary(Unary::Abs, a))
    }

    // Comparisons and predicates.

    pub fn compare(&self, op: Comparison, b: &Self) -> Result<Mask<T, N>> {
        op.check(T::KIND)?;
        Ok(Mask::from_fn(|i| T::compare(op, self.lanes[i], b.lanes[i])))
    }

    /// [`Vector::compare`] restricted to the lanes set in `m`.
    pub fn compare_masked(&self, op: Comparison, b: &Self, m: &Mask<T, N>) -> Result<Mask<T, N>> {
        Ok(self.compare(op, b)?.and(m))
    }

    /// Compares every lane against `e`.
    pub fn compare_scalar(&self, op: Comparison, e: T) -> Result<Mask<T, N>> {
        self.compare(op, &Self::from_array([e; N]))
    }

    /// Lanewise `==`; `PartialEq` compares whole vectors instead.
    #[inline(always)]
    pub fn compare_eq(&self, b: &Self) -> Mask<T, N> {
        Mask::from_fn(|i| T::compare(Comparison::Eq, self.lanes[i], b.lanes[i]))
    }

    #[inline(always)]
    pub fn compare_lt(&self, b: &Self) -> Mask<T, N> {
        Mask::from_fn(|i| T::compare(Comparison::Lt, self.lanes[i], b.lanes[i]))
    }

    pub fn test(&self, op: Test) -> Result<Mask<T, N>> {
        op.check(T::KIND)?;
        Ok(Mask::from_fn(|i| T::test(op, self.lanes[i])))
    }

    pub fn test_masked(&self, op: Test, m: &Mask<T, N>) -> Result<Mask<T, N>> {
        Ok(self.test(op)?.and(m))
    }

    /// Lane `i` is `v[i]` where `m` is set, otherwise `self[i]`.
    #[inline(always)]
    pub fn blend(&self, v: &Self, m: &Mask<T, N>) -> Self {
        self.b_op_masked(v, m, |_, _, y| y)
    }

    // Reductions.

    /// Folds every lane with `op`.
    ///
    /// Floating-point lanes are combined pairwise (lane `i` with lane
    /// `i + N/2`, then recursively), so the result need not equal a strict
    /// left-to-right fold.
    pub fn reduce_lanes(&self, op: Associative) -> Result<T> {
        op.check(T::KIND)?;
        Ok(fold_lanes(self.lanes, op))
    }

    /// Folds the mask-true lanes with `op`; mask-false lanes contribute the
    /// identity of `op`, so an empty mask yields the identity.
    pub fn reduce_lanes_masked(&self, op: Associative, m: &Mask<T, N>) -> Result<T> {
        op.check(T::KIND)?;
        let identity = T::identity(op);
        let lanes: [T; N] = std::array::from_fn(|i| {
            if m.test_lane(i) {
                self.lanes[i]
            } else {
                identity
            }
        });
        Ok(fold_lanes(lanes, op))
    }

    // Slicing.

    /// The `N`-lane window starting at `origin` of `self` followed by `v`.
    pub fn slice(&self, origin: usize, v: &Self) -> Result<Self> {
        check_origin::<N>(origin)?;
        Ok(self.u_op(|i, _| {
            let k = i + origin;
            if k < N {
                self.lanes[k]
            } else {
                v.lanes[k - N]
            }
        }))
    }

    /// [`Vector::slice`] against a zero vector.
    pub fn slice_zeroed(&self, origin: usize) -> Result<Self> {
        self.slice(origin, &Self::from_array([T::ZERO; N]))
    }

    /// [`Vector::slice`] with mask-false lanes zeroed.
    pub fn slice_masked(&self, origin: usize, w: &Self, m: &Mask<T, N>) -> Result<Self> {
        let slice = self.slice(origin, w)?;
        Ok(Self::from_array([T::ZERO; N]).blend(&slice, m))
    }

    /// Inverse of [`Vector::slice`]: places `self` at `origin` in the
    /// two-vector buffer `w ++ w` and returns half `part` of it.
    ///
    /// Part 0 keeps `w` below `origin` and holds `self[i - origin]` from
    /// `origin` on. Part 1 holds the lanes of `self` that spilled past the
    /// end, followed by `w`.
    pub fn unslice(&self, origin: usize, w: &Self, part: usize) -> Result<Self> {
        check_origin::<N>(origin)?;
        match part {
            0 => Ok(w.u_op(|i, x| if i < origin { x } else { self.lanes[i - origin] })),
            1 => Ok(w.u_op(|i, x| if i < origin { self.lanes[i + N - origin] } else { x })),
            _ => Err(invalid_part(part as isize, "unslice part must be 0 or 1")),
        }
    }

    /// [`Vector::unslice`] into a zero buffer, part 0.
    pub fn unslice_zeroed(&self, origin: usize) -> Result<Self> {
        self.unslice(origin, &Self::from_array([T::ZERO; N]), 0)
    }

    /// [`Vector::unslice`] that only moves the mask-true lanes of `self`;
    /// every other position keeps the value of `w`.
    pub fn unslice_masked(&self, origin: usize, w: &Self, part: usize, m: &Mask<T, N>) -> Result<Self> {
        let slice = w.slice(origin, w)?;
        slice.blend(self, m).unslice(origin, w, part)
    }

    // Compress and expand.

    /// Packs the mask-true lanes into the low lanes, zeroing the rest.
    pub fn compress(&self, m: &Mask<T, N>) -> Self {
        let mut lanes = [T::ZERO; N];
        let mut k = 0;
        for i in 0..N {
            if m.test_lane(i) {
                lanes[k] = self.lanes[i];
                k += 1;
            }
        }
        Self::from_array(lanes)
    }

    /// Spreads the low lanes over the mask-true positions, zeroing the rest.
    pub fn expand(&self, m: &Mask<T, N>) -> Self {
        let mut lanes = [T::ZERO; N];
        let mut k = 0;
        for (i, lane) in lanes.iter_mut().enumerate() {
            if m.test_lane(i) {
                *lane = self.lanes[k];
                k += 1;
            }
        }
        Self::from_array(lanes)
    }

    // Permutation.

    /// Lane `i` is `self[s[i]]`; an exceptional index is wrapped first.
    pub fn rearrange(&self, s: &Shuffle<T, N>) -> Self {
        self.u_op(|i, _| self.lanes[wrap_index(s.index(i), N)])
    }

    /// [`Vector::rearrange`] in mask-true lanes; mask-false lanes keep `self[i]`.
    pub fn rearrange_masked(&self, s: &Shuffle<T, N>, m: &Mask<T, N>) -> Self {
        self.u_op_masked(m, |i, _| self.lanes[wrap_index(s.index(i), N)])
    }

    /// Two-source rearrange: index `k >= 0` selects `self[k]`, an
    /// exceptional `k` selects `v[k + N]`.
    pub fn rearrange_with(&self, s: &Shuffle<T, N>, v: &Self) -> Self {
        self.u_op(|i, _| {
            let k = s.index(i);
            if k >= 0 {
                self.lanes[k as usize]
            } else {
                v.lanes[(k + N as i32) as usize]
            }
        })
    }

    /// Uses the lanes of `self` as indexes into `v`.
    pub fn select_from(&self, v: &Self) -> Self {
        v.rearrange(&self.to_shuffle())
    }

    /// [`Vector::select_from`] in mask-true lanes; mask-false lanes are zero.
    pub fn select_from_masked(&self, v: &Self, m: &Mask<T, N>) -> Self {
        Self::from_array(std::array::from_fn(|i| {
            if m.test_lane(i) {
                v.lanes[wrap_index(partially_wrap_long(self.lanes[i].to_index(), N), N)]
            } else {
                T::ZERO
            }
        }))
    }

    /// Uses the lanes of `self` as indexes into the concatenation `v1 ++ v2`.
    ///
    /// Each index is reduced modulo `2 * N` first, so it always lands in one
    /// of the two sources.
    pub fn select_from_pair(&self, v1: &Self, v2: &Self) -> Self {
        self.u_op(|_, e| {
            let k = e.to_index().rem_euclid(2 * N as i64) as usize;
            if k < N {
                v1.lanes[k]
            } else {
                v2.lanes[k - N]
            }
        })
    }

    /// Reads every lane as a source index, partially wrapped.
    pub fn to_shuffle(&self) -> Shuffle<T, N> {
        Shuffle::from_wrapped(self.lanes.map(|e| partially_wrap_long(e.to_index(), N)))
    }
}

impl<T: FloatElement, const N: usize> Vector<T, N> {
    /// `self * b + c` with a single rounding.
    #[inline(always)]
    pub fn fma(self, b: Self, c: Self) -> Self {
        self.t_op(&b, &c, |_, x, y, z| T::ternary(Ternary::Fma, x, y, z))
    }

    #[inline(always)]
    pub fn sqrt(self) -> Self {
        self.u_op(|_, a| T::unary(Unary::Sqrt, a))
    }
}

#[inline(always)]
fn check_origin<const N: usize>(origin: usize) -> Result<()> {
    if origin > N {
        return Err(index_out_of_bounds(origin, N + 1));
    }
    Ok(())
}

fn check_divisors<T: Element, const N: usize>(op: Binary, b: &Vector<T, N>, m: &Mask<T, N>) -> Result<()> {
    if op != Binary::Div || !T::KIND.is_integral() {
        return Ok(());
    }
    match (0..N).find(|&i| m.test_lane(i) && b.lanes[i] == T::ZERO) {
        Some(lane) => Err(arithmetic_error(format!("division by zero in lane {}", lane))),
        None => Ok(()),
    }
}

fn fold_lanes<T: Element, const N: usize>(mut lanes: [T; N], op: Associative) -> T {
    let binary = op.as_binary();
    if op == Associative::FirstNonzero {
        // order-sensitive
        return lanes
            .into_iter()
            .reduce(|a, b| T::binary(binary, a, b))
            .unwrap_or_else(|| T::identity(op));
    }
    let mut width = N;
    while width > 1 {
        width /= 2;
        for i in 0..width {
            lanes[i] = T::binary(binary, lanes[i], lanes[i + width]);
        }
    }
    lanes[0]
}

impl<T: Element, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::from_array([T::ZERO; N])
    }
}

impl<T: Element, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(lanes: [T; N]) -> Self {
        Self::from_array(lanes)
    }
}

impl<T: Element, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vector::add(self, rhs)
    }
}

impl<T: Element, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vector::sub(self, rhs)
    }
}

impl<T: Element, const N: usize> Mul for Vector<T, N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Vector::mul(self, rhs)
    }
}

impl<T: Element, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Vector::neg(self)
    }
}

impl<T: FloatElement, const N: usize> Div for Vector<T, N> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.b_op(&rhs, |_, x, y| <T as Element>::binary(Binary::Div, x, y))
    }
}

impl<T: IntegralElement, const N: usize> BitAnd for Vector<T, N> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.b_op(&rhs, |_, x, y| x & y)
    }
}

impl<T: IntegralElement, const N: usize> BitOr for Vector<T, N> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.b_op(&rhs, |_, x, y| x | y)
    }
}

impl<T: IntegralElement, const N: usize> BitXor for Vector<T, N> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        self.b_op(&rhs, |_, x, y| x ^ y)
    }
}

impl<T: IntegralElement, const N: usize> Not for Vector<T, N> {
    type Output = Self;

    fn not(self) -> Self {
        self.u_op(|_, a| !a)
    }
}

impl<T: Element, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, lane) in self.lanes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", lane)?;
        }
        f.write_str("]")
    }
}

impl<T: Element, const N: usize> fmt::Debug for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}, {}>{}", T::KIND, N, self)
    }
}
