//! Lane element types.
//!
//! [`Element`] is the seam between the vector engine and per-lane scalar
//! arithmetic. The engine never evaluates a lane itself; it calls
//! [`Element::unary`], [`Element::binary`] and friends, which dispatch to the
//! generic evaluators in [`evaluator`](super::evaluator). Integral kinds use
//! two's-complement wraparound, floating kinds IEEE-754 semantics.

use std::fmt;
use std::hash::Hash;

use half::f16;
use num::traits::{WrappingAdd, WrappingMul, WrappingNeg, WrappingShl, WrappingShr, WrappingSub};
use num::{Float, PrimInt};

use crate::simd::evaluator;
use crate::simd::{Associative, Binary, Comparison, Ternary, Test, Unary};

/// The fixed enumeration of lane element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
}

impl ElementKind {
    /// Every element kind.
    pub const ALL: [ElementKind; 7] = [
        ElementKind::I8,
        ElementKind::I16,
        ElementKind::I32,
        ElementKind::I64,
        ElementKind::F16,
        ElementKind::F32,
        ElementKind::F64,
    ];

    #[inline(always)]
    pub const fn bit_size(self) -> usize {
        match self {
            ElementKind::I8 => 8,
            ElementKind::I16 | ElementKind::F16 => 16,
            ElementKind::I32 | ElementKind::F32 => 32,
            ElementKind::I64 | ElementKind::F64 => 64,
        }
    }

    #[inline(always)]
    pub const fn byte_size(self) -> usize {
        self.bit_size() / 8
    }

    #[inline(always)]
    pub const fn is_floating(self) -> bool {
        matches!(self, ElementKind::F16 | ElementKind::F32 | ElementKind::F64)
    }

    #[inline(always)]
    pub const fn is_integral(self) -> bool {
        !self.is_floating()
    }

    /// The integral kind of the same width.
    pub const fn integral(self) -> ElementKind {
        match self {
            ElementKind::F16 => ElementKind::I16,
            ElementKind::F32 => ElementKind::I32,
            ElementKind::F64 => ElementKind::I64,
            kind => kind,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::I8 => "i8",
            ElementKind::I16 => "i16",
            ElementKind::I32 => "i32",
            ElementKind::I64 => "i64",
            ElementKind::F16 => "f16",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lane value widened to a kind-neutral carrier, used by value conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

mod sealed {
    pub trait Sealed {}
}

/// A primitive type that can occupy a vector lane.
///
/// This trait is sealed: the element kinds are a closed set.
pub trait Element:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
{
    const KIND: ElementKind;
    /// Lane width in bits.
    const BITS: usize;
    /// The value whose bits are all zero.
    const ZERO: Self;

    /// The integral element of the same width, used for bit views and shuffle vectors.
    type Integral: IntegralElement;

    /// Raw lane bits, zero-extended.
    fn to_raw_bits(self) -> u64;
    /// Builds a lane from the low `BITS` bits of `bits`.
    fn from_raw_bits(bits: u64) -> Self;
    fn to_integral_bits(self) -> Self::Integral;
    fn from_integral_bits(bits: Self::Integral) -> Self;

    /// The lane value representing index `index` (iota, shuffle vectors).
    fn from_index(index: i64) -> Self;
    /// The index a lane value denotes when used as a selector.
    fn to_index(self) -> i64;

    fn to_scalar(self) -> Scalar;
    /// Numeric conversion from the kind-neutral carrier.
    fn from_scalar(value: Scalar) -> Self;

    fn unary(op: Unary, a: Self) -> Self;
    fn binary(op: Binary, a: Self, b: Self) -> Self;
    fn ternary(op: Ternary, a: Self, b: Self, c: Self) -> Self;
    fn compare(op: Comparison, a: Self, b: Self) -> bool;
    fn test(op: Test, a: Self) -> bool;
    /// The value that leaves any lane unchanged under `op`.
    fn identity(op: Associative) -> Self;
}

/// Signed two's-complement lane types.
pub trait IntegralElement:
    Element<Integral = Self>
    + PrimInt
    + WrappingAdd
    + WrappingSub
    + WrappingMul
    + WrappingNeg
    + WrappingShl
    + WrappingShr
    + Eq
    + Ord
    + Hash
{
}

/// IEEE-754 lane types.
pub trait FloatElement: Element + Float {}

macro_rules! integral_element {
    ($t:ty, $kind:ident, $unsigned:ty) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const BITS: usize = <$t>::BITS as usize;
            const ZERO: Self = 0;

            type Integral = $t;

            #[inline(always)]
            fn to_raw_bits(self) -> u64 {
                self as $unsigned as u64
            }

            #[inline(always)]
            fn from_raw_bits(bits: u64) -> Self {
                bits as $unsigned as $t
            }

            #[inline(always)]
            fn to_integral_bits(self) -> Self {
                self
            }

            #[inline(always)]
            fn from_integral_bits(bits: Self) -> Self {
                bits
            }

            #[inline(always)]
            fn from_index(index: i64) -> Self {
                index as $t
            }

            #[inline(always)]
            fn to_index(self) -> i64 {
                self as i64
            }

            #[inline(always)]
            fn to_scalar(self) -> Scalar {
                Scalar::Int(self as i64)
            }

            #[inline(always)]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Int(v) => v as $t,
                    // float -> i64 saturates directly, narrower kinds go
                    // through a saturating i32 and then truncate
                    Scalar::Float(v) if Self::BITS == 64 => v as i64 as $t,
                    Scalar::Float(v) => v as i32 as $t,
                }
            }

            #[inline(always)]
            fn unary(op: Unary, a: Self) -> Self {
                evaluator::integral_unary(op, a)
            }

            #[inline(always)]
            fn binary(op: Binary, a: Self, b: Self) -> Self {
                evaluator::integral_binary(op, a, b)
            }

            #[inline(always)]
            fn ternary(op: Ternary, a: Self, b: Self, c: Self) -> Self {
                evaluator::integral_ternary(op, a, b, c)
            }

            #[inline(always)]
            fn compare(op: Comparison, a: Self, b: Self) -> bool {
                evaluator::integral_compare(op, a, b)
            }

            #[inline(always)]
            fn test(op: Test, a: Self) -> bool {
                evaluator::integral_test(op, a)
            }

            #[inline(always)]
            fn identity(op: Associative) -> Self {
                evaluator::integral_identity(op)
            }
        }

        impl IntegralElement for $t {}
    };
}

macro_rules! float_element {
    (
        $t:ty, $kind:ident, $bits:ty, $ubits:ty, $zero:expr,
        to_f64 = $to_f64:expr, from_f64 = $from_f64:expr, from_i64 = $from_i64:expr
    ) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const KIND: ElementKind = ElementKind::$kind;
            const BITS: usize = std::mem::size_of::<$t>() * 8;
            const ZERO: Self = $zero;

            type Integral = $bits;

            #[inline(always)]
            fn to_raw_bits(self) -> u64 {
                self.to_bits() as u64
            }

            #[inline(always)]
            fn from_raw_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as $ubits)
            }

            #[inline(always)]
            fn to_integral_bits(self) -> $bits {
                self.to_bits() as $bits
            }

            #[inline(always)]
            fn from_integral_bits(bits: $bits) -> Self {
                <$t>::from_bits(bits as $ubits)
            }

            #[inline(always)]
            fn from_index(index: i64) -> Self {
                ($from_i64)(index)
            }

            #[inline(always)]
            fn to_index(self) -> i64 {
                ($to_f64)(self) as i64
            }

            #[inline(always)]
            fn to_scalar(self) -> Scalar {
                Scalar::Float(($to_f64)(self))
            }

            #[inline(always)]
            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Int(v) => ($from_i64)(v),
                    Scalar::Float(v) => ($from_f64)(v),
                }
            }

            #[inline(always)]
            fn unary(op: Unary, a: Self) -> Self {
                evaluator::float_unary(op, a)
            }

            #[inline(always)]
            fn binary(op: Binary, a: Self, b: Self) -> Self {
                evaluator::float_binary(op, a, b)
            }

            #[inline(always)]
            fn ternary(op: Ternary, a: Self, b: Self, c: Self) -> Self {
                evaluator::float_ternary(op, a, b, c)
            }

            #[inline(always)]
            fn compare(op: Comparison, a: Self, b: Self) -> bool {
                evaluator::float_compare(op, a, b)
            }

            #[inline(always)]
            fn test(op: Test, a: Self) -> bool {
                evaluator::float_test(op, a)
            }

            #[inline(always)]
            fn identity(op: Associative) -> Self {
                evaluator::float_identity(op)
            }
        }

        impl FloatElement for $t {}
    };
}

integral_element!(i8, I8, u8);
integral_element!(i16, I16, u16);
integral_element!(i32, I32, u32);
integral_element!(i64, I64, u64);

float_element!(
    f16, F16, i16, u16, f16::ZERO,
    to_f64 = |x: f16| x.to_f64(),
    from_f64 = f16::from_f64,
    from_i64 = |v: i64| f16::from_f64(v as f64)
);
float_element!(
    f32, F32, i32, u32, 0.0,
    to_f64 = |x: f32| x as f64,
    from_f64 = |x: f64| x as f32,
    from_i64 = |v: i64| v as f32
);
float_element!(
    f64, F64, i64, u64, 0.0,
    to_f64 = |x: f64| x,
    from_f64 = |x: f64| x,
    from_i64 = |v: i64| v as f64
);
