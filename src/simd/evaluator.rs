//! Per-lane scalar evaluation.
//!
//! These are the pure functions the vector engine delegates lane arithmetic
//! to. Callers validate operator support before invoking them, so an
//! operator outside a function's domain is never passed in; such arms return
//! the first operand unchanged.

use num::NumCast;

use crate::simd::{
    Associative, Binary, Comparison, FloatElement, IntegralElement, Ternary, Test, Unary,
};

#[inline(always)]
fn count<T: IntegralElement>(n: u32) -> T {
    <T as NumCast>::from(n).unwrap_or_else(T::zero)
}

#[inline(always)]
fn shift_count<T: IntegralElement>(b: T) -> u32 {
    (b.to_raw_bits() as u32) & (T::BITS as u32 - 1)
}

#[inline(always)]
fn all_ones<T: IntegralElement>() -> T {
    !T::zero()
}

pub(crate) fn integral_unary<T: IntegralElement>(op: Unary, a: T) -> T {
    match op {
        Unary::Neg => a.wrapping_neg(),
        Unary::Abs => {
            if a < T::zero() {
                a.wrapping_neg()
            } else {
                a
            }
        }
        Unary::Not => !a,
        Unary::Zomo => {
            if a == T::zero() {
                T::zero()
            } else {
                all_ones()
            }
        }
        Unary::BitCount => count(a.count_ones()),
        Unary::TrailingZerosCount => count(a.trailing_zeros()),
        Unary::LeadingZerosCount => count(a.leading_zeros()),
        Unary::Reverse => a.reverse_bits(),
        Unary::ReverseBytes => a.swap_bytes(),
        _ => a,
    }
}

pub(crate) fn integral_binary<T: IntegralElement>(op: Binary, a: T, b: T) -> T {
    match op {
        Binary::Add => a.wrapping_add(&b),
        Binary::Sub => a.wrapping_sub(&b),
        Binary::Mul => a.wrapping_mul(&b),
        Binary::Div => {
            if b == T::zero() {
                // rejected by the vector layer before evaluation
                T::zero()
            } else if b == all_ones() && a == T::min_value() {
                a
            } else {
                a / b
            }
        }
        Binary::Min => a.min(b),
        Binary::Max => a.max(b),
        Binary::FirstNonzero => {
            if a != T::zero() {
                a
            } else {
                b
            }
        }
        Binary::And => a & b,
        Binary::AndNot => a & !b,
        Binary::Or => a | b,
        Binary::Xor => a ^ b,
        Binary::Lshl => a.wrapping_shl(shift_count(b)),
        Binary::Ashr => a.wrapping_shr(shift_count(b)),
        Binary::Lshr => a.unsigned_shr(shift_count(b)),
        Binary::Rol => a.rotate_left(shift_count(b)),
        Binary::Ror => a.rotate_right(shift_count(b)),
        _ => a,
    }
}

pub(crate) fn integral_ternary<T: IntegralElement>(op: Ternary, a: T, b: T, c: T) -> T {
    match op {
        Ternary::BitwiseBlend => (a & !c) | (b & c),
        Ternary::Fma => a,
    }
}

pub(crate) fn integral_compare<T: IntegralElement>(op: Comparison, a: T, b: T) -> bool {
    match op {
        Comparison::Eq => a == b,
        Comparison::Ne => a != b,
        Comparison::Lt => a < b,
        Comparison::Le => a <= b,
        Comparison::Gt => a > b,
        Comparison::Ge => a >= b,
        Comparison::UnsignedLt => a.to_raw_bits() < b.to_raw_bits(),
        Comparison::UnsignedLe => a.to_raw_bits() <= b.to_raw_bits(),
        Comparison::UnsignedGt => a.to_raw_bits() > b.to_raw_bits(),
        Comparison::UnsignedGe => a.to_raw_bits() >= b.to_raw_bits(),
    }
}

pub(crate) fn integral_test<T: IntegralElement>(op: Test, a: T) -> bool {
    match op {
        Test::IsDefault => a == T::zero(),
        Test::IsNegative => a < T::zero(),
        Test::IsFinite | Test::IsNan | Test::IsInfinite => false,
    }
}

pub(crate) fn integral_identity<T: IntegralElement>(op: Associative) -> T {
    match op {
        Associative::Add | Associative::Or | Associative::Xor | Associative::FirstNonzero => {
            T::zero()
        }
        Associative::Mul => T::one(),
        Associative::Min => T::max_value(),
        Associative::Max => T::min_value(),
        Associative::And => all_ones(),
    }
}

/// `min` that propagates NaN and orders `-0.0` below `+0.0`.
#[inline(always)]
fn float_min<T: FloatElement>(a: T, b: T) -> T {
    if a.is_nan() || b.is_nan() {
        T::nan()
    } else if a == b {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else if a < b {
        a
    } else {
        b
    }
}

/// `max` that propagates NaN and orders `+0.0` above `-0.0`.
#[inline(always)]
fn float_max<T: FloatElement>(a: T, b: T) -> T {
    if a.is_nan() || b.is_nan() {
        T::nan()
    } else if a == b {
        if a.is_sign_negative() {
            b
        } else {
            a
        }
    } else if a > b {
        a
    } else {
        b
    }
}

pub(crate) fn float_unary<T: FloatElement>(op: Unary, a: T) -> T {
    match op {
        Unary::Neg => -a,
        Unary::Abs => a.abs(),
        Unary::Sqrt => a.sqrt(),
        Unary::Sin => a.sin(),
        Unary::Cos => a.cos(),
        Unary::Tan => a.tan(),
        Unary::Asin => a.asin(),
        Unary::Acos => a.acos(),
        Unary::Atan => a.atan(),
        Unary::Exp => a.exp(),
        Unary::Log => a.ln(),
        Unary::Log10 => a.log10(),
        Unary::Cbrt => a.cbrt(),
        Unary::Sinh => a.sinh(),
        Unary::Cosh => a.cosh(),
        Unary::Tanh => a.tanh(),
        Unary::Expm1 => a.exp_m1(),
        Unary::Log1p => a.ln_1p(),
        _ => a,
    }
}

pub(crate) fn float_binary<T: FloatElement>(op: Binary, a: T, b: T) -> T {
    match op {
        Binary::Add => a + b,
        Binary::Sub => a - b,
        Binary::Mul => a * b,
        Binary::Div => a / b,
        Binary::Min => float_min(a, b),
        Binary::Max => float_max(a, b),
        Binary::FirstNonzero => {
            if a.to_raw_bits() != 0 {
                a
            } else {
                b
            }
        }
        Binary::Atan2 => a.atan2(b),
        Binary::Pow => a.powf(b),
        Binary::Hypot => a.hypot(b),
        _ => a,
    }
}

pub(crate) fn float_ternary<T: FloatElement>(op: Ternary, a: T, b: T, c: T) -> T {
    match op {
        Ternary::Fma => a.mul_add(b, c),
        Ternary::BitwiseBlend => a,
    }
}

pub(crate) fn float_compare<T: FloatElement>(op: Comparison, a: T, b: T) -> bool {
    match op {
        Comparison::Eq => a == b,
        Comparison::Ne => a != b,
        Comparison::Lt => a < b,
        Comparison::Le => a <= b,
        Comparison::Gt => a > b,
        Comparison::Ge => a >= b,
        _ => false,
    }
}

pub(crate) fn float_test<T: FloatElement>(op: Test, a: T) -> bool {
    match op {
        Test::IsDefault => a.to_raw_bits() == 0,
        Test::IsNegative => a.is_sign_negative(),
        Test::IsFinite => a.is_finite(),
        Test::IsNan => a.is_nan(),
        Test::IsInfinite => a.is_infinite(),
    }
}

pub(crate) fn float_identity<T: FloatElement>(op: Associative) -> T {
    match op {
        Associative::Mul => T::one(),
        Associative::Min => T::infinity(),
        Associative::Max => T::neg_infinity(),
        _ => T::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    mod integral {
        use super::*;

        #[test]
        fn test_wraparound() {
            assert_eq!(integral_binary(Binary::Add, i8::MAX, 1i8), i8::MIN);
            assert_eq!(integral_binary(Binary::Mul, 0x4000i16, 4i16), 0);
            assert_eq!(integral_unary(Unary::Neg, i32::MIN), i32::MIN);
            assert_eq!(integral_unary(Unary::Abs, i64::MIN), i64::MIN);
            assert_eq!(integral_binary(Binary::Div, i32::MIN, -1), i32::MIN);
            assert_eq!(integral_binary(Binary::Div, -7i32, 2), -3);
        }

        #[test]
        fn test_shifts_mask_the_count() {
            assert_eq!(integral_binary(Binary::Lshl, 1i8, 9i8), 2);
            assert_eq!(integral_binary(Binary::Ashr, -16i16, 2i16), -4);
            assert_eq!(integral_binary(Binary::Lshr, -1i8, 4i8), 0x0F);
            assert_eq!(integral_binary(Binary::Rol, 0x81u8 as i8, 1i8), 0x03);
            assert_eq!(integral_binary(Binary::Ror, 1i32, 1i32), i32::MIN);
        }

        #[test]
        fn test_bit_counting() {
            assert_eq!(integral_unary(Unary::BitCount, -1i8), 8);
            assert_eq!(integral_unary(Unary::LeadingZerosCount, 1i16), 15);
            assert_eq!(integral_unary(Unary::TrailingZerosCount, 8i32), 3);
            assert_eq!(integral_unary(Unary::Zomo, 5i64), -1);
            assert_eq!(integral_unary(Unary::Zomo, 0i64), 0);
            assert_eq!(integral_unary(Unary::Reverse, 1i8), i8::MIN);
            assert_eq!(integral_unary(Unary::ReverseBytes, 0x0102i16), 0x0201);
        }

        #[test]
        fn test_unsigned_comparison() {
            assert!(integral_compare(Comparison::Lt, -1i32, 0));
            assert!(integral_compare(Comparison::UnsignedGt, -1i32, 0));
            assert!(integral_compare(Comparison::UnsignedLe, 3i8, 3));
        }

        #[test]
        fn test_identities() {
            assert_eq!(integral_identity::<i16>(Associative::And), -1);
            assert_eq!(integral_identity::<i16>(Associative::Min), i16::MAX);
            assert_eq!(integral_identity::<i16>(Associative::Max), i16::MIN);
            assert_eq!(integral_identity::<i16>(Associative::Mul), 1);
            assert_eq!(integral_identity::<i16>(Associative::Xor), 0);
        }

        #[test]
        fn test_bitwise_blend() {
            assert_eq!(
                integral_ternary(Ternary::BitwiseBlend, 0b1100i32, 0b1010, 0b0110),
                0b1010
            );
        }
    }

    mod floating {
        use super::*;

        #[test]
        fn test_min_max_propagate_nan() {
            assert!(float_binary(Binary::Min, f32::NAN, 1.0).is_nan());
            assert!(float_binary(Binary::Max, 1.0, f64::NAN).is_nan());
            assert!(float_binary(Binary::Min, 0.0f32, -0.0).is_sign_negative());
            assert!(float_binary(Binary::Max, -0.0f32, 0.0).is_sign_positive());
            assert_eq!(float_binary(Binary::Max, 2.0f64, 3.0), 3.0);
        }

        #[test]
        fn test_first_nonzero_uses_bits() {
            assert_eq!(float_binary(Binary::FirstNonzero, 0.0f32, 5.0), 5.0);
            assert!(float_binary(Binary::FirstNonzero, -0.0f32, 5.0).is_sign_negative());
        }

        #[test]
        fn test_half_precision_rounds_through_f32() {
            let a = f16::from_f32(1.5);
            let b = f16::from_f32(2.25);
            assert_eq!(float_binary(Binary::Add, a, b), f16::from_f32(3.75));
            assert_eq!(float_unary(Unary::Sqrt, f16::from_f32(4.0)), f16::from_f32(2.0));
        }

        #[test]
        fn test_fma_and_tests() {
            assert_eq!(float_ternary(Ternary::Fma, 2.0f64, 3.0, 1.0), 7.0);
            assert!(float_test(Test::IsNegative, -0.0f32));
            assert!(float_test(Test::IsDefault, 0.0f32));
            assert!(!float_test(Test::IsDefault, -0.0f32));
            assert!(float_test(Test::IsInfinite, f64::NEG_INFINITY));
            assert!(!float_test(Test::IsFinite, f32::NAN));
        }

        #[test]
        fn test_identities() {
            assert_eq!(float_identity::<f32>(Associative::Min), f32::INFINITY);
            assert_eq!(float_identity::<f64>(Associative::Max), f64::NEG_INFINITY);
            assert_eq!(float_identity::<f16>(Associative::Mul), f16::ONE);
            assert_eq!(float_identity::<f32>(Associative::Add), 0.0);
        }
    }
}
