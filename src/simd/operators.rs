//! Closed operator sets consumed by the lanewise protocol.
//!
//! Each operator knows which element kinds it is defined for. Applying an
//! operator outside that set is rejected with
//! [`VectorError::UnsupportedOperation`](crate::VectorError) before any lane
//! is evaluated.

use crate::error::{unsupported_operation, Result};
use crate::simd::ElementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    Any,
    Integral,
    Floating,
}

impl Domain {
    #[inline(always)]
    const fn admits(self, kind: ElementKind) -> bool {
        match self {
            Domain::Any => true,
            Domain::Integral => kind.is_integral(),
            Domain::Floating => kind.is_floating(),
        }
    }
}

macro_rules! operator_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => ($text:literal, $domain:ident),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Operator name, as used in error messages.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Returns `true` if the operator is defined for `kind`.
            pub const fn supports(self, kind: ElementKind) -> bool {
                self.domain().admits(kind)
            }

            /// Fails with `UnsupportedOperation` unless the operator is defined for `kind`.
            #[inline(always)]
            pub fn check(self, kind: ElementKind) -> Result<()> {
                if self.supports(kind) {
                    Ok(())
                } else {
                    Err(unsupported_operation(self.name(), kind))
                }
            }

            const fn domain(self) -> Domain {
                match self {
                    $($name::$variant => Domain::$domain,)+
                }
            }
        }
    };
}

operator_set! {
    /// One-operand lanewise operators.
    Unary {
        Neg => ("NEG", Any),
        Abs => ("ABS", Any),
        /// Bitwise complement.
        Not => ("NOT", Integral),
        /// Zero maps to zero, anything else to all ones.
        Zomo => ("ZOMO", Integral),
        BitCount => ("BIT_COUNT", Integral),
        TrailingZerosCount => ("TRAILING_ZEROS_COUNT", Integral),
        LeadingZerosCount => ("LEADING_ZEROS_COUNT", Integral),
        /// Reverses the bit order of each lane.
        Reverse => ("REVERSE", Integral),
        ReverseBytes => ("REVERSE_BYTES", Integral),
        Sqrt => ("SQRT", Floating),
        Sin => ("SIN", Floating),
        Cos => ("COS", Floating),
        Tan => ("TAN", Floating),
        Asin => ("ASIN", Floating),
        Acos => ("ACOS", Floating),
        Atan => ("ATAN", Floating),
        Exp => ("EXP", Floating),
        /// Natural logarithm.
        Log => ("LOG", Floating),
        Log10 => ("LOG10", Floating),
        Cbrt => ("CBRT", Floating),
        Sinh => ("SINH", Floating),
        Cosh => ("COSH", Floating),
        Tanh => ("TANH", Floating),
        Expm1 => ("EXPM1", Floating),
        Log1p => ("LOG1P", Floating),
    }
}

operator_set! {
    /// Two-operand lanewise operators.
    Binary {
        Add => ("ADD", Any),
        Sub => ("SUB", Any),
        Mul => ("MUL", Any),
        Div => ("DIV", Any),
        Min => ("MIN", Any),
        Max => ("MAX", Any),
        /// `a` if its bits are non-zero, else `b`.
        FirstNonzero => ("FIRST_NONZERO", Any),
        And => ("AND", Integral),
        /// `a & !b`.
        AndNot => ("AND_NOT", Integral),
        Or => ("OR", Integral),
        Xor => ("XOR", Integral),
        /// Shift left; the count is masked to the lane width.
        Lshl => ("LSHL", Integral),
        /// Arithmetic shift right.
        Ashr => ("ASHR", Integral),
        /// Logical shift right.
        Lshr => ("LSHR", Integral),
        Rol => ("ROL", Integral),
        Ror => ("ROR", Integral),
        Atan2 => ("ATAN2", Floating),
        Pow => ("POW", Floating),
        Hypot => ("HYPOT", Floating),
    }
}

operator_set! {
    /// Three-operand lanewise operators.
    Ternary {
        /// Fused multiply-add `a * b + c`.
        Fma => ("FMA", Floating),
        /// `(a & !c) | (b & c)`.
        BitwiseBlend => ("BITWISE_BLEND", Integral),
    }
}

operator_set! {
    /// Associative operators usable as lane reductions.
    Associative {
        Add => ("ADD", Any),
        Mul => ("MUL", Any),
        Min => ("MIN", Any),
        Max => ("MAX", Any),
        FirstNonzero => ("FIRST_NONZERO", Any),
        And => ("AND", Integral),
        Or => ("OR", Integral),
        Xor => ("XOR", Integral),
    }
}

operator_set! {
    /// Relational operators producing a mask.
    Comparison {
        Eq => ("EQ", Any),
        Ne => ("NE", Any),
        Lt => ("LT", Any),
        Le => ("LE", Any),
        Gt => ("GT", Any),
        Ge => ("GE", Any),
        UnsignedLt => ("UNSIGNED_LT", Integral),
        UnsignedLe => ("UNSIGNED_LE", Integral),
        UnsignedGt => ("UNSIGNED_GT", Integral),
        UnsignedGe => ("UNSIGNED_GE", Integral),
    }
}

operator_set! {
    /// Single-lane predicates producing a mask.
    Test {
        /// All bits of the lane are zero.
        IsDefault => ("IS_DEFAULT", Any),
        /// The sign bit is set.
        IsNegative => ("IS_NEGATIVE", Any),
        IsFinite => ("IS_FINITE", Floating),
        IsNan => ("IS_NAN", Floating),
        IsInfinite => ("IS_INFINITE", Floating),
    }
}

impl Associative {
    /// The lanewise operator this reduction folds with.
    pub const fn as_binary(self) -> Binary {
        match self {
            Associative::Add => Binary::Add,
            Associative::Mul => Binary::Mul,
            Associative::Min => Binary::Min,
            Associative::Max => Binary::Max,
            Associative::FirstNonzero => Binary::FirstNonzero,
            Associative::And => Binary::And,
            Associative::Or => Binary::Or,
            Associative::Xor => Binary::Xor,
        }
    }
}

/// How `convert_shape` translates lanes between element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Numeric value conversion.
    Convert,
    /// Raw bit reinterpretation, no value translation.
    Reinterpret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains() {
        assert!(Binary::Add.supports(ElementKind::F16));
        assert!(Binary::And.supports(ElementKind::I8));
        assert!(!Binary::And.supports(ElementKind::F64));
        assert!(!Unary::Sin.supports(ElementKind::I32));
        assert!(!Comparison::UnsignedLt.supports(ElementKind::F32));
        assert!(Test::IsNegative.supports(ElementKind::I64));
        assert!(!Test::IsNan.supports(ElementKind::I64));
    }

    #[test]
    fn test_check_reports_operator_and_kind() {
        let error = Ternary::Fma.check(ElementKind::I32).unwrap_err();
        assert_eq!(
            error,
            crate::VectorError::UnsupportedOperation {
                op: "FMA",
                kind: ElementKind::I32
            }
        );
        assert!(Ternary::Fma.check(ElementKind::F32).is_ok());
    }

    #[test]
    fn test_associative_maps_to_binary() {
        assert_eq!(Associative::Xor.as_binary(), Binary::Xor);
        assert_eq!(Associative::FirstNonzero.as_binary().name(), "FIRST_NONZERO");
    }
}
