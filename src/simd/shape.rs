//! Vector shapes: the bit-width classes a species can take.

use std::fmt;

use crate::platform::MAX_VECTOR_BITS;
use crate::simd::ElementKind;

/// Bit-width class of a vector.
///
/// `Max` stands for the widest shape this build targets
/// ([`MAX_VECTOR_BITS`]). It is an alias: species lookups resolve it to the
/// fixed shape of that width, so `Max` never keys a species of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VectorShape {
    S64,
    S128,
    S256,
    S512,
    Max,
}

impl VectorShape {
    /// Every shape, fixed ones first.
    pub const ALL: [VectorShape; 5] = [
        VectorShape::S64,
        VectorShape::S128,
        VectorShape::S256,
        VectorShape::S512,
        VectorShape::Max,
    ];

    /// Width of the shape in bits.
    #[inline(always)]
    pub const fn bit_size(self) -> usize {
        match self {
            VectorShape::S64 => 64,
            VectorShape::S128 => 128,
            VectorShape::S256 => 256,
            VectorShape::S512 => 512,
            VectorShape::Max => MAX_VECTOR_BITS,
        }
    }

    /// Width of the shape in bytes.
    #[inline(always)]
    pub const fn byte_size(self) -> usize {
        self.bit_size() / 8
    }

    /// Number of `kind` lanes that fill this shape.
    #[inline(always)]
    pub const fn lane_count(self, kind: ElementKind) -> usize {
        self.bit_size() / kind.bit_size()
    }

    /// `Max` resolved to the fixed shape of the build width; fixed shapes
    /// map to themselves.
    #[inline(always)]
    pub const fn resolve(self) -> VectorShape {
        match self {
            VectorShape::Max => match Self::for_bit_size(MAX_VECTOR_BITS) {
                Some(shape) => shape,
                None => VectorShape::S128,
            },
            shape => shape,
        }
    }

    /// The fixed shape with exactly `bits` bits, if any.
    pub const fn for_bit_size(bits: usize) -> Option<VectorShape> {
        match bits {
            64 => Some(VectorShape::S64),
            128 => Some(VectorShape::S128),
            256 => Some(VectorShape::S256),
            512 => Some(VectorShape::S512),
            _ => None,
        }
    }

    /// The fixed shape holding `lanes` lanes of `kind`, if any.
    pub const fn for_lane_count(kind: ElementKind, lanes: usize) -> Option<VectorShape> {
        match lanes.checked_mul(kind.bit_size()) {
            Some(bits) => Self::for_bit_size(bits),
            None => None,
        }
    }
}

impl fmt::Display for VectorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorShape::Max => write!(f, "S_Max_BIT"),
            shape => write!(f, "S_{}_BIT", shape.bit_size()),
        }
    }
}
