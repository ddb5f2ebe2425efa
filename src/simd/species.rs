//! Species: the (element kind, lane count, shape) descriptor of a vector.
//!
//! Two views of the same idea live here:
//!
//! - [`Species<T, N>`] is a zero-sized, compile-time descriptor. It is the
//!   factory for vectors, masks and shuffles of exactly that configuration,
//!   and mixing configurations is a type error.
//! - [`SpeciesInfo`] is the runtime descriptor, keyed by
//!   ([`ElementKind`], [`VectorShape`]). One canonical instance per key is
//!   published into a process-wide registry on first use.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};

use half::f16;
use log::debug;
use once_cell::sync::Lazy;

use crate::error::{check_window, length_mismatch, Result};
use crate::platform::{self, MAX_VECTOR_BITS};
use crate::simd::shuffle::partially_wrap_index;
use crate::simd::{Element, ElementKind, Mask, Shuffle, Vector, VectorShape};

/// Compile-time species of `N` lanes of `T`.
///
/// Only configurations where `N` is a power of two no larger than 64 and
/// `N * T::BITS` is 64, 128, 256 or 512 can be instantiated; anything else is
/// rejected when the species is first used.
pub struct Species<T: Element, const N: usize> {
    _element: PhantomData<T>,
}

impl<T: Element, const N: usize> Clone for Species<T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Element, const N: usize> Copy for Species<T, N> {}

impl<T: Element, const N: usize> PartialEq for Species<T, N> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: Element, const N: usize> Eq for Species<T, N> {}

impl<T: Element, const N: usize> Default for Species<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element, const N: usize> Species<T, N> {
    pub(crate) const VALID: () = assert!(
        N.is_power_of_two()
            && N <= 64
            && matches!(N * T::BITS, 64 | 128 | 256 | 512),
        "unsupported (element kind, lane count) combination"
    );

    /// Width of this species in bits.
    pub const BIT_SIZE: usize = N * T::BITS;

    #[inline(always)]
    pub const fn new() -> Self {
        let () = Self::VALID;
        Self {
            _element: PhantomData,
        }
    }

    #[inline(always)]
    pub const fn lane_count(&self) -> usize {
        N
    }

    #[inline(always)]
    pub const fn element_kind(&self) -> ElementKind {
        T::KIND
    }

    /// Lane width in bits.
    #[inline(always)]
    pub const fn element_size(&self) -> usize {
        T::BITS
    }

    #[inline(always)]
    pub const fn vector_bit_size(&self) -> usize {
        Self::BIT_SIZE
    }

    #[inline(always)]
    pub const fn vector_byte_size(&self) -> usize {
        Self::BIT_SIZE / 8
    }

    /// The fixed shape of this species.
    pub fn vector_shape(&self) -> VectorShape {
        VectorShape::for_bit_size(Self::BIT_SIZE).unwrap_or(VectorShape::Max.resolve())
    }

    /// The canonical runtime descriptor of this species.
    pub fn info(&self) -> &'static SpeciesInfo {
        SpeciesInfo::of(T::KIND, self.vector_shape())
    }

    /// Largest multiple of the lane count not above `length`.
    #[inline(always)]
    pub const fn loop_bound(&self, length: usize) -> usize {
        length & !(N - 1)
    }

    #[inline(always)]
    pub fn zero(&self) -> Vector<T, N> {
        Vector::from_array([T::ZERO; N])
    }

    #[inline(always)]
    pub fn broadcast(&self, e: T) -> Vector<T, N> {
        Vector::from_array([e; N])
    }

    /// Lane `i` holds the value `i`.
    #[inline(always)]
    pub fn iota(&self) -> Vector<T, N> {
        Vector::from_array(std::array::from_fn(|i| T::from_index(i as i64)))
    }

    /// Builds a vector from exactly `N` values.
    pub fn from_values(&self, values: &[T]) -> Result<Vector<T, N>> {
        if values.len() != N {
            return Err(length_mismatch(
                N,
                values.len(),
                "vector values must cover every lane",
            ));
        }
        Ok(Vector::from_array(std::array::from_fn(|i| values[i])))
    }

    /// Loads `N` lanes from `slice` starting at `offset`.
    pub fn from_slice(&self, slice: &[T], offset: usize) -> Result<Vector<T, N>> {
        Vector::from_slice(slice, offset)
    }

    #[inline(always)]
    pub fn mask_all(&self, bit: bool) -> Mask<T, N> {
        Mask::all(bit)
    }

    /// Builds a mask from exactly `N` booleans.
    pub fn mask_from_array(&self, bits: &[bool]) -> Result<Mask<T, N>> {
        if bits.len() != N {
            return Err(length_mismatch(
                N,
                bits.len(),
                "mask array must cover every lane",
            ));
        }
        Mask::from_slice(bits, 0)
    }

    /// Builds a mask from the low `N` bits of `bits`, lane 0 in bit 0.
    #[inline(always)]
    pub fn mask_from_long(&self, bits: u64) -> Mask<T, N> {
        Mask::from_long(bits)
    }

    /// Lane `i` is set iff `offset + i < limit`.
    #[inline(always)]
    pub fn index_in_range(&self, offset: usize, limit: usize) -> Mask<T, N> {
        Mask::index_in_range(offset, limit)
    }

    /// Reads `N` indexes from `indexes` at `offset`, partially wrapping each.
    pub fn shuffle_from_array(&self, indexes: &[i32], offset: usize) -> Result<Shuffle<T, N>> {
        check_window(offset, N, indexes.len())?;
        Ok(Shuffle::from_wrapped(std::array::from_fn(|i| {
            partially_wrap_index(indexes[offset + i], N)
        })))
    }

    /// Builds a shuffle whose lane `i` is `f(i)`, partially wrapped.
    pub fn shuffle_from_op(&self, f: impl Fn(usize) -> i32) -> Shuffle<T, N> {
        Shuffle::from_op(f)
    }

    /// Lane `i` selects `start + i * step`.
    pub fn iota_shuffle(&self, start: i32, step: i32, wrap: bool) -> Shuffle<T, N> {
        Shuffle::iota(start, step, wrap)
    }
}

impl<T: Element, const N: usize> fmt::Debug for Species<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Species[{}, {}, {}]", T::KIND, N, self.vector_shape())
    }
}

/// Runtime descriptor of one (element kind, shape) pair.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SpeciesInfo {
    kind: ElementKind,
    shape: VectorShape,
    lane_count: usize,
}

type SpeciesKey = (ElementKind, VectorShape);

static REGISTRY: Lazy<RwLock<HashMap<SpeciesKey, &'static SpeciesInfo>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

impl SpeciesInfo {
    /// The canonical species for `kind` and `shape`.
    ///
    /// The first caller for a key publishes the instance; racing callers all
    /// observe that same instance. [`VectorShape::Max`] is resolved to its
    /// fixed shape first.
    pub fn of(kind: ElementKind, shape: VectorShape) -> &'static SpeciesInfo {
        let shape = shape.resolve();
        let key = (kind, shape);

        if let Some(&info) = REGISTRY
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return info;
        }

        let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
        *registry.entry(key).or_insert_with(|| {
            let info = SpeciesInfo {
                kind,
                shape,
                lane_count: shape.lane_count(kind),
            };
            debug!(
                "published species {} x {} ({}, {} bits)",
                kind,
                info.lane_count,
                shape,
                shape.bit_size()
            );
            &*Box::leak(Box::new(info))
        })
    }

    /// The platform-maximal species for `kind`.
    pub fn max(kind: ElementKind) -> &'static SpeciesInfo {
        Self::of(kind, VectorShape::Max)
    }

    /// The species best suited to the running CPU for `kind`.
    pub fn preferred(kind: ElementKind) -> &'static SpeciesInfo {
        Self::of(kind, platform::preferred_shape())
    }

    /// The fixed-shape species holding `lane_count` lanes of `kind`.
    pub fn for_lane_count(kind: ElementKind, lane_count: usize) -> Result<&'static SpeciesInfo> {
        VectorShape::for_lane_count(kind, lane_count)
            .filter(|_| lane_count.is_power_of_two())
            .map(|shape| Self::of(kind, shape))
            .ok_or_else(|| {
                length_mismatch(
                    VectorShape::S128.lane_count(kind),
                    lane_count,
                    format!("no species of {} has this lane count", kind),
                )
            })
    }

    #[inline(always)]
    pub fn element_kind(&self) -> ElementKind {
        self.kind
    }

    #[inline(always)]
    pub fn shape(&self) -> VectorShape {
        self.shape
    }

    #[inline(always)]
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.kind.bit_size()
    }

    #[inline(always)]
    pub fn vector_bit_size(&self) -> usize {
        self.shape.bit_size()
    }

    #[inline(always)]
    pub fn vector_byte_size(&self) -> usize {
        self.shape.byte_size()
    }

    /// Same shape, different element kind.
    pub fn with_kind(&self, kind: ElementKind) -> &'static SpeciesInfo {
        Self::of(kind, self.shape)
    }

    /// Same element kind, different shape.
    pub fn with_shape(&self, shape: VectorShape) -> &'static SpeciesInfo {
        Self::of(self.kind, shape)
    }

    /// Fails with `LengthMismatch` unless both species have the same lane count.
    pub fn check_lane_count(&self, other: &SpeciesInfo) -> Result<()> {
        if self.lane_count == other.lane_count {
            Ok(())
        } else {
            Err(length_mismatch(
                self.lane_count,
                other.lane_count,
                format!("species {} and {} differ in lane count", self, other),
            ))
        }
    }

    /// Fails with `LengthMismatch` unless `other` is this very species.
    pub fn check(&self, other: &SpeciesInfo) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(length_mismatch(
                self.lane_count,
                other.lane_count,
                format!("expected species {}, got {}", self, other),
            ))
        }
    }

    /// Returns `true` if the compile-time species `Species<T, N>` has this layout.
    pub fn matches<T: Element, const N: usize>(&self) -> bool {
        self.kind == T::KIND && self.lane_count == N
    }
}

impl fmt::Display for SpeciesInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Species[{}, {}, {}]", self.kind, self.lane_count, self.shape)
    }
}

macro_rules! species_aliases {
    ($($vector:ident, $species:ident = $t:ty, $bits:expr;)+) => {
        $(
            #[doc = concat!("`", stringify!($t), "` vector of ", stringify!($bits), " bits.")]
            pub type $vector = Vector<$t, { $bits / (std::mem::size_of::<$t>() * 8) }>;
            #[doc = concat!("Species of [`", stringify!($vector), "`].")]
            pub type $species = Species<$t, { $bits / (std::mem::size_of::<$t>() * 8) }>;
        )+
    };
}

species_aliases! {
    ByteVector64, ByteSpecies64 = i8, 64;
    ByteVector128, ByteSpecies128 = i8, 128;
    ByteVector256, ByteSpecies256 = i8, 256;
    ByteVector512, ByteSpecies512 = i8, 512;
    ByteVectorMax, ByteSpeciesMax = i8, MAX_VECTOR_BITS;
    ShortVector64, ShortSpecies64 = i16, 64;
    ShortVector128, ShortSpecies128 = i16, 128;
    ShortVector256, ShortSpecies256 = i16, 256;
    ShortVector512, ShortSpecies512 = i16, 512;
    ShortVectorMax, ShortSpeciesMax = i16, MAX_VECTOR_BITS;
    IntVector64, IntSpecies64 = i32, 64;
    IntVector128, IntSpecies128 = i32, 128;
    IntVector256, IntSpecies256 = i32, 256;
    IntVector512, IntSpecies512 = i32, 512;
    IntVectorMax, IntSpeciesMax = i32, MAX_VECTOR_BITS;
    LongVector64, LongSpecies64 = i64, 64;
    LongVector128, LongSpecies128 = i64, 128;
    LongVector256, LongSpecies256 = i64, 256;
    LongVector512, LongSpecies512 = i64, 512;
    LongVectorMax, LongSpeciesMax = i64, MAX_VECTOR_BITS;
    HalfVector64, HalfSpecies64 = f16, 64;
    HalfVector128, HalfSpecies128 = f16, 128;
    HalfVector256, HalfSpecies256 = f16, 256;
    HalfVector512, HalfSpecies512 = f16, 512;
    HalfVectorMax, HalfSpeciesMax = f16, MAX_VECTOR_BITS;
    FloatVector64, FloatSpecies64 = f32, 64;
    FloatVector128, FloatSpecies128 = f32, 128;
    FloatVector256, FloatSpecies256 = f32, 256;
    FloatVector512, FloatSpecies512 = f32, 512;
    FloatVectorMax, FloatSpeciesMax = f32, MAX_VECTOR_BITS;
    DoubleVector64, DoubleSpecies64 = f64, 64;
    DoubleVector128, DoubleSpecies128 = f64, 128;
    DoubleVector256, DoubleSpecies256 = f64, 256;
    DoubleVector512, DoubleSpecies512 = f64, 512;
    DoubleVectorMax, DoubleSpeciesMax = f64, MAX_VECTOR_BITS;
}
