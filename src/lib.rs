//! Explicit SIMD vectors, generic over element type and lane count.
//!
//! A [`Species`](simd::Species) names one vector configuration (element kind,
//! lane count, bit width). From it you build [`Vector`](simd::Vector)s,
//! [`Mask`](simd::Mask)s and [`Shuffle`](simd::Shuffle)s, chain lanewise,
//! masked, permuting and reducing operations on them, and store the results
//! back to memory.
//!
//! ```rust
//! use lanewise::simd::{Binary, Associative, Species};
//!
//! let species = Species::<i32, 4>::new();
//! let iota = species.iota();
//! let doubled = iota.lanewise(Binary::Add, &iota).unwrap();
//! assert_eq!(doubled.to_array(), [0, 2, 4, 6]);
//! assert_eq!(doubled.reduce_lanes(Associative::Add).unwrap(), 12);
//! ```

pub mod error;
pub mod platform;
pub mod simd;

pub use error::{Result, VectorError};
pub use simd::traits::{SimdLanewise, SimdReduce};

/// Slices at or below this many elements are processed on the calling thread
/// by the `par_simd_*` bulk kernels.
pub const PARALLEL_SIMD_THRESHOLD: usize = 262_144;

/// Target number of elements handed to each rayon task by the bulk kernels.
pub const PARALLEL_CHUNK_SIZE: usize = 16_384;
