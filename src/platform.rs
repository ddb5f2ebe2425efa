//! Platform probing: which vector shapes suit this machine.
//!
//! Two answers live here. [`MAX_VECTOR_BITS`] is fixed at build time from the
//! cfg flag `build.rs` emits after probing the build host, and it sizes every
//! `...Max` type alias. [`preferred_shape`] consults a runtime CPU feature
//! probe, run once and cached, and is purely advisory: nothing on a lanewise
//! path ever calls it.

use log::debug;
use once_cell::sync::Lazy;

use crate::simd::VectorShape;

/// Bit width of the platform-maximal shape for this build.
#[cfg(avx512)]
pub const MAX_VECTOR_BITS: usize = 512;

/// Bit width of the platform-maximal shape for this build.
#[cfg(all(avx2, not(avx512)))]
pub const MAX_VECTOR_BITS: usize = 256;

/// Bit width of the platform-maximal shape for this build.
#[cfg(not(any(avx512, avx2)))]
pub const MAX_VECTOR_BITS: usize = 128;

static CPU_FEATURES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let features = probe();
    debug!("detected CPU vector features: {:?}", features);
    features
});

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn probe() -> Vec<&'static str> {
    let mut features = Vec::new();
    if std::arch::is_x86_feature_detected!("sse4.1") {
        features.push("sse4.1");
    }
    if std::arch::is_x86_feature_detected!("avx") {
        features.push("avx");
    }
    if std::arch::is_x86_feature_detected!("avx2") {
        features.push("avx2");
    }
    if std::arch::is_x86_feature_detected!("fma") {
        features.push("fma");
    }
    if std::arch::is_x86_feature_detected!("avx512f") {
        features.push("avx512f");
    }
    features
}

#[cfg(target_arch = "aarch64")]
fn probe() -> Vec<&'static str> {
    let mut features = Vec::new();
    if std::arch::is_aarch64_feature_detected!("neon") {
        features.push("neon");
    }
    features
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn probe() -> Vec<&'static str> {
    Vec::new()
}

/// Names of the vector ISA extensions available on the running CPU.
pub fn cpu_features() -> &'static [&'static str] {
    CPU_FEATURES.as_slice()
}

/// Returns `true` if the running CPU reports `name`.
pub fn has_feature(name: &str) -> bool {
    cpu_features().contains(&name)
}

/// Widest vector width, in bits, the running CPU handles natively.
///
/// Never below 128: every supported target can at least emulate a 128-bit
/// register pair cheaply.
pub fn native_vector_bits() -> usize {
    if has_feature("avx512f") {
        512
    } else if has_feature("avx2") {
        256
    } else {
        128
    }
}

/// The fixed shape that best matches the running CPU.
pub fn preferred_shape() -> VectorShape {
    VectorShape::for_bit_size(native_vector_bits()).unwrap_or(VectorShape::S128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_vector_bits_is_a_fixed_shape() {
        assert!(matches!(MAX_VECTOR_BITS, 128 | 256 | 512));
    }

    #[test]
    fn test_probe_is_cached() {
        let first = cpu_features().as_ptr();
        let second = cpu_features().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_preferred_shape_is_concrete() {
        let shape = preferred_shape();
        assert_ne!(shape, VectorShape::Max);
        assert!(shape.bit_size() >= 128);
    }
}
