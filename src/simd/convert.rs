//! Shape and element-kind conversions.
//!
//! A conversion first produces a *logical result* (the `N` converted lanes
//! for [`Conversion::Convert`], the raw little-endian bytes of the source for
//! [`Conversion::Reinterpret`]) and then windows it onto the `M` output lanes.
//! When the logical result is longer than the output, `part` in `[0, L/M)`
//! selects which slice is returned; when it is shorter, `part` in
//! `(-(M/L), 0]` selects where it lands in an otherwise zero output.

use crate::error::{invalid_part, length_mismatch, Result};
use crate::simd::{Conversion, Element, FloatElement, Vector};

/// Largest vector in bytes.
const MAX_VECTOR_BYTES: usize = 64;

/// Where the logical result sits relative to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// Output is read from the logical result starting at this offset.
    Take(usize),
    /// The logical result is written into a zero output at this offset.
    Place(usize),
}

fn part_window(logical: usize, output: usize, part: isize) -> Result<Window> {
    if logical > output {
        let parts = (logical / output) as isize;
        if !(0..parts).contains(&part) {
            return Err(invalid_part(
                part,
                format!("expanding conversion expects a part in [0, {})", parts),
            ));
        }
        Ok(Window::Take(part as usize * output))
    } else if logical < output {
        let parts = (output / logical) as isize;
        if !(-parts + 1..=0).contains(&part) {
            return Err(invalid_part(
                part,
                format!("contracting conversion expects a part in ({}, 0]", -parts),
            ));
        }
        Ok(Window::Place(part.unsigned_abs() * logical))
    } else if part != 0 {
        Err(invalid_part(part, "same-size conversion expects part 0"))
    } else {
        Ok(Window::Take(0))
    }
}

fn apply_window<E: Copy>(logical: &[E], out: &mut [E], window: Window) {
    match window {
        Window::Take(offset) => out.copy_from_slice(&logical[offset..offset + out.len()]),
        Window::Place(offset) => out[offset..offset + logical.len()].copy_from_slice(logical),
    }
}

impl<T: Element, const N: usize> Vector<T, N> {
    /// Converts to `M` lanes of `U`, by value or by bits according to `conversion`.
    pub fn convert_shape<U: Element, const M: usize>(
        &self,
        conversion: Conversion,
        part: isize,
    ) -> Result<Vector<U, M>> {
        match conversion {
            Conversion::Convert => {
                let window = part_window(N, M, part)?;
                let logical = self.to_array().map(|e| U::from_scalar(e.to_scalar()));
                let mut lanes = [U::ZERO; M];
                apply_window(&logical, &mut lanes, window);
                Ok(Vector::from_array(lanes))
            }
            Conversion::Reinterpret => self.reinterpret_shape(part),
        }
    }

    /// Lane-for-lane numeric conversion to `U`.
    ///
    /// Integral narrowing wraps, float to integral saturates (NaN becomes 0)
    /// and everything else rounds to nearest.
    pub fn convert<U: Element>(&self) -> Vector<U, N> {
        Vector::from_array(self.to_array().map(|e| U::from_scalar(e.to_scalar())))
    }

    /// Reinterprets the raw bits as `M` lanes of `U`.
    ///
    /// Lanes are laid out little-endian, lane 0 first, on both sides.
    pub fn reinterpret_shape<U: Element, const M: usize>(&self, part: isize) -> Result<Vector<U, M>> {
        let in_size = T::BITS / 8;
        let out_size = U::BITS / 8;
        let window = part_window(N * in_size, M * out_size, part)?;

        let mut source = [0u8; MAX_VECTOR_BYTES];
        for (i, e) in self.as_array().iter().enumerate() {
            let bytes = e.to_raw_bits().to_le_bytes();
            source[i * in_size..(i + 1) * in_size].copy_from_slice(&bytes[..in_size]);
        }
        let mut bytes = [0u8; MAX_VECTOR_BYTES];
        apply_window(&source[..N * in_size], &mut bytes[..M * out_size], window);

        Ok(Vector::from_array(std::array::from_fn(|i| {
            let mut raw = [0u8; 8];
            raw[..out_size].copy_from_slice(&bytes[i * out_size..(i + 1) * out_size]);
            U::from_raw_bits(u64::from_le_bytes(raw))
        })))
    }

    /// The lane bits viewed as the same-width integral kind.
    #[inline(always)]
    pub fn view_as_integral_lanes(&self) -> Vector<T::Integral, N> {
        Vector::from_array(self.to_array().map(|e| e.to_integral_bits()))
    }

    /// The lane bits viewed as the floating kind `F` of the same width.
    ///
    /// Byte lanes have no floating counterpart, so `i8` vectors cannot
    /// name an `F` here.
    #[inline(always)]
    pub fn view_as_floating_lanes<F>(&self) -> Vector<F, N>
    where
        F: FloatElement + Element<Integral = T::Integral>,
    {
        Vector::from_array(
            self.to_array()
                .map(|e| F::from_integral_bits(e.to_integral_bits())),
        )
    }

    /// The raw bits viewed as `B` byte lanes.
    pub fn reinterpret_as_bytes<const B: usize>(&self) -> Result<Vector<i8, B>> {
        if B * 8 != N * T::BITS {
            return Err(length_mismatch(
                N * T::BITS / 8,
                B,
                "byte view must cover the whole vector",
            ));
        }
        self.reinterpret_shape(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VectorError;
    use half::f16;

    #[test]
    fn test_part_window() {
        assert_eq!(part_window(8, 4, 1), Ok(Window::Take(4)));
        assert!(part_window(8, 4, 2).is_err());
        assert!(part_window(8, 4, -1).is_err());
        assert_eq!(part_window(2, 8, -3), Ok(Window::Place(6)));
        assert!(part_window(2, 8, -4).is_err());
        assert!(part_window(2, 8, 1).is_err());
        assert_eq!(part_window(4, 4, 0), Ok(Window::Take(0)));
        assert!(part_window(4, 4, 1).is_err());
    }

    mod numeric {
        use super::*;

        #[test]
        fn test_widening_selects_part() {
            let v = Vector::<i32, 4>::from_array([1, -2, 3, -4]);
            let lo: Vector<i64, 2> = v.convert_shape(Conversion::Convert, 0).unwrap();
            let hi: Vector<i64, 2> = v.convert_shape(Conversion::Convert, 1).unwrap();
            assert_eq!(lo.to_array(), [1, -2]);
            assert_eq!(hi.to_array(), [3, -4]);
            assert!(matches!(
                v.convert_shape::<i64, 2>(Conversion::Convert, 2),
                Err(VectorError::InvalidPart { part: 2, .. })
            ));
        }

        #[test]
        fn test_narrowing_places_lanes() {
            let v = Vector::<i32, 4>::from_array([1, 300, -1, 128]);
            let placed: Vector<i8, 16> = v.convert_shape(Conversion::Convert, -2).unwrap();
            let mut expected = [0i8; 16];
            expected[8..12].copy_from_slice(&[1, 44, -1, -128]);
            assert_eq!(placed.to_array(), expected);
        }

        #[test]
        fn test_float_to_integral() {
            let v = Vector::<f32, 4>::from_array([1.9, -1.9, f32::NAN, 1e20]);
            assert_eq!(v.convert::<i32>().to_array(), [1, -1, 0, i32::MAX]);
            let d = Vector::<f64, 2>::from_array([3.5, -2.5]);
            assert_eq!(d.convert::<i64>().to_array(), [3, -2]);
        }

        #[test]
        fn test_integral_to_float() {
            let v = Vector::<i16, 4>::from_array([1, -2, 3, i16::MIN]);
            let f: Vector<f32, 4> = v.convert();
            assert_eq!(f.to_array(), [1.0, -2.0, 3.0, -32768.0]);
            let h: Vector<f16, 4> = v.convert();
            assert_eq!(h.lane(1), Ok(f16::from_f32(-2.0)));
        }
    }

    mod reinterpret {
        use super::*;

        #[test]
        fn test_floating_view_of_integral_bits() {
            let bits = Vector::<i16, 4>::from_array([0x3c00, 0xc000u16 as i16, 0x7c00, 0]);
            let halves: Vector<f16, 4> = bits.view_as_floating_lanes();
            assert_eq!(halves.lane(0), Ok(f16::ONE));
            assert_eq!(halves.lane(1), Ok(f16::from_f32(-2.0)));
            assert_eq!(halves.lane(2), Ok(f16::INFINITY));
            assert_eq!(halves.view_as_integral_lanes(), bits);

            let doubles = Vector::<i64, 2>::from_array([0, i64::MIN]).view_as_floating_lanes::<f64>();
            assert_eq!(doubles.to_array().map(f64::to_bits), [0, 1 << 63]);
            let floats = Vector::<f32, 4>::from_array([1.5; 4]);
            assert_eq!(floats.view_as_floating_lanes::<f32>(), floats);
        }

        #[test]
        fn test_float_bits() {
            let v = Vector::<f32, 2>::from_array([1.0, -0.0]);
            assert_eq!(
                v.view_as_integral_lanes().to_array(),
                [0x3f80_0000, i32::MIN]
            );
            let back: Vector<f32, 2> = v.view_as_integral_lanes().view_as_floating_lanes();
            assert_eq!(back.to_array().map(f32::to_bits), v.to_array().map(f32::to_bits));
            let longs: Vector<i64, 1> = v.reinterpret_shape(0).unwrap();
            assert_eq!(longs.lane(0), Ok(((0x8000_0000u64 << 32) | 0x3f80_0000) as i64));
        }

        #[test]
        fn test_byte_layout_is_little_endian() {
            let v = Vector::<i32, 4>::from_array([0x0403_0201, 0, 0, -1]);
            let bytes = v.reinterpret_as_bytes::<16>().unwrap();
            assert_eq!(&bytes.to_array()[..4], &[1, 2, 3, 4]);
            assert_eq!(&bytes.to_array()[12..], &[-1, -1, -1, -1]);
            assert!(v.reinterpret_as_bytes::<8>().is_err());
        }

        #[test]
        fn test_reinterpret_round_trip_across_shapes() {
            let v = Vector::<i16, 8>::from_array([1, 2, 3, 4, 5, 6, 7, 8]);
            let lo: Vector<i32, 2> = v.reinterpret_shape(0).unwrap();
            let hi: Vector<i32, 2> = v.reinterpret_shape(1).unwrap();
            assert_eq!(lo.to_array(), [0x0002_0001, 0x0004_0003]);

            let back_lo: Vector<i16, 8> = lo.reinterpret_shape(0).unwrap();
            let back_hi: Vector<i16, 8> = hi.reinterpret_shape(-1).unwrap();
            assert_eq!(back_lo.to_array(), [1, 2, 3, 4, 0, 0, 0, 0]);
            assert_eq!(back_hi.to_array(), [0, 0, 0, 0, 5, 6, 7, 8]);
        }

        #[test]
        fn test_convert_shape_dispatches_reinterpret() {
            let v = Vector::<f64, 2>::from_array([1.0, 2.0]);
            let bits: Vector<i64, 2> = v.convert_shape(Conversion::Reinterpret, 0).unwrap();
            assert_eq!(bits, v.view_as_integral_lanes());
        }
    }
}
