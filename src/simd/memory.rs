//! Loads and stores between vectors and flat buffers.
//!
//! Every bounds check runs before the first element is written, so a failed
//! store leaves the destination untouched. Masked loads and stores only
//! check (and touch) the mask-true lanes.

use crate::error::{check_index, check_window, Result};
use crate::simd::{Element, Mask, Vector};

/// Byte order of lane values in a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// The byte order of the running platform.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    #[inline(always)]
    fn read<T: Element>(self, bytes: &[u8]) -> T {
        let size = T::BITS / 8;
        let mut raw = [0u8; 8];
        raw[..size].copy_from_slice(&bytes[..size]);
        if self == ByteOrder::BigEndian {
            raw[..size].reverse();
        }
        T::from_raw_bits(u64::from_le_bytes(raw))
    }

    #[inline(always)]
    fn write<T: Element>(self, e: T, bytes: &mut [u8]) {
        let size = T::BITS / 8;
        let raw = e.to_raw_bits().to_le_bytes();
        bytes[..size].copy_from_slice(&raw[..size]);
        if self == ByteOrder::BigEndian {
            bytes[..size].reverse();
        }
    }
}

/// Checks that every mask-true lane `i` has `offset + i * stride` room for
/// `stride` elements in a buffer of `length`.
fn check_masked<T: Element, const N: usize>(
    m: &Mask<T, N>,
    offset: usize,
    stride: usize,
    length: usize,
) -> Result<()> {
    (0..N)
        .filter(|&i| m.test_lane(i))
        .try_for_each(|i| check_window(offset.saturating_add(i * stride), stride, length))
}

impl<T: Element, const N: usize> Vector<T, N> {
    /// Loads `N` lanes from `slice` starting at `offset`.
    pub fn from_slice(slice: &[T], offset: usize) -> Result<Self> {
        check_window(offset, N, slice.len())?;
        Ok(Self::from_array(std::array::from_fn(|i| slice[offset + i])))
    }

    /// Loads the mask-true lanes; mask-false lanes read as zero.
    pub fn from_slice_masked(slice: &[T], offset: usize, m: &Mask<T, N>) -> Result<Self> {
        check_masked(m, offset, 1, slice.len())?;
        Ok(Self::from_array(std::array::from_fn(|i| {
            if m.test_lane(i) {
                slice[offset + i]
            } else {
                T::ZERO
            }
        })))
    }

    /// Stores the `N` lanes into `out` starting at `offset`.
    pub fn into_slice(&self, out: &mut [T], offset: usize) -> Result<()> {
        check_window(offset, N, out.len())?;
        out[offset..offset + N].copy_from_slice(self.as_array());
        Ok(())
    }

    /// Stores the mask-true lanes; other elements of `out` are left as they are.
    pub fn into_slice_masked(&self, out: &mut [T], offset: usize, m: &Mask<T, N>) -> Result<()> {
        check_masked(m, offset, 1, out.len())?;
        for (i, &e) in self.as_array().iter().enumerate() {
            if m.test_lane(i) {
                out[offset + i] = e;
            }
        }
        Ok(())
    }

    /// Loads `N` lanes encoded in `order` from `bytes` starting at byte `offset`.
    pub fn from_bytes(bytes: &[u8], offset: usize, order: ByteOrder) -> Result<Self> {
        let size = T::BITS / 8;
        check_window(offset, N * size, bytes.len())?;
        Ok(Self::from_array(std::array::from_fn(|i| {
            order.read(&bytes[offset + i * size..])
        })))
    }

    pub fn from_bytes_masked(
        bytes: &[u8],
        offset: usize,
        order: ByteOrder,
        m: &Mask<T, N>,
    ) -> Result<Self> {
        let size = T::BITS / 8;
        check_masked(m, offset, size, bytes.len())?;
        Ok(Self::from_array(std::array::from_fn(|i| {
            if m.test_lane(i) {
                order.read(&bytes[offset + i * size..])
            } else {
                T::ZERO
            }
        })))
    }

    /// Stores the `N` lanes encoded in `order` into `out` starting at byte `offset`.
    pub fn into_bytes(&self, out: &mut [u8], offset: usize, order: ByteOrder) -> Result<()> {
        let size = T::BITS / 8;
        check_window(offset, N * size, out.len())?;
        for (i, &e) in self.as_array().iter().enumerate() {
            order.write(e, &mut out[offset + i * size..]);
        }
        Ok(())
    }

    pub fn into_bytes_masked(
        &self,
        out: &mut [u8],
        offset: usize,
        order: ByteOrder,
        m: &Mask<T, N>,
    ) -> Result<()> {
        let size = T::BITS / 8;
        check_masked(m, offset, size, out.len())?;
        for (i, &e) in self.as_array().iter().enumerate() {
            if m.test_lane(i) {
                order.write(e, &mut out[offset + i * size..]);
            }
        }
        Ok(())
    }

    /// Lane `i` is `slice[offset + index_map[map_offset + i]]`.
    pub fn gather(slice: &[T], offset: usize, index_map: &[usize], map_offset: usize) -> Result<Self> {
        let positions = resolve_index_map::<N>(slice.len(), offset, index_map, map_offset)?;
        Ok(Self::from_array(positions.map(|p| slice[p])))
    }

    /// Writes lane `i` to `out[offset + index_map[map_offset + i]]`.
    ///
    /// Lanes are written in order, so a repeated position keeps the value of
    /// the highest lane that maps to it.
    pub fn scatter(
        &self,
        out: &mut [T],
        offset: usize,
        index_map: &[usize],
        map_offset: usize,
    ) -> Result<()> {
        let positions = resolve_index_map::<N>(out.len(), offset, index_map, map_offset)?;
        for (&p, &e) in positions.iter().zip(self.as_array()) {
            out[p] = e;
        }
        Ok(())
    }

    /// [`Vector::gather`] for the mask-true lanes; mask-false lanes read as
    /// zero and their positions are not bounds checked.
    pub fn gather_masked(
        slice: &[T],
        offset: usize,
        index_map: &[usize],
        map_offset: usize,
        m: &Mask<T, N>,
    ) -> Result<Self> {
        let positions = resolve_index_map_masked(slice.len(), offset, index_map, map_offset, m)?;
        Ok(Self::from_array(
            positions.map(|p| p.map_or(T::ZERO, |p| slice[p])),
        ))
    }

    /// [`Vector::scatter`] for the mask-true lanes; nothing is written for
    /// mask-false lanes.
    pub fn scatter_masked(
        &self,
        out: &mut [T],
        offset: usize,
        index_map: &[usize],
        map_offset: usize,
        m: &Mask<T, N>,
    ) -> Result<()> {
        let positions = resolve_index_map_masked(out.len(), offset, index_map, map_offset, m)?;
        for (p, &e) in positions.iter().zip(self.as_array()) {
            if let Some(p) = *p {
                out[p] = e;
            }
        }
        Ok(())
    }
}

fn resolve_index_map<const N: usize>(
    length: usize,
    offset: usize,
    index_map: &[usize],
    map_offset: usize,
) -> Result<[usize; N]> {
    check_window(map_offset, N, index_map.len())?;
    let mut positions = [0usize; N];
    for (i, position) in positions.iter_mut().enumerate() {
        let target = offset.saturating_add(index_map[map_offset + i]);
        *position = check_index(target, length)?;
    }
    Ok(positions)
}

/// Like [`resolve_index_map`], but only mask-true lanes get a position.
/// The index map window itself is always checked in full.
fn resolve_index_map_masked<T: Element, const N: usize>(
    length: usize,
    offset: usize,
    index_map: &[usize],
    map_offset: usize,
    m: &Mask<T, N>,
) -> Result<[Option<usize>; N]> {
    check_window(map_offset, N, index_map.len())?;
    let mut positions = [None; N];
    for (i, position) in positions.iter_mut().enumerate() {
        if m.test_lane(i) {
            let target = offset.saturating_add(index_map[map_offset + i]);
            *position = Some(check_index(target, length)?);
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VectorError;

    type I4 = Vector<i32, 4>;

    mod slices {
        use super::*;

        #[test]
        fn test_load_store() {
            let data = [1, 2, 3, 4, 5, 6];
            let v = I4::from_slice(&data, 2).unwrap();
            assert_eq!(v.to_array(), [3, 4, 5, 6]);
            assert!(matches!(
                I4::from_slice(&data, 3),
                Err(VectorError::IndexOutOfBounds { index: 3, length: 6 })
            ));

            let mut out = [0; 6];
            v.into_slice(&mut out, 1).unwrap();
            assert_eq!(out, [0, 3, 4, 5, 6, 0]);
        }

        #[test]
        fn test_failed_store_writes_nothing() {
            let v = I4::from_array([7; 4]);
            let mut out = [0; 5];
            assert!(v.into_slice(&mut out, 2).is_err());
            assert_eq!(out, [0; 5]);

            let m = Mask::from_array([true, false, false, true]);
            assert!(v.into_slice_masked(&mut out, 2, &m).is_err());
            assert_eq!(out, [0; 5]);
        }

        #[test]
        fn test_masked_lanes_skip_bounds() {
            let data = [1, 2, 3];
            let m = Mask::<i32, 4>::index_in_range(0, data.len());
            let v = I4::from_slice_masked(&data, 0, &m).unwrap();
            assert_eq!(v.to_array(), [1, 2, 3, 0]);

            let mut out = [0; 3];
            I4::from_array([9, 8, 7, 6])
                .into_slice_masked(&mut out, 0, &m)
                .unwrap();
            assert_eq!(out, [9, 8, 7]);
        }
    }

    mod bytes {
        use super::*;

        #[test]
        fn test_byte_orders() {
            let v = Vector::<i16, 4>::from_array([0x0102, -2, 0, 0x7f00]);
            let mut le = [0u8; 8];
            let mut be = [0u8; 8];
            v.into_bytes(&mut le, 0, ByteOrder::LittleEndian).unwrap();
            v.into_bytes(&mut be, 0, ByteOrder::BigEndian).unwrap();
            assert_eq!(le, [0x02, 0x01, 0xfe, 0xff, 0, 0, 0x00, 0x7f]);
            assert_eq!(be, [0x01, 0x02, 0xff, 0xfe, 0, 0, 0x7f, 0x00]);

            let back = Vector::<i16, 4>::from_bytes(&be, 0, ByteOrder::BigEndian).unwrap();
            assert_eq!(back, v);
        }

        #[test]
        fn test_float_bytes() {
            let v = Vector::<f32, 2>::from_array([1.0, -2.5]);
            let mut buf = [0u8; 12];
            v.into_bytes(&mut buf, 4, ByteOrder::native()).unwrap();
            assert_eq!(&buf[4..8], &1.0f32.to_ne_bytes());
            let back = Vector::<f32, 2>::from_bytes(&buf, 4, ByteOrder::native()).unwrap();
            assert_eq!(back, v);
            assert!(v.into_bytes(&mut buf, 5, ByteOrder::native()).is_err());
        }

        #[test]
        fn test_masked_bytes() {
            let v = Vector::<i32, 2>::from_array([1, 2]);
            let m = Mask::from_array([false, true]);
            let mut buf = [0xaau8; 8];
            v.into_bytes_masked(&mut buf, 0, ByteOrder::LittleEndian, &m)
                .unwrap();
            assert_eq!(buf, [0xaa, 0xaa, 0xaa, 0xaa, 2, 0, 0, 0]);
            let back =
                Vector::<i32, 2>::from_bytes_masked(&buf, 0, ByteOrder::LittleEndian, &m).unwrap();
            assert_eq!(back.to_array(), [0, 2]);
        }
    }

    mod indexed {
        use super::*;

        #[test]
        fn test_gather() {
            let data = [10, 11, 12, 13, 14, 15];
            let map = [0, 5, 3, 3, 1];
            let v = I4::gather(&data, 0, &map, 1).unwrap();
            assert_eq!(v.to_array(), [15, 13, 13, 11]);
            assert!(I4::gather(&data, 1, &map, 1).is_err());
            assert!(I4::gather(&data, 0, &map, 2).is_err());
        }

        #[test]
        fn test_scatter_checks_before_writing() {
            let v = I4::from_array([1, 2, 3, 4]);
            let mut out = [0; 5];
            assert!(v.scatter(&mut out, 0, &[0, 1, 2, 9], 0).is_err());
            assert_eq!(out, [0; 5]);

            v.scatter(&mut out, 1, &[3, 0, 2, 0], 0).unwrap();
            assert_eq!(out, [0, 4, 0, 3, 1]);
        }

        #[test]
        fn test_masked_gather_skips_unset_lanes() {
            let data = [10, 11, 12, 13];
            let map = [2, 99, 0, 99];
            let m = Mask::<i32, 4>::from_array([true, false, true, false]);
            let v = I4::gather_masked(&data, 0, &map, 0, &m).unwrap();
            assert_eq!(v.to_array(), [12, 0, 10, 0]);

            assert!(I4::gather(&data, 0, &map, 0).is_err());
            assert!(I4::gather_masked(&data, 0, &map, 0, &Mask::all(true)).is_err());
            assert!(I4::gather_masked(&data, 0, &map, 1, &m).is_err());
        }

        #[test]
        fn test_masked_scatter_leaves_unset_positions() {
            let v = I4::from_array([1, 2, 3, 4]);
            let m = Mask::<i32, 4>::from_array([false, true, false, true]);
            let mut out = [0; 4];
            v.scatter_masked(&mut out, 0, &[50, 3, 50, 0], 0, &m).unwrap();
            assert_eq!(out, [4, 0, 0, 2]);

            let mut untouched = [0; 4];
            assert!(v
                .scatter_masked(&mut untouched, 0, &[0, 1, 2, 50], 0, &Mask::all(true))
                .is_err());
            assert_eq!(untouched, [0; 4]);
        }
    }
}
