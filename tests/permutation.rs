use lanewise::simd::{IntSpecies128, Mask, Shuffle, Species, Vector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn random_permutation<const N: usize>(rng: &mut StdRng) -> [i32; N] {
    let mut order: [i32; N] = std::array::from_fn(|i| i as i32);
    order.shuffle(rng);
    order
}

#[test_log::test]
fn test_mask_scenario() {
    let mask = IntSpecies128::new()
        .mask_from_array(&[true, false, true, true])
        .unwrap();
    assert_eq!(mask.true_count(), 3);
    assert_eq!(mask.first_true(), 0);
    assert_eq!(mask.last_true(), 3);
    assert_eq!(mask.to_long().unwrap(), 0b1101);
}

#[test_log::test]
fn test_mask_double_negation() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let bits: u64 = rng.random();
        let m8 = Mask::<i16, 8>::from_long(bits);
        let m64 = Mask::<i8, 64>::from_long(bits);
        assert_eq!(m8.not().not(), m8);
        assert_eq!(m64.not().not(), m64);
        assert_eq!(m64.to_long().unwrap(), bits);
    }
}

#[test_log::test]
fn test_shuffle_wrap_scenario() {
    let shuffle = IntSpecies128::new()
        .shuffle_from_array(&[2, -1, 0, 1], 0)
        .unwrap();
    assert_eq!(shuffle.wrap_indexes().to_array(), [2, 3, 0, 1]);
}

#[test_log::test]
fn test_wrapped_shuffles_are_valid() {
    fn check<const N: usize>(rng: &mut StdRng) {
        let raw: Vec<i32> = (0..N).map(|_| rng.random_range(-1000..1000)).collect();
        let shuffle = Species::<i8, N>::new()
            .shuffle_from_array(&raw, 0)
            .unwrap();
        assert!(shuffle.wrap_indexes().lane_is_valid().all_true());
        assert!(shuffle.wrap_indexes().check_indexes().is_ok());
    }

    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..50 {
        check::<8>(&mut rng);
        check::<16>(&mut rng);
        check::<32>(&mut rng);
        check::<64>(&mut rng);
    }
}

#[test_log::test]
fn test_permutation_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let v: Vector<i16, 16> = Vector::from_array(std::array::from_fn(|_| rng.random()));
        let order = random_permutation::<16>(&mut rng);
        let mut inverse = [0i32; 16];
        for (i, &k) in order.iter().enumerate() {
            inverse[k as usize] = i as i32;
        }

        let forward = Shuffle::try_from_indices(&order).unwrap();
        let backward = Shuffle::try_from_indices(&inverse).unwrap();
        assert_eq!(v.rearrange(&forward).rearrange(&backward), v);
        assert_eq!(
            forward.rearrange(&backward).to_array(),
            Shuffle::<i16, 16>::iota(0, 1, false).to_array()
        );
    }
}

#[test_log::test]
fn test_compress_scenario() {
    let v = IntSpecies128::new().from_values(&[10, 20, 30, 40]).unwrap();
    let m = Mask::from_array([false, true, false, true]);
    let packed = v.compress(&m);
    assert_eq!(&packed.to_array()[..2], &[20, 40]);
}

#[test_log::test]
fn test_compress_expand_law() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..200 {
        let v: Vector<i32, 16> = Vector::from_array(std::array::from_fn(|_| rng.random()));
        let m = Mask::<i32, 16>::from_long(rng.random());
        let round_trip = v.compress(&m).expand(&m);
        for i in 0..16 {
            let expected = if m.lane_is_set(i).unwrap() {
                v.lane(i).unwrap()
            } else {
                0
            };
            assert_eq!(round_trip.lane(i).unwrap(), expected);
        }
        assert_eq!(m.compress().true_count(), m.true_count());
        assert_eq!(
            v.compress(&m).compress(&m.compress()),
            v.compress(&m)
        );
    }
}

#[test_log::test]
fn test_select_from_pair_indexes_concatenation() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..100 {
        let v1: Vector<i32, 8> = Vector::from_array(std::array::from_fn(|_| rng.random()));
        let v2: Vector<i32, 8> = Vector::from_array(std::array::from_fn(|_| rng.random()));
        let idx: Vector<i32, 8> = Vector::from_array(std::array::from_fn(|_| rng.random_range(-100..100)));
        let both: Vec<i32> = v1.to_array().into_iter().chain(v2.to_array()).collect();

        let selected = idx.select_from_pair(&v1, &v2);
        for i in 0..8 {
            let k = idx.lane(i).unwrap().rem_euclid(16) as usize;
            assert_eq!(selected.lane(i).unwrap(), both[k]);
        }
    }
}

#[test_log::test]
fn test_slice_unslice_round_trip() {
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..100 {
        let v: Vector<i64, 4> = Vector::from_array(std::array::from_fn(|_| rng.random()));
        let w: Vector<i64, 4> = Vector::from_array(std::array::from_fn(|_| rng.random()));
        let origin = rng.random_range(0..=4);
        let lo = v.unslice(origin, &w, 0).unwrap();
        let hi = v.unslice(origin, &w, 1).unwrap();
        assert_eq!(lo.slice(origin, &hi).unwrap(), v);
    }
}
