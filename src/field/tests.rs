use super::io::{read_pfm, write_pfm};
use super::{DispField, MaskField, Window};

fn ramp_field(w: usize, h: usize) -> DispField {
    let mut f = DispField::new(w, h);
    for y in 0..h {
        for x in 0..w {
            f.set(x, y, (y * w + x) as f32 * 0.25);
        }
    }
    f
}

#[test]
fn crop_extracts_expected_window() {
    let f = ramp_field(8, 8);
    let win = Window { x: 2, y: 3, size: 4 };
    let c = f.crop(win).expect("crop inside the field");
    assert_eq!((c.w, c.h), (4, 4));
    assert_eq!(c.get(0, 0), f.get(2, 3));
    assert_eq!(c.get(3, 3), f.get(5, 6));
}

#[test]
fn crop_outside_field_is_rejected() {
    let f = ramp_field(8, 8);
    let win = Window { x: 6, y: 6, size: 4 };
    assert!(f.crop(win).is_err(), "window past the border must fail");
}

#[test]
fn finite_min_max_skips_nan() {
    let mut f = ramp_field(4, 4);
    f.set(0, 0, f32::NAN);
    f.set(3, 3, f32::NAN);
    let (lo, hi) = f.finite_min_max().expect("finite pixels remain");
    assert_eq!(lo, 0.25);
    assert_eq!(hi, 14.0 * 0.25);

    let all_nan = DispField::filled(2, 2, f32::NAN);
    assert!(all_nan.finite_min_max().is_none());
}

#[test]
fn sub_requires_matching_shapes() {
    let a = ramp_field(4, 4);
    let b = ramp_field(4, 5);
    assert!(a.sub(&b).is_err());
}

#[test]
fn mask_union_and_intersection() {
    let mut a = MaskField::new(3, 1);
    let mut b = MaskField::new(3, 1);
    a.set(0, 0, true);
    b.set(1, 0, true);
    b.set(0, 0, true);
    let u = a.union(&b).unwrap();
    let i = a.intersect(&b).unwrap();
    assert_eq!(u.count(), 2);
    assert_eq!(i.count(), 1);
    assert!(i.get(0, 0));
    assert_eq!(u.negate().count(), 1);
}

#[test]
fn pfm_round_trip_preserves_values_and_nan() {
    let mut f = ramp_field(5, 3);
    f.set(2, 1, f32::NAN);
    let path = std::env::temp_dir().join("depth_figures_pfm_round_trip.pfm");
    write_pfm(&f, &path).expect("write pfm");
    let back = read_pfm(&path).expect("read pfm");
    assert_eq!((back.w, back.h), (5, 3));
    for y in 0..3 {
        for x in 0..5 {
            let a = f.get(x, y);
            let b = back.get(x, y);
            if a.is_nan() {
                assert!(b.is_nan(), "NaN lost at ({x}, {y})");
            } else {
                assert_eq!(a, b, "value changed at ({x}, {y})");
            }
        }
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn pfm_rejects_color_maps() {
    let bytes = b"PF\n2 2\n-1.0\n".to_vec();
    let path = std::env::temp_dir().join("depth_figures_pfm_color.pfm");
    std::fs::write(&path, bytes).unwrap();
    assert!(read_pfm(&path).is_err(), "three-channel PF must be rejected");
    let _ = std::fs::remove_file(&path);
}
