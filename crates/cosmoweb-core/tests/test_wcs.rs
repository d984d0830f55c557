mod common;

use approx::assert_relative_eq;
use cosmoweb_core::error::CutoutError;
use cosmoweb_core::io::fits::{FitsHeader, HeaderValue};
use cosmoweb_core::sky::SkyPosition;
use cosmoweb_core::wcs::TanWcs;

use common::{tan_wcs, FIELD_CENTRE, SCALE_30MAS_DEG};

fn header_with(cards: &[(&str, HeaderValue)]) -> FitsHeader {
    let mut header = FitsHeader::new();
    for (k, v) in cards {
        header.set(k, v.clone());
    }
    header
}

fn tan_cards() -> Vec<(&'static str, HeaderValue)> {
    vec![
        ("CTYPE1", HeaderValue::Str("RA---TAN".into())),
        ("CTYPE2", HeaderValue::Str("DEC--TAN".into())),
        ("CRPIX1", HeaderValue::Float(101.0)),
        ("CRPIX2", HeaderValue::Float(51.0)),
        ("CRVAL1", HeaderValue::Float(FIELD_CENTRE.ra_deg)),
        ("CRVAL2", HeaderValue::Float(FIELD_CENTRE.dec_deg)),
    ]
}

#[test]
fn test_reference_pixel_maps_to_reference_position() {
    let wcs = tan_wcs([101.0, 51.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let (x, y) = wcs.world_to_pixel(FIELD_CENTRE).unwrap();
    assert_eq!((x, y), (100.0, 50.0));

    let pos = wcs.pixel_to_world(100.0, 50.0);
    assert_relative_eq!(pos.ra_deg, FIELD_CENTRE.ra_deg, epsilon = 1e-12);
    assert_relative_eq!(pos.dec_deg, FIELD_CENTRE.dec_deg, epsilon = 1e-12);
}

#[test]
fn test_pixel_world_round_trip() {
    let wcs = tan_wcs([2000.5, 1500.5], FIELD_CENTRE, SCALE_30MAS_DEG);
    for &(x, y) in &[(0.0, 0.0), (3999.0, 2999.0), (123.4, 2876.9), (-250.0, 40.0)] {
        let pos = wcs.pixel_to_world(x, y);
        let (bx, by) = wcs.world_to_pixel(pos).unwrap();
        assert_relative_eq!(bx, x, epsilon = 1e-6);
        assert_relative_eq!(by, y, epsilon = 1e-6);
    }
}

#[test]
fn test_east_is_left() {
    let wcs = tan_wcs([1.0, 1.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let east = SkyPosition::new(FIELD_CENTRE.ra_deg + 0.001, FIELD_CENTRE.dec_deg);
    let north = SkyPosition::new(FIELD_CENTRE.ra_deg, FIELD_CENTRE.dec_deg + 0.001);
    assert!(wcs.world_to_pixel(east).unwrap().0 < 0.0);
    assert!(wcs.world_to_pixel(north).unwrap().1 > 0.0);
}

#[test]
fn test_far_side_of_sky_is_not_projectable() {
    let wcs = tan_wcs([1.0, 1.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let opposite = SkyPosition::new(FIELD_CENTRE.ra_deg - 180.0, -FIELD_CENTRE.dec_deg);
    assert!(wcs.world_to_pixel(opposite).is_none());
}

#[test]
fn test_pixel_scales_from_cd() {
    let wcs = tan_wcs([1.0, 1.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let (sx, sy) = wcs.pixel_scales();
    assert_relative_eq!(sx, SCALE_30MAS_DEG, max_relative = 1e-12);
    assert_relative_eq!(sy, SCALE_30MAS_DEG, max_relative = 1e-12);
}

#[test]
fn test_from_header_with_cd_matrix() {
    let mut cards = tan_cards();
    cards.push(("CD1_1", HeaderValue::Float(-SCALE_30MAS_DEG)));
    cards.push(("CD2_2", HeaderValue::Float(SCALE_30MAS_DEG)));
    let wcs = TanWcs::from_header(&header_with(&cards)).unwrap();
    assert_eq!(wcs.cd(), [[-SCALE_30MAS_DEG, 0.0], [0.0, SCALE_30MAS_DEG]]);
    assert_eq!(wcs.reference_pixel(), (100.0, 50.0));
}

#[test]
fn test_from_header_with_cdelt_and_pc() {
    let mut cards = tan_cards();
    cards.push(("CDELT1", HeaderValue::Float(-2.0e-5)));
    cards.push(("CDELT2", HeaderValue::Float(2.0e-5)));
    cards.push(("PC1_2", HeaderValue::Float(0.5)));
    let wcs = TanWcs::from_header(&header_with(&cards)).unwrap();
    assert_eq!(wcs.cd(), [[-2.0e-5, -1.0e-5], [0.0, 2.0e-5]]);
}

#[test]
fn test_from_header_rejects_other_projections() {
    let mut cards = tan_cards();
    cards[0].1 = HeaderValue::Str("RA---SIN".into());
    cards.push(("CD1_1", HeaderValue::Float(-SCALE_30MAS_DEG)));
    cards.push(("CD2_2", HeaderValue::Float(SCALE_30MAS_DEG)));
    assert!(matches!(
        TanWcs::from_header(&header_with(&cards)),
        Err(CutoutError::InvalidWcs(_))
    ));
}

#[test]
fn test_from_header_requires_scale() {
    assert!(matches!(
        TanWcs::from_header(&header_with(&tan_cards())),
        Err(CutoutError::MissingKeyword(k)) if k == "CDELT1"
    ));
}

#[test]
fn test_singular_cd_rejected() {
    let result = TanWcs::new([1.0, 1.0], FIELD_CENTRE, [[1.0, 1.0], [1.0, 1.0]]);
    assert!(matches!(result, Err(CutoutError::InvalidWcs(_))));
}

#[test]
fn test_shifted_moves_reference_pixel() {
    let wcs = tan_wcs([101.0, 51.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let shifted = wcs.shifted((90, 40));
    assert_eq!(shifted.reference_pixel(), (10.0, 10.0));
    let (x, y) = shifted.world_to_pixel(FIELD_CENTRE).unwrap();
    assert_eq!((x, y), (10.0, 10.0));
}
