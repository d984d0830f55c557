mod common;

use cosmoweb_core::config::SurveyConfig;
use cosmoweb_core::error::CutoutError;
use cosmoweb_core::tile::{
    mosaic_file_name, parse_mosaic_file_name, parse_tile_id, Footprint, LocalMosaicStore,
    MosaicFileName, TileSource,
};

use common::{mosaic_dir, ramp, tan_wcs, write_tile, FIELD_CENTRE, SCALE_30MAS_DEG};

#[test]
fn test_file_name_layout() {
    assert_eq!(
        mosaic_file_name("F444W", 30, "A7"),
        "mosaic_nircam_F444W_COSMOS-Web_30mas_A7_v0_5_i2d.fits"
    );
    assert_eq!(
        MosaicFileName::new("F115W", 60, "B3").to_string(),
        "mosaic_nircam_F115W_COSMOS-Web_60mas_B3_v0_5_i2d.fits"
    );
}

#[test]
fn test_tile_id_is_sixth_token() {
    let name = "mosaic_nircam_F444W_COSMOS-Web_30mas_A17_v0_5_i2d.fits";
    assert_eq!(parse_tile_id(name).unwrap(), "A17");
    assert_eq!(parse_tile_id(&format!("/data/cosmos/{name}")).unwrap(), "A17");

    let parsed = parse_mosaic_file_name(name).unwrap();
    assert_eq!(parsed, MosaicFileName::new("F444W", 30, "A17"));
}

#[test]
fn test_short_names_are_malformed() {
    assert!(matches!(
        parse_tile_id("mosaic_nircam_F444W.fits"),
        Err(CutoutError::MalformedFilename(_))
    ));
    assert!(matches!(
        parse_tile_id("a_b_c_d_e__f"),
        Err(CutoutError::MalformedFilename(_))
    ));
}

#[test]
fn test_full_parse_checks_fixed_tokens() {
    for bad in [
        "mosaic_miri_F444W_COSMOS-Web_30mas_A1_v0_5_i2d.fits",
        "mosaic_nircam_F444W_PRIMER_30mas_A1_v0_5_i2d.fits",
        "mosaic_nircam_F444W_COSMOS-Web_30arcsec_A1_v0_5_i2d.fits",
        "mosaic_nircam_F444W_COSMOS-Web_30mas_A1_v0_4_i2d.fits",
        "mosaic_nircam_F444W_COSMOS-Web_30mas_A1_v0_5_i2d.fits.gz",
    ] {
        assert!(
            matches!(parse_mosaic_file_name(bad), Err(CutoutError::MalformedFilename(_))),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn test_tile_files_filter_and_sort() {
    let dir = tempfile::tempdir().unwrap();
    let config = SurveyConfig::new(dir.path());
    let tiles = mosaic_dir(&config);
    let wcs = tan_wcs([1.0, 1.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let data = ramp(8, 8);

    for tile in ["A2", "A10", "A1", "B4"] {
        write_tile(&tiles, "f444w", 30, tile, &wcs, &data);
    }
    write_tile(&tiles, "f150w", 30, "A3", &wcs, &data);
    write_tile(&tiles, "f444w", 60, "A5", &wcs, &data);
    std::fs::write(tiles.join("README.txt"), "mosaics").unwrap();

    // Full file names sort "_A10_" before "_A1_" ('0' < '_').
    let store = LocalMosaicStore::new(&config);
    let ids: Vec<String> = store
        .tile_files("f444w")
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, ["A10", "A1", "A2"]);

    let footprints = store.footprints("F444W").unwrap();
    let ids: Vec<&str> = footprints.iter().map(|f| f.id()).collect();
    assert_eq!(ids, ["A10", "A1", "A2"]);
    assert!(footprints.iter().all(|f| f.width() == 8 && f.height() == 8));

    let mut coarse = config.clone();
    coarse.pixel_scale_mas = 60;
    let store = LocalMosaicStore::new(&coarse);
    let (id, path) = store.tile_files("f444w").unwrap().remove(0);
    assert_eq!(id, "A5");
    assert_eq!(path, store.tile_path("F444W", "A5"));
}

#[test]
fn test_mosaic_dir_is_scoped_by_release() {
    let mut config = SurveyConfig::new("/data/cosmos");
    assert_eq!(
        config.mosaic_dir(),
        std::path::PathBuf::from("/data/cosmos/dr0.5/NIRCam/Apr23")
    );
    config.release = "1.0".to_string();
    let store = LocalMosaicStore::new(&config);
    assert_eq!(store.dir(), std::path::Path::new("/data/cosmos/dr1.0/NIRCam/Apr23"));
    assert_eq!(
        store.tile_path("F444W", "A3"),
        store.dir().join("mosaic_nircam_f444w_COSMOS-Web_30mas_A3_v0_5_i2d.fits")
    );
}

#[test]
fn test_missing_root_has_no_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalMosaicStore::new(&SurveyConfig::new(dir.path().join("absent")));
    assert!(store.tile_files("F444W").unwrap().is_empty());
    assert!(store.footprints("F444W").unwrap().is_empty());
}

#[test]
fn test_load_tile_reads_both_planes() {
    let dir = tempfile::tempdir().unwrap();
    let config = SurveyConfig::new(dir.path());
    let wcs = tan_wcs([3.0, 4.0], FIELD_CENTRE, SCALE_30MAS_DEG);
    let data = ramp(6, 9);
    write_tile(&mosaic_dir(&config), "f277w", 30, "A4", &wcs, &data);

    let store = LocalMosaicStore::new(&config);
    let tile = store.load_tile("F277W", "A4").unwrap();
    assert_eq!(tile.id, "A4");
    assert_eq!(tile.science, data);
    assert_eq!(tile.error, data.mapv(|v| v / 10.0));
    assert_eq!(tile.wcs.reference_pixel(), (2.0, 3.0));

    let footprint = tile.footprint();
    assert_eq!((footprint.width, footprint.height), (9, 6));

    assert!(matches!(
        store.load_tile("F277W", "A5"),
        Err(CutoutError::Io(_))
    ));
}
