use std::path::Path;

use cosmoweb_core::archive::{
    archive_url, parse_listing, script_contents, write_download_script, ArchiveClient, FetchMode,
    FileQuery,
};
use cosmoweb_core::error::CutoutError;

const LISTING: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html>
 <head><title>Index of /cosmosweb-public/DR0.5/NIRCam/Apr23</title></head>
 <body>
<h1>Index of /cosmosweb-public/DR0.5/NIRCam/Apr23</h1>
<table>
<tr><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th><th><a href="?C=S;O=A">Size</a></th></tr>
<tr><td><a href="/cosmosweb-public/DR0.5/NIRCam/">Parent Directory</a></td></tr>
<tr><td><a href="mosaic_nircam_f444w_COSMOS-Web_30mas_A1_v0_5_i2d.fits">mosaic_nircam_f444w_COSMOS-Web_30mas_A1_v0_5_i2d.fits</a></td><td>2023-04-20 11:02</td><td>3.1G</td></tr>
<tr><td><a href="mosaic_nircam_f444w_COSMOS-Web_30mas_A10_v0_5_i2d.fits">mosaic_nircam_f444w_COSMOS-Web_30mas_A10_v0_5_i2d.fits</a></td><td>2023-04-20 11:04</td><td>3.1G</td></tr>
<tr><td><a href="./mosaic_nircam_f444w_COSMOS-Web_60mas_A1_v0_5_i2d.fits">mosaic_nircam_f444w_COSMOS-Web_60mas_A1_v0_5_i2d.fits</a></td><td>2023-04-20 11:07</td><td>0.8G</td></tr>
<tr><td><a href="mosaic_nircam_f150w_COSMOS-Web_30mas_A2_v0_5_i2d.fits">mosaic_nircam_f150w_COSMOS-Web_30mas_A2_v0_5_i2d.fits</a></td><td>2023-04-20 11:09</td><td>3.0G</td></tr>
<tr><td><a href="old/">old/</a></td></tr>
</table>
</body></html>
"#;

fn listed() -> Vec<String> {
    parse_listing(LISTING)
}

#[test]
fn test_archive_url_for_release() {
    assert_eq!(
        archive_url("0.5"),
        "https://exchg.calet.org/cosmosweb-public/DR0.5/NIRCam/Apr23/"
    );
    let client = ArchiveClient::with_root_url("http://mirror.local/cw/").unwrap();
    assert_eq!(client.release_url("1.0"), "http://mirror.local/cw/DR1.0/NIRCam/Apr23/");
}

#[test]
fn test_listing_skips_navigation_and_directories() {
    assert_eq!(
        listed(),
        [
            "mosaic_nircam_f444w_COSMOS-Web_30mas_A1_v0_5_i2d.fits",
            "mosaic_nircam_f444w_COSMOS-Web_30mas_A10_v0_5_i2d.fits",
            "mosaic_nircam_f444w_COSMOS-Web_60mas_A1_v0_5_i2d.fits",
            "mosaic_nircam_f150w_COSMOS-Web_30mas_A2_v0_5_i2d.fits",
        ]
    );
}

#[test]
fn test_listing_without_files_is_empty() {
    assert!(parse_listing("").is_empty());
    assert!(parse_listing("<html><body>Forbidden</body></html>").is_empty());
}

#[test]
fn test_query_without_criteria_keeps_everything() {
    assert_eq!(FileQuery::new().apply(listed()), listed());
}

#[test]
fn test_query_criteria_combine() {
    let names = FileQuery::new().filter("f444w").apply(listed());
    assert_eq!(names.len(), 3);

    let names = FileQuery::new()
        .filter("f444w")
        .pixel_scale_mas(30)
        .apply(listed());
    assert_eq!(names.len(), 2);

    // Substring match: A1 also selects A10.
    let names = FileQuery::new().pixel_scale_mas(30).tile("A1").apply(listed());
    assert_eq!(
        names,
        [
            "mosaic_nircam_f444w_COSMOS-Web_30mas_A1_v0_5_i2d.fits",
            "mosaic_nircam_f444w_COSMOS-Web_30mas_A10_v0_5_i2d.fits",
        ]
    );

    assert!(FileQuery::new().filter("f770w").apply(listed()).is_empty());
}

#[test]
fn test_script_has_one_wget_per_file() {
    let names = vec!["a.fits".to_string(), "b.fits".to_string()];
    let script = script_contents("https://host/DR0.5/NIRCam/Apr23/", &names, Path::new("/data/cw"));
    assert_eq!(
        script,
        "#!/bin/bash\n\
         wget https://host/DR0.5/NIRCam/Apr23/a.fits -P /data/cw\n\
         wget https://host/DR0.5/NIRCam/Apr23/b.fits -P /data/cw\n"
    );
    assert_eq!(script_contents("https://host/", &[], Path::new("/x")), "#!/bin/bash\n");
}

#[test]
fn test_script_written_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("mosaics").join("f444w");
    let names = vec!["a.fits".to_string()];

    let path = write_download_script("https://host/", &names, &dest).unwrap();
    assert_eq!(path, dest.join("download_COSMOSWeb_imgs.sh"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("#!/bin/bash\n"));
    assert!(contents.contains("wget https://host/a.fits -P "));
}

#[test]
fn test_fetch_in_script_mode_does_not_download() {
    let dir = tempfile::tempdir().unwrap();
    let client = ArchiveClient::with_root_url("http://127.0.0.1:9").unwrap();
    let names = vec!["x.fits".to_string(), "y.fits".to_string()];

    let mut calls = 0;
    let summary = client
        .fetch("0.5", &names, dir.path(), FetchMode::Script, |_, _| calls += 1)
        .unwrap();

    assert_eq!(calls, 0);
    assert!(summary.downloaded.is_empty());
    assert!(summary.failed.is_empty());
    let script = std::fs::read_to_string(summary.script.unwrap()).unwrap();
    assert!(script.contains("wget http://127.0.0.1:9/DR0.5/NIRCam/Apr23/x.fits"));
    assert!(!dir.path().join("x.fits").exists());
}

#[test]
fn test_unreachable_listing_is_an_error() {
    let client = ArchiveClient::with_root_url("http://127.0.0.1:9").unwrap();
    let result = client.list_remote_files("0.5", &FileQuery::new());
    assert!(matches!(result, Err(CutoutError::RemoteListing(_))));
}

#[test]
fn test_failed_downloads_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let client = ArchiveClient::with_root_url("http://127.0.0.1:9").unwrap();
    let names = vec!["x.fits".to_string(), "y.fits".to_string()];

    let mut progress = Vec::new();
    let summary = client
        .fetch("0.5", &names, dir.path(), FetchMode::Download, |done, total| {
            progress.push((done, total))
        })
        .unwrap();

    assert_eq!(summary.failed, names);
    assert!(summary.downloaded.is_empty());
    assert_eq!(summary.bytes, 0);
    assert_eq!(progress, [(1, 2), (2, 2)]);
    assert!(!dir.path().join("x.fits").exists());
    assert!(!dir.path().join("x.fits.part").exists());
}
