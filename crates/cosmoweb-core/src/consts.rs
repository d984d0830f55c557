/// Size of a FITS logical record in bytes.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// Size of a single FITS header card in bytes.
pub const FITS_CARD_SIZE: usize = 80;

/// HDU holding the science plane and its calibration header.
pub const SCIENCE_HDU: usize = 1;

/// HDU holding the error plane.
pub const ERROR_HDU: usize = 2;

/// Default cutout edge length in arcseconds.
pub const DEFAULT_CUTOUT_ARCSEC: f64 = 3.0;

/// Default mosaic pixel scale in milliarcseconds.
pub const DEFAULT_PIXEL_SCALE_MAS: u32 = 30;

/// Default public data release.
pub const DEFAULT_RELEASE: &str = "0.5";

/// Path of the NIRCam mosaics below a release directory, locally and in the archive.
pub const RELEASE_SUBPATH: &str = "NIRCam/Apr23";

/// Root of the public COSMOS-Web archive.
pub const ARCHIVE_ROOT_URL: &str = "https://exchg.calet.org/cosmosweb-public";

/// Leading anchors of the archive directory listing that are navigation links.
pub const LISTING_NAV_ANCHORS: usize = 4;

/// File name of the generated batch download script.
pub const DOWNLOAD_SCRIPT_NAME: &str = "download_COSMOSWeb_imgs.sh";

/// Timeout for a single archive request in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 600;

/// Buffer size for streaming downloads to disk (64 KiB).
pub const DOWNLOAD_BUFFER_SIZE: usize = 64 * 1024;

/// Arcseconds per degree.
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Denominator guard for the gnomonic projection; points at or behind the
/// tangent plane cannot be projected.
pub const TAN_PROJECTION_EPSILON: f64 = 1e-12;

/// Determinant below which a CD matrix is treated as singular.
pub const SINGULAR_MATRIX_EPSILON: f64 = 1e-30;
