use thiserror::Error;

#[derive(Error, Debug)]
pub enum CutoutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),

    #[error("Missing required keyword: {0}")]
    MissingKeyword(String),

    #[error("Unsupported BITPIX: {0}")]
    UnsupportedBitpix(i64),

    #[error("HDU index {index} out of range (total: {total})")]
    HduIndexOutOfRange { index: usize, total: usize },

    #[error("Science and error planes differ: {science:?} vs {error:?}")]
    PlaneMismatch {
        science: (usize, usize),
        error: (usize, usize),
    },

    #[error("Invalid WCS: {0}")]
    InvalidWcs(String),

    #[error("Malformed mosaic filename: {0}")]
    MalformedFilename(String),

    #[error("Cutout does not overlap the mosaic")]
    NoOverlap,

    #[error("Remote listing failed: {0}")]
    RemoteListing(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CutoutError>;
