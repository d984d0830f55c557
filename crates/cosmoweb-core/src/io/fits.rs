use std::fs::File;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use memmap2::Mmap;
use ndarray::Array2;

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use crate::error::{CutoutError, Result};

/// A parsed header card value.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Keyword/value cards of one header, in file order.
///
/// Commentary cards (COMMENT, HISTORY, blank keywords) are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitsHeader {
    cards: Vec<(String, HeaderValue)>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }

    pub fn require_f64(&self, key: &str) -> Result<f64> {
        self.get_f64(key)
            .ok_or_else(|| CutoutError::MissingKeyword(key.to_string()))
    }

    pub fn require_i64(&self, key: &str) -> Result<i64> {
        self.get_i64(key)
            .ok_or_else(|| CutoutError::MissingKeyword(key.to_string()))
    }

    /// Insert or replace a card, keeping the position of an existing one.
    pub fn set(&mut self, key: &str, value: HeaderValue) {
        if let Some(slot) = self.cards.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.cards.push((key.to_string(), value));
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Axis lengths `NAXIS1..NAXISn`, fastest-varying first.
    pub fn axes(&self) -> Result<Vec<usize>> {
        let naxis = self.require_i64("NAXIS")?;
        (1..=naxis)
            .map(|i| {
                let len = self.require_i64(&format!("NAXIS{i}"))?;
                usize::try_from(len)
                    .map_err(|_| CutoutError::InvalidFits(format!("NAXIS{i} = {len}")))
            })
            .collect()
    }

    /// Byte length of the data unit, before padding.
    ///
    /// Primary and IMAGE HDUs must have PCOUNT = 0 and GCOUNT = 1.
    pub fn data_byte_len(&self) -> Result<usize> {
        let axes = self.axes()?;
        if axes.is_empty() {
            return Ok(0);
        }
        let bitpix = self.require_i64("BITPIX")?;
        let bytes_per_sample = (bitpix.unsigned_abs() / 8) as usize;
        let pcount = self.count_keyword("PCOUNT", 0)?;
        let gcount = self.count_keyword("GCOUNT", 1)?;
        let is_image = matches!(self.get_str("XTENSION"), None | Some("IMAGE"));
        if is_image && (pcount != 0 || gcount != 1) {
            return Err(CutoutError::InvalidFits(format!(
                "image HDU with PCOUNT = {pcount}, GCOUNT = {gcount}"
            )));
        }

        let overflow = || CutoutError::InvalidFits(format!("data unit size overflows: {axes:?}"));
        let samples = axes
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(overflow)?;
        samples
            .checked_add(pcount)
            .and_then(|n| n.checked_mul(gcount))
            .and_then(|n| n.checked_mul(bytes_per_sample))
            .ok_or_else(overflow)
    }

    /// Non-negative integer keyword, `default` when absent.
    fn count_keyword(&self, key: &str, default: usize) -> Result<usize> {
        match self.get_i64(key) {
            None => Ok(default),
            Some(v) => usize::try_from(v)
                .map_err(|_| CutoutError::InvalidFits(format!("{key} = {v}"))),
        }
    }
}

#[derive(Clone, Debug)]
struct HduEntry {
    header: FitsHeader,
    data_offset: usize,
    data_len: usize,
}

/// Memory-mapped FITS reader.
///
/// Opening the file parses every header; data units are decoded only on
/// request, so reading the WCS of a large mosaic touches just its header pages.
pub struct FitsReader {
    mmap: Mmap,
    hdus: Vec<HduEntry>,
}

impl FitsReader {
    /// Open a FITS file and index its header-data units.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let hdus = index_hdus(&mmap)?;
        Ok(Self { mmap, hdus })
    }

    pub fn hdu_count(&self) -> usize {
        self.hdus.len()
    }

    fn entry(&self, index: usize) -> Result<&HduEntry> {
        self.hdus.get(index).ok_or(CutoutError::HduIndexOutOfRange {
            index,
            total: self.hdus.len(),
        })
    }

    pub fn header(&self, index: usize) -> Result<&FitsHeader> {
        Ok(&self.entry(index)?.header)
    }

    /// Image shape as `(height, width)`.
    ///
    /// Trailing degenerate axes (length 1) are accepted.
    pub fn image_shape(&self, index: usize) -> Result<(usize, usize)> {
        image_shape(&self.entry(index)?.header)
    }

    /// Decode a 2D image HDU to f32, applying BSCALE/BZERO.
    ///
    /// Integer samples equal to BLANK become NaN.
    pub fn read_image(&self, index: usize) -> Result<Array2<f32>> {
        let entry = self.entry(index)?;
        let (height, width) = image_shape(&entry.header)?;
        let bitpix = entry.header.require_i64("BITPIX")?;
        let bscale = entry.header.get_f64("BSCALE").unwrap_or(1.0);
        let bzero = entry.header.get_f64("BZERO").unwrap_or(0.0);
        let blank = entry.header.get_i64("BLANK");

        let count = width * height;
        let bytes_per_sample = (bitpix.unsigned_abs() / 8) as usize;
        let byte_len = count * bytes_per_sample;
        if byte_len > entry.data_len {
            return Err(CutoutError::InvalidFits(format!(
                "HDU {index} holds {} data bytes, image needs {byte_len}",
                entry.data_len
            )));
        }
        let raw = self
            .mmap
            .get(entry.data_offset..entry.data_offset + byte_len)
            .ok_or_else(|| CutoutError::InvalidFits(format!("HDU {index} data out of range")))?;
        let pixels = decode_samples(raw, count, bitpix, bscale, bzero, blank)?;

        Array2::from_shape_vec((height, width), pixels)
            .map_err(|e| CutoutError::InvalidFits(e.to_string()))
    }
}

fn image_shape(header: &FitsHeader) -> Result<(usize, usize)> {
    let axes = header.axes()?;
    if axes.len() < 2 {
        return Err(CutoutError::InvalidFits(format!(
            "expected a 2D image, found NAXIS = {}",
            axes.len()
        )));
    }
    if axes[2..].iter().any(|&n| n != 1) {
        return Err(CutoutError::InvalidFits(format!(
            "image has non-degenerate axes beyond 2: {axes:?}"
        )));
    }
    let (width, height) = (axes[0], axes[1]);
    if width == 0 || height == 0 {
        return Err(CutoutError::InvalidFits(format!(
            "empty image: {width}x{height}"
        )));
    }
    Ok((height, width))
}

fn index_hdus(buf: &[u8]) -> Result<Vec<HduEntry>> {
    if buf.len() < FITS_BLOCK_SIZE || !buf.starts_with(b"SIMPLE  ") {
        return Err(CutoutError::InvalidFits(
            "missing SIMPLE card at file start".into(),
        ));
    }

    let mut hdus = Vec::new();
    let mut offset = 0;
    while offset + FITS_BLOCK_SIZE <= buf.len() {
        if hdus.is_empty() || buf[offset..].starts_with(b"XTENSION") {
            let (header, header_len) = parse_header(&buf[offset..])?;
            let data_offset = offset + header_len;
            let data_len = header.data_byte_len()?;
            if data_len > buf.len().saturating_sub(data_offset) {
                return Err(CutoutError::InvalidFits(format!(
                    "data unit truncated: expected {} bytes at offset {}, file is {} bytes",
                    data_len,
                    data_offset,
                    buf.len()
                )));
            }
            hdus.push(HduEntry {
                header,
                data_offset,
                data_len,
            });
            offset = data_offset + padded_len(data_len);
        } else {
            // Trailing special records are not HDUs.
            break;
        }
    }
    Ok(hdus)
}

/// Round a byte length up to a whole number of FITS blocks.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE
}

/// Parse header cards up to END. Returns the header and its padded byte length.
fn parse_header(buf: &[u8]) -> Result<(FitsHeader, usize)> {
    let mut header = FitsHeader::new();
    for (i, card) in buf.chunks_exact(FITS_CARD_SIZE).enumerate() {
        if !card.is_ascii() {
            return Err(CutoutError::InvalidFits("non-ASCII header card".into()));
        }
        let card = std::str::from_utf8(card)
            .map_err(|_| CutoutError::InvalidFits("non-ASCII header card".into()))?;
        let keyword = card[..8].trim_end();
        if keyword == "END" {
            return Ok((header, padded_len((i + 1) * FITS_CARD_SIZE)));
        }
        if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" {
            continue;
        }
        if &card[8..10] == "= " {
            let value = parse_value(&card[10..]).ok_or_else(|| {
                CutoutError::InvalidFits(format!("unparseable value for {keyword}"))
            })?;
            header.cards.push((keyword.to_string(), value));
        }
    }
    Err(CutoutError::InvalidFits("header has no END card".into()))
}

/// Parse the value field of a card (columns 11-80), dropping any comment.
fn parse_value(field: &str) -> Option<HeaderValue> {
    let field = field.trim_start();
    if let Some(rest) = field.strip_prefix('\'') {
        // '' inside a string is an escaped quote
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    return Some(HeaderValue::Str(out.trim_end().to_string()));
                }
            } else {
                out.push(c);
            }
        }
        return None;
    }

    let value = field.split('/').next().unwrap_or("").trim();
    match value {
        "T" => return Some(HeaderValue::Bool(true)),
        "F" => return Some(HeaderValue::Bool(false)),
        "" => return Some(HeaderValue::Str(String::new())),
        _ => {}
    }
    if let Ok(i) = value.parse::<i64>() {
        return Some(HeaderValue::Int(i));
    }
    value
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .ok()
        .map(HeaderValue::Float)
}

fn decode_samples(
    raw: &[u8],
    count: usize,
    bitpix: i64,
    bscale: f64,
    bzero: f64,
    blank: Option<i64>,
) -> Result<Vec<f32>> {
    let scale_int = |v: i64| -> f32 {
        if blank == Some(v) {
            f32::NAN
        } else {
            (v as f64 * bscale + bzero) as f32
        }
    };

    let pixels = match bitpix {
        8 => raw.iter().map(|&v| scale_int(v as i64)).collect(),
        16 => {
            let mut buf = vec![0i16; count];
            BigEndian::read_i16_into(raw, &mut buf);
            buf.into_iter().map(|v| scale_int(v as i64)).collect()
        }
        32 => {
            let mut buf = vec![0i32; count];
            BigEndian::read_i32_into(raw, &mut buf);
            buf.into_iter().map(|v| scale_int(v as i64)).collect()
        }
        64 => {
            let mut buf = vec![0i64; count];
            BigEndian::read_i64_into(raw, &mut buf);
            buf.into_iter().map(scale_int).collect()
        }
        -32 => {
            let mut buf = vec![0f32; count];
            BigEndian::read_f32_into(raw, &mut buf);
            if bscale == 1.0 && bzero == 0.0 {
                buf
            } else {
                buf.into_iter()
                    .map(|v| (v as f64 * bscale + bzero) as f32)
                    .collect()
            }
        }
        -64 => {
            let mut buf = vec![0f64; count];
            BigEndian::read_f64_into(raw, &mut buf);
            buf.into_iter()
                .map(|v| (v * bscale + bzero) as f32)
                .collect()
        }
        other => return Err(CutoutError::UnsupportedBitpix(other)),
    };
    Ok(pixels)
}
