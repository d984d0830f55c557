use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;

use crate::consts::{FITS_BLOCK_SIZE, FITS_CARD_SIZE};
use crate::error::Result;
use crate::io::fits::{padded_len, FitsHeader, HeaderValue};

/// Keywords the writer emits itself; copies from a source header are dropped.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "SIMPLE", "XTENSION", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "NAXIS3", "EXTEND", "PCOUNT",
    "GCOUNT", "BSCALE", "BZERO", "BLANK", "END",
];

/// Writes a FITS file with an empty primary HDU followed by f32 image extensions.
pub struct FitsWriter {
    writer: BufWriter<File>,
    extensions_written: usize,
}

impl FitsWriter {
    /// Create a new FITS file and write the empty primary HDU.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let cards = vec![
            format_card("SIMPLE", &HeaderValue::Bool(true)),
            format_card("BITPIX", &HeaderValue::Int(8)),
            format_card("NAXIS", &HeaderValue::Int(0)),
            format_card("EXTEND", &HeaderValue::Bool(true)),
        ];
        write_header_block(&mut writer, &cards)?;

        Ok(Self {
            writer,
            extensions_written: 0,
        })
    }

    /// Append an IMAGE extension holding `data` (BITPIX = -32).
    ///
    /// Non-structural cards of `extra` (WCS, EXTNAME, ...) are copied after the
    /// mandatory keywords.
    pub fn write_image(&mut self, data: &Array2<f32>, extra: &FitsHeader) -> Result<()> {
        let (height, width) = data.dim();

        let mut cards = vec![
            format_card("XTENSION", &HeaderValue::Str("IMAGE".into())),
            format_card("BITPIX", &HeaderValue::Int(-32)),
            format_card("NAXIS", &HeaderValue::Int(2)),
            format_card("NAXIS1", &HeaderValue::Int(width as i64)),
            format_card("NAXIS2", &HeaderValue::Int(height as i64)),
            format_card("PCOUNT", &HeaderValue::Int(0)),
            format_card("GCOUNT", &HeaderValue::Int(1)),
        ];
        cards.extend(
            extra
                .cards()
                .filter(|(k, _)| !STRUCTURAL_KEYWORDS.contains(k))
                .map(|(k, v)| format_card(k, v)),
        );
        write_header_block(&mut self.writer, &cards)?;

        // Row-major iteration matches FITS order: NAXIS1 varies fastest.
        let mut bytes = Vec::with_capacity(padded_len(width * height * 4));
        for &v in data.iter() {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.resize(padded_len(bytes.len()), 0);
        self.writer.write_all(&bytes)?;

        self.extensions_written += 1;
        Ok(())
    }

    pub fn extensions_written(&self) -> usize {
        self.extensions_written
    }

    /// Flush and finalize the file.
    pub fn finalize(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn write_header_block(w: &mut impl Write, cards: &[String]) -> Result<()> {
    let mut block = String::with_capacity(padded_len((cards.len() + 1) * FITS_CARD_SIZE));
    for card in cards {
        block.push_str(card);
    }
    block.push_str(&format!("{:<80}", "END"));
    while block.len() % FITS_BLOCK_SIZE != 0 {
        block.push(' ');
    }
    w.write_all(block.as_bytes())?;
    Ok(())
}

/// Format one fixed-format 80-column card.
pub fn format_card(keyword: &str, value: &HeaderValue) -> String {
    let value = match value {
        HeaderValue::Bool(b) => format!("{:>20}", if *b { "T" } else { "F" }),
        HeaderValue::Int(i) => format!("{i:>20}"),
        HeaderValue::Float(f) => format!("{:>20}", format_float(*f)),
        HeaderValue::Str(s) => format!("'{:<8}'", s.replace('\'', "''")),
    };
    let mut card = format!("{keyword:<8}= {value}");
    card.truncate(FITS_CARD_SIZE);
    format!("{card:<80}")
}

fn format_float(f: f64) -> String {
    // Fixed-format values must fit in columns 11-30.
    (0..=15)
        .rev()
        .map(|precision| format!("{f:.precision$E}"))
        .find(|s| s.len() <= 20)
        .unwrap_or_else(|| format!("{f:E}"))
}
