//! Input reading for the command-line surface.
//!
//! The analytic modules take text and never touch the filesystem; this
//! module is where bytes come in:
//!
//! - **stdin**: the `-` path convention reads standard input.
//! - **Encoding**: input is decoded via `encoding_rs`, defaulting to UTF-8.
//!   A leading byte-order mark is stripped.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading CSV from stdin")?;
    } else {
        BufReader::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?)
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

/// Reads the whole input (file or `-` for stdin) and decodes it to text.
pub fn read_input_text(path: &Path, encoding_label: Option<&str>) -> Result<String> {
    let encoding = resolve_encoding(encoding_label)?;
    let bytes = read_all(path)?;
    decode_bytes(&bytes, encoding).with_context(|| format!("Decoding {path:?}"))
}
