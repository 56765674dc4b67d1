//! zlib compression of framed object payloads

use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io::{Read, Write};

/// Compress `data` into a zlib stream
///
/// Fails with `Error::Compression` if the stream cannot be written or
/// finalized; the caller must then treat the object as not stored.
pub fn compress(data: &[u8]) -> Result<Bytes> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).map_err(Error::Compression)?;

    encoder
        .finish()
        .map(Bytes::from)
        .map_err(Error::Compression)
}

/// Inflate a zlib stream produced by [`compress`]
pub fn decompress(data: &[u8]) -> Result<Bytes> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut decompressed_content = Vec::new();
    decoder
        .read_to_end(&mut decompressed_content)
        .map_err(Error::Compression)?;

    Ok(Bytes::from(decompressed_content))
}
