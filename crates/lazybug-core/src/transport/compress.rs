//! LZ4 payload compression
//!
//! Payload layout: 4-byte little-endian uncompressed length, then one LZ4
//! block. The output buffer is sized from the encoder's worst-case bound, so
//! compression never truncates; an optional limit rejects oversized output.

use lz4_flex::block::{compress_into, decompress_size_prepended, get_maximum_output_size};

use crate::error::{Error, Result};

/// Bytes used by the uncompressed-length prefix
pub const SIZE_PREFIX_LEN: usize = 4;

/// Compress stage: encode `input` into a freshly allocated payload.
///
/// Fails if the input is too large to describe in the prefix, if the encoder
/// writes nothing, or if the result is larger than `max_payload_bytes`.
pub fn compress_payload(input: &[u8], max_payload_bytes: Option<usize>) -> Result<Vec<u8>> {
    let prefix = u32::try_from(input.len()).map_err(|_| {
        Error::Compression(format!(
            "payload of {} bytes exceeds the 4 GiB frame limit",
            input.len()
        ))
    })?;

    let mut buffer = vec![0u8; SIZE_PREFIX_LEN + get_maximum_output_size(input.len())];
    buffer[..SIZE_PREFIX_LEN].copy_from_slice(&prefix.to_le_bytes());

    let written = compress_into(input, &mut buffer[SIZE_PREFIX_LEN..])
        .map_err(|error| Error::Compression(error.to_string()))?;
    if written == 0 {
        return Err(Error::Compression(
            "encoder produced no output".to_string(),
        ));
    }
    buffer.truncate(SIZE_PREFIX_LEN + written);

    if let Some(limit) = max_payload_bytes {
        if buffer.len() > limit {
            return Err(Error::Compression(format!(
                "compressed payload is {} bytes, limit is {limit}",
                buffer.len()
            )));
        }
    }

    tracing::debug!(
        "Compressed feedback payload from {} to {} bytes",
        input.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Inverse of [`compress_payload`].
pub fn decompress_payload(payload: &[u8]) -> Result<Vec<u8>> {
    decompress_size_prepended(payload).map_err(|error| Error::Compression(error.to_string()))
}
