//! On-disk format for saved bit arrays.
//!
//! A saved [`BitArray`](crate::BitArray) is a small headered image encoded
//! with bincode (fixed-width little-endian integers, so the layout is
//! deterministic):
//!
//! | offset | bytes | field |
//! |---|---|---|
//! | 0  | 4 | magic `b"BITA"` |
//! | 4  | 1 | format version |
//! | 5  | 1 | chunk width in bits |
//! | 6  | 8 | logical bit count |
//! | 14 | 8 | chunk count |
//! | 22 | n | chunk bytes |
//!
//! The logical bit count is stored explicitly because the chunk count alone
//! cannot recover a size that is not a multiple of the chunk width.
//!
//! The compressed flavor is the same image inside a standard gzip stream;
//! [`BitArrayImage::from_bytes`] tells the two apart by the gzip magic, so
//! readers need no out-of-band flag.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::bitarray::{chunk_mask, Chunk, BITS_PER_CHUNK};
use crate::error::{BitArrayError, Result};

/// Magic bytes opening every raw image
pub const MAGIC: [u8; 4] = *b"BITA";

/// Current format version
pub const FORMAT_VERSION: u8 = 1;

/// Magic bytes opening a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Serialized image of a bit array as written by
/// [`BitArray::save`](crate::BitArray::save).
///
/// Decoding validates the image structurally (magic, version, chunk width,
/// chunk count against the stored size, zeroed padding) before any of it
/// reaches a live container, so a corrupt file can never half-apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitArrayImage {
    magic: [u8; 4],
    version: u8,
    chunk_bits: u8,
    size: u64,
    chunks: Vec<Chunk>,
}

impl BitArrayImage {
    /// Build the image of a live container from its parts.
    pub(crate) fn new(size: usize, chunks: Vec<Chunk>) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            chunk_bits: BITS_PER_CHUNK as u8,
            size: size as u64,
            chunks,
        }
    }

    /// Encode to bytes, raw or inside a gzip container.
    pub fn to_bytes(&self, compressed: bool) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        if !compressed {
            return Ok(payload);
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&payload)?;
        Ok(encoder.finish()?)
    }

    /// Decode from bytes, detecting the container by magic.
    ///
    /// # Errors
    ///
    /// Returns [`BitArrayError::CorruptData`] for an unreadable gzip stream,
    /// an undecodable image, or any structural inconsistency.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            let mut decoder = GzDecoder::new(bytes);
            let mut payload = Vec::new();
            decoder.read_to_end(&mut payload).map_err(|e| {
                BitArrayError::CorruptData(format!("unreadable gzip container: {}", e))
            })?;
            Self::decode(&payload)
        } else {
            Self::decode(bytes)
        }
    }

    fn decode(payload: &[u8]) -> Result<Self> {
        let image: Self = bincode::deserialize(payload)
            .map_err(|e| BitArrayError::CorruptData(format!("undecodable image: {}", e)))?;
        image.validate()?;
        Ok(image)
    }

    fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(BitArrayError::CorruptData(format!(
                "bad magic {:02x?}",
                self.magic
            )));
        }
        if self.version != FORMAT_VERSION {
            return Err(BitArrayError::CorruptData(format!(
                "unsupported format version {}",
                self.version
            )));
        }
        if self.chunk_bits as usize != BITS_PER_CHUNK {
            return Err(BitArrayError::CorruptData(format!(
                "wrong chunk width: expected {} bits, found {}",
                BITS_PER_CHUNK, self.chunk_bits
            )));
        }
        if usize::try_from(self.size).is_err() {
            return Err(BitArrayError::CorruptData(format!(
                "size {} exceeds the addressable range",
                self.size
            )));
        }
        let expected = self.size.div_ceil(BITS_PER_CHUNK as u64);
        if self.chunks.len() as u64 != expected {
            return Err(BitArrayError::CorruptData(format!(
                "chunk count mismatch: size {} needs {} chunks, found {}",
                self.size,
                expected,
                self.chunks.len()
            )));
        }
        let tail_bits = (self.size % BITS_PER_CHUNK as u64) as usize;
        if tail_bits != 0 {
            if let Some(&last) = self.chunks.last() {
                if last & !chunk_mask(tail_bits) != 0 {
                    return Err(BitArrayError::CorruptData(
                        "nonzero padding bits past the logical size".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Get the logical bit count recorded in the image.
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Get the chunk bytes recorded in the image.
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Split into `(size, chunks)` for adoption by a container.
    pub(crate) fn into_parts(self) -> (usize, Vec<Chunk>) {
        (self.size as usize, self.chunks)
    }
}
