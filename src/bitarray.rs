//! BitArray - fixed-length boolean sequence packed into byte chunks.
//!
//! This module provides the core container: a sequence of `size` logical bits
//! stored in `ceil(size / 8)` bytes, with checked single-bit access, a
//! word-parallel population count, an advisory read-only gate, and file
//! persistence.
//!
//! # Design
//!
//! - Uses `Vec<u8>` for storage (8-bit chunks)
//! - Bit indexing: chunk_idx = bit_idx / 8, bit_offset = bit_idx % 8
//! - Little bit-ordering within a chunk: offset 0 is the least-significant
//!   bit, offset 7 the most-significant bit
//! - Every public bit operation validates its index and returns a typed
//!   error; there is no unchecked fast path
//!
//! # Examples
//!
//! ```
//! use bitarray::BitArray;
//!
//! let mut ba = BitArray::new(40);
//! ba.set(5, true)?;
//! ba.set(10, true)?;
//! assert!(ba.get(5)?);
//! assert_eq!(ba.bitcount(), 2);
//! # Ok::<(), bitarray::BitArrayError>(())
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{BitArrayError, Result};
use crate::format::BitArrayImage;

/// Chunk type for bit storage (8-bit unsigned integer)
pub type Chunk = u8;

/// Number of bits per chunk
pub const BITS_PER_CHUNK: usize = 8;

/// Get chunk index from bit position
#[inline(always)]
const fn chunk_idx(bit_pos: usize) -> usize {
    bit_pos >> 3 // bit_pos / 8
}

/// Get bit offset within chunk from bit position
#[inline(always)]
const fn bit_idx(bit_pos: usize) -> usize {
    bit_pos & 7 // bit_pos % 8
}

/// Create a chunk mask with `n` bits set (from LSB)
#[inline(always)]
pub(crate) const fn chunk_mask(n: usize) -> Chunk {
    if n == 0 {
        0
    } else if n >= BITS_PER_CHUNK {
        Chunk::MAX
    } else {
        Chunk::MAX >> (BITS_PER_CHUNK - n)
    }
}

/// Fixed-length packed bit sequence with byte-chunked storage.
///
/// The logical length is set at construction and never changes afterwards;
/// the only whole-container mutation is [`load`](BitArray::load), which
/// replaces the contents with a previously saved image. Bits past `size` in
/// the last chunk are padding and are kept zero by construction, by checked
/// writes, and by load-time validation.
///
/// All bit indices are 0-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitArray {
    /// Backing storage, exactly `size.div_ceil(8)` chunks
    chunks: Vec<Chunk>,
    /// Logical number of bits
    size: usize,
    /// Advisory mutation gate checked by `set`
    read_only: bool,
}

impl BitArray {
    /// Create a new `BitArray` with `size` bits, all initialized to 0.
    ///
    /// `size == 0` is valid and allocates no storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitarray::BitArray;
    ///
    /// let ba = BitArray::new(1024);
    /// assert_eq!(ba.size(), 1024);
    /// assert_eq!(ba.chunk_count(), 128);
    /// assert_eq!(ba.bitcount(), 0);
    /// ```
    pub fn new(size: usize) -> Self {
        let chunk_count = size.div_ceil(BITS_PER_CHUNK);
        Self {
            chunks: vec![0; chunk_count],
            size,
            read_only: false,
        }
    }

    /// Resolve a logical index to `(chunk index, bit offset)`.
    ///
    /// Mandatory on every public bit-level operation.
    #[inline]
    fn resolve(&self, index: usize) -> Result<(usize, usize)> {
        if index >= self.size {
            return Err(BitArrayError::IndexOutOfBounds {
                index,
                size: self.size,
            });
        }
        Ok((chunk_idx(index), bit_idx(index)))
    }

    // =========================================================================
    // Single Bit Operations
    // =========================================================================

    /// Get the bit at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BitArrayError::IndexOutOfBounds`] if `index >= size`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitarray::BitArray;
    ///
    /// let mut ba = BitArray::new(8);
    /// assert!(!ba.get(3)?);
    /// ba.set(3, true)?;
    /// assert!(ba.get(3)?);
    /// assert!(ba.get(8).is_err());
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Result<bool> {
        let (chunk, offset) = self.resolve(index)?;
        Ok((self.chunks[chunk] >> offset) & 1 == 1)
    }

    /// Set the bit at `index` to `value`.
    ///
    /// Exactly the addressed bit changes; every other bit of the chunk,
    /// padding included, is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BitArrayError::IndexOutOfBounds`] if `index >= size`, and
    /// [`BitArrayError::ReadOnly`] if the read-only flag is set. The index
    /// is resolved first; storage is never touched on either failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitarray::BitArray;
    ///
    /// let mut ba = BitArray::new(8);
    /// ba.set(3, true)?;
    /// assert_eq!(ba.bitcount(), 1);
    /// ba.set(3, false)?;
    /// assert_eq!(ba.bitcount(), 0);
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        let (chunk, offset) = self.resolve(index)?;
        if self.read_only {
            return Err(BitArrayError::ReadOnly);
        }
        if value {
            self.chunks[chunk] |= 1 << offset;
        } else {
            self.chunks[chunk] &= !(1 << offset);
        }
        Ok(())
    }

    // =========================================================================
    // Counting and Iteration
    // =========================================================================

    /// Count the number of set bits (population count).
    ///
    /// Sums a hardware popcount over every chunk. This is only correct
    /// because padding bits past `size` in the last chunk are invariantly
    /// zero; construction zero-fills, `set` rejects out-of-range indices,
    /// and `load` refuses images with nonzero padding.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitarray::BitArray;
    ///
    /// let mut ba = BitArray::new(5);
    /// ba.set(4, true)?;
    /// assert_eq!(ba.bitcount(), 1);
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    #[inline]
    pub fn bitcount(&self) -> usize {
        self.chunks.iter().map(|c| c.count_ones() as usize).sum()
    }

    /// Iterate over the logical bits in index order.
    ///
    /// Yields exactly `size` booleans; padding bits are not visited.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitarray::BitArray;
    ///
    /// let mut ba = BitArray::new(4);
    /// ba.set(1, true)?;
    /// let bits: Vec<bool> = ba.iter().collect();
    /// assert_eq!(bits, vec![false, true, false, false]);
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.chunks
            .iter()
            .flat_map(|&chunk| (0..BITS_PER_CHUNK).map(move |b| chunk & (1 << b) != 0))
            .take(self.size)
    }

    // =========================================================================
    // Read-Only Flag
    // =========================================================================

    /// Whether the read-only flag is set.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Set or clear the read-only flag.
    ///
    /// A pure flag toggle: it inspects and alters no storage. While the flag
    /// is set, every `set` call fails with [`BitArrayError::ReadOnly`];
    /// reads, counting, and `save` remain available, and the flag can be
    /// cleared again at any time.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitarray::BitArray;
    ///
    /// let mut ba = BitArray::new(8);
    /// ba.set_read_only(true);
    /// assert!(ba.set(0, true).is_err());
    /// ba.set_read_only(false);
    /// assert!(ba.set(0, true).is_ok());
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    #[inline]
    pub fn set_read_only(&mut self, value: bool) {
        self.read_only = value;
    }

    // =========================================================================
    // Information and Access
    // =========================================================================

    /// Get the logical number of bits.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the number of chunks in storage.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get direct read-only access to the chunk storage.
    ///
    /// The raw view includes any padding bits in the last chunk (always
    /// zero); the logical contents are the low `size` bits.
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Estimate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.chunks.capacity() * std::mem::size_of::<Chunk>()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save the contents to a file.
    ///
    /// Writes a headered image of the chunk storage, raw or inside a gzip
    /// container when `compressed` is true. The image always records the
    /// logical `size`, which the chunk count alone cannot recover when
    /// `size` is not a multiple of 8. The file handle is scoped to this
    /// call and closed on every exit path. See [`BitArrayImage`] for the
    /// format.
    ///
    /// # Errors
    ///
    /// Returns [`BitArrayError::Io`] if the path cannot be opened or
    /// written, preserving the underlying filesystem error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bitarray::BitArray;
    ///
    /// let mut ba = BitArray::new(1000);
    /// ba.set(123, true)?;
    /// ba.save("bits.raw", false)?;
    /// ba.save("bits.gz", true)?;
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P, compressed: bool) -> Result<()> {
        let image = BitArrayImage::new(self.size, self.chunks.clone());
        let bytes = image.to_bytes(compressed)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Construct a `BitArray` from a previously saved file.
    ///
    /// Accepts both flavors written by [`save`](BitArray::save); the
    /// container format is detected from the file contents. The returned
    /// array is writable regardless of the saved array's flag state.
    ///
    /// # Errors
    ///
    /// Returns [`BitArrayError::Io`] if the file cannot be opened or read,
    /// and [`BitArrayError::CorruptData`] if its contents are not a valid
    /// image.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bitarray::BitArray;
    ///
    /// let ba = BitArray::from_file("bits.raw")?;
    /// println!("{} of {} bits set", ba.bitcount(), ba.size());
    /// # Ok::<(), bitarray::BitArrayError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let image = BitArrayImage::from_bytes(&bytes)?;
        let (size, chunks) = image.into_parts();
        Ok(Self {
            chunks,
            size,
            read_only: false,
        })
    }

    /// Load previously saved contents, replacing the current state.
    ///
    /// This is a destructive wholesale overwrite of both the storage and the
    /// logical `size`, not a merge. The file is fully decoded and validated
    /// before anything is replaced, so on error the container is left
    /// exactly as it was. The read-only flag is container policy rather than
    /// data: it is not persisted and keeps its current value, so it does not
    /// gate this replacement but still applies to later `set` calls.
    ///
    /// # Errors
    ///
    /// Returns [`BitArrayError::Io`] if the file cannot be opened or read,
    /// and [`BitArrayError::CorruptData`] if its contents are not a valid
    /// image.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let loaded = Self::from_file(path)?;
        self.size = loaded.size;
        self.chunks = loaded.chunks;
        Ok(())
    }
}

impl fmt::Display for BitArray {
    /// Render the logical contents as `size` characters of `'0'`/`'1'`.
    ///
    /// Deliberately size-bounded: padding bits in the last chunk are not
    /// shown. Use [`BitArray::chunks`] to inspect the raw storage.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}
