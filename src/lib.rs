//! BitArray - compact fixed-length bit container with file persistence.
//!
//! A `BitArray` stores a fixed number of logical bits packed into byte
//! chunks, eight bits per chunk. It is built for workloads that hold many
//! large boolean masks: membership filters, occupancy grids, validity masks.
//!
//! # Key Characteristics
//!
//! - 1 bit of storage per logical bit (plus at most 7 padding bits)
//! - Checked single-bit access returning typed errors, never panics
//! - Population count via hardware popcount over whole chunks
//! - Advisory read-only gate for handing out arrays that must not change
//! - Save/load to a validated on-disk format, raw or gzip-compressed
//!
//! # Examples
//!
//! ```
//! use bitarray::BitArray;
//!
//! let mut ba = BitArray::new(1024);
//! ba.set(10, true)?;
//! ba.set(20, true)?;
//! ba.set(30, true)?;
//!
//! assert_eq!(ba.bitcount(), 3);
//! assert!(ba.get(20)?);
//!
//! ba.set(20, false)?;
//! assert_eq!(ba.bitcount(), 2);
//! # Ok::<(), bitarray::BitArrayError>(())
//! ```
//!
//! ## Persistence
//!
//! ```no_run
//! use bitarray::BitArray;
//!
//! let mut ba = BitArray::new(100_000);
//! ba.set(12_345, true)?;
//! ba.save("mask.bits", true)?;
//!
//! let restored = BitArray::from_file("mask.bits")?;
//! assert_eq!(restored.size(), 100_000);
//! assert!(restored.get(12_345)?);
//! # Ok::<(), bitarray::BitArrayError>(())
//! ```
//!
//! # Concurrency
//!
//! There is no interior mutability and no internal locking. Shared
//! references permit reads; any mutation requires `&mut BitArray`, so the
//! borrow checker enforces exclusive access to a writer.

pub mod bitarray;
pub mod error;
pub mod format;

pub use bitarray::{BitArray, Chunk, BITS_PER_CHUNK};
pub use error::{BitArrayError, Result};
pub use format::{BitArrayImage, FORMAT_VERSION, MAGIC};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
