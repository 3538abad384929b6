//! Error types for the bitarray crate.
//!
//! This module provides a unified error type for all operations on a
//! [`BitArray`](crate::BitArray), using the `thiserror` crate for ergonomic
//! error handling.

use thiserror::Error;

/// The main error type for bit array operations.
///
/// Every fallible operation in this crate reports one of these variants;
/// nothing is retried internally and no failure aborts the process.
#[derive(Error, Debug)]
pub enum BitArrayError {
    /// Bit index outside the logical range `[0, size)`
    #[error("index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds {
        /// The index that was accessed
        index: usize,
        /// The logical bit count of the array
        size: usize,
    },

    /// Mutation attempted while the read-only flag is set
    #[error("bit array is read-only")]
    ReadOnly,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error occurred while encoding a saved image
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// A loaded file is structurally invalid
    #[error("corrupt data: {0}")]
    CorruptData(String),
}

/// A specialized `Result` type for bit array operations.
///
/// This is a type alias for `Result<T, BitArrayError>` and is used
/// throughout the crate for consistency.
pub type Result<T> = std::result::Result<T, BitArrayError>;
