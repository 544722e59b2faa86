// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::{DecodeError, EncodeError},
    Method,
};

/// Represents errors that can occur in the hash table
#[derive(Debug)]
pub enum Error {
    /// I/O error, including short reads past the end of the file
    Io(std::io::Error),

    /// Serialization failed
    Encode(EncodeError),

    /// Deserialization failed
    Decode(DecodeError),

    /// The table was configured with zero buckets
    ZeroCapacity,

    /// An existing file was created with a different capacity
    CapacityMismatch {
        /// Capacity stored in the file header
        stored: u32,

        /// Capacity the table was opened with
        configured: u32,
    },

    /// The file length does not fit the layout of the configured method
    InvalidLayout {
        /// Method the table was opened with
        method: Method,

        /// Actual file length in bytes
        len: u64,
    },

    /// A bucket chain links outside the overflow zone or loops
    CorruptChain {
        /// Bucket index whose chain is broken
        bucket: u32,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashFileError: {self:?}")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<EncodeError> for Error {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<DecodeError> for Error {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;
