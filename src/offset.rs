// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, DecodeError, Encode, EncodeError};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::{
    io::{Read, Write},
    num::NonZeroU64,
};

/// Byte position of a record inside the table file
///
/// Offset `0` is always occupied by the file header, so no record can start
/// there. On disk, a link is a `u64` where `0` means "no successor", which
/// maps to `Option<FileOffset>`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FileOffset(NonZeroU64);

impl FileOffset {
    /// Wraps a raw byte position, `None` for the `0` sentinel.
    #[must_use]
    pub fn new(pos: u64) -> Option<Self> {
        NonZeroU64::new(pos).map(Self)
    }

    /// Returns the raw byte position.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for FileOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Forward link of a chain node or bucket
pub type Link = Option<FileOffset>;

pub(crate) fn link_to_raw(link: Link) -> u64 {
    link.map_or(0, FileOffset::get)
}

impl Encode for Link {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_u64::<LE>(link_to_raw(*self))?;
        Ok(())
    }
}

impl Decode for Link {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        Ok(FileOffset::new(reader.read_u64::<LE>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn offset_zero_is_sentinel() {
        assert_eq!(None, FileOffset::new(0));
        assert_eq!(Some(309), FileOffset::new(309).map(FileOffset::get));
    }

    #[test]
    fn link_encodes_none_as_zero() -> Result<(), DecodeError> {
        let none: Link = None;
        assert_eq!(vec![0u8; 8], none.encode_into_vec());

        let some = FileOffset::new(0x0102);
        let bytes = some.encode_into_vec();
        assert_eq!(vec![2u8, 1, 0, 0, 0, 0, 0, 0], bytes);
        assert_eq!(some, Link::decode_from(&mut &bytes[..])?);

        Ok(())
    }
}
