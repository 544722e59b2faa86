// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::{Decode, DecodeError, Encode, EncodeError, FixedSize},
    offset::Link,
    Entry,
};
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Entry-bearing table record
///
/// Used for the primary array of the slot-based methods and for every
/// record in the overflow zone.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Slot {
    /// If `false`, `entry` is logically absent, whatever its bytes are
    pub filled: bool,

    /// Stored entry
    pub entry: Entry,

    /// Next record in the chain (chaining methods only)
    pub link: Link,
}

impl Slot {
    /// Creates a filled slot.
    #[must_use]
    pub fn filled(entry: Entry, link: Link) -> Self {
        Self {
            filled: true,
            entry,
            link,
        }
    }

    /// Returns `true` if the slot is filled and holds `id`.
    #[must_use]
    pub fn matches(&self, id: u32) -> bool {
        self.filled && self.entry.id == id
    }
}

impl FixedSize for Slot {
    const SERIALIZED_LEN: usize =
        std::mem::size_of::<u8>() + Entry::SERIALIZED_LEN + std::mem::size_of::<u64>();
}

impl Encode for Slot {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_u8(u8::from(self.filled))?;
        self.entry.encode_into(writer)?;
        self.link.encode_into(writer)?;
        Ok(())
    }
}

impl Decode for Slot {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let filled = match reader.read_u8()? {
            0 => false,
            1 => true,
            tag => return Err(DecodeError::InvalidTag(("Slot", tag))),
        };

        let entry = Entry::decode_from(reader)?;
        let link = Link::decode_from(reader)?;

        Ok(Self {
            filled,
            entry,
            link,
        })
    }
}

/// Entry-less bucket record of the chaining method without head records
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BucketPointer {
    /// First node of the bucket's chain, `None` if the bucket is empty
    pub head: Link,
}

impl FixedSize for BucketPointer {
    const SERIALIZED_LEN: usize = std::mem::size_of::<u64>();
}

impl Encode for BucketPointer {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        self.head.encode_into(writer)
    }
}

impl Decode for BucketPointer {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        Ok(Self {
            head: Link::decode_from(reader)?,
        })
    }
}
