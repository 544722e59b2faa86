// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, DecodeError, Encode, EncodeError, FixedSize};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};

/// Header at the start of every table file, written once on creation
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FileHeader {
    /// Number of buckets in the primary array
    pub capacity: u32,
}

impl FixedSize for FileHeader {
    const SERIALIZED_LEN: usize = std::mem::size_of::<u32>();
}

impl Encode for FileHeader {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_u32::<LE>(self.capacity)?;
        Ok(())
    }
}

impl Decode for FileHeader {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let capacity = reader.read_u32::<LE>()?;
        Ok(Self { capacity })
    }
}
