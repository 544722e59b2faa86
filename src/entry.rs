// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, DecodeError, Encode, EncodeError, FixedSize};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};

/// Identifier of an [`Entry`], the table key
pub type EntryId = u32;

/// Fixed-capacity UTF-8 text buffer
///
/// Stored as exactly `N` bytes, zero padded. The text ends at the first
/// zero byte, or at the end of the buffer.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Text<const N: usize>([u8; N]);

impl<const N: usize> Default for Text<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Text<N> {
    /// Creates a text buffer, truncating `s` to at most `N` bytes.
    ///
    /// Truncation never splits a character.
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self::truncated(s, N)
    }

    /// Creates a text buffer, truncating `s` to at most `limit` bytes (and `N`).
    #[must_use]
    pub fn truncated(s: &str, limit: usize) -> Self {
        let mut end = s.len().min(limit).min(N);
        while !s.is_char_boundary(end) {
            end -= 1;
        }

        let mut buf = [0; N];

        if let (Some(dst), Some(src)) = (buf.get_mut(..end), s.as_bytes().get(..end)) {
            dst.copy_from_slice(src);
        }

        Self(buf)
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(N);

        // NOTE: The buffer is only ever filled from a &str or validated on decode
        self.0
            .get(..len)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or_default()
    }
}

impl<const N: usize> std::fmt::Debug for Text<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> std::fmt::Display for Text<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<const N: usize> Encode for Text<N> {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_all(&self.0)?;
        Ok(())
    }
}

impl<const N: usize> Decode for Text<N> {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let mut buf = [0; N];
        reader.read_exact(&mut buf)?;

        let len = buf.iter().position(|&b| b == 0).unwrap_or(N);
        if let Some(bytes) = buf.get(..len) {
            std::str::from_utf8(bytes)?;
        }

        Ok(Self(buf))
    }
}

/// A person record, keyed by [`Entry::id`]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    /// Line number of the record in its source dataset
    pub line: u32,

    /// Identifier, the table key
    pub id: EntryId,

    /// Street address
    pub address: Text<128>,

    /// Birth date as written in the source
    pub birthdate: Text<20>,

    /// Full name
    pub name: Text<64>,

    /// E-mail address
    pub email: Text<64>,

    /// Phone number
    pub phone: Text<16>,
}

impl Entry {
    /// Creates an entry with empty text fields.
    #[must_use]
    pub fn new(line: u32, id: EntryId) -> Self {
        Self {
            line,
            id,
            ..Default::default()
        }
    }

    /// Sets the address.
    #[must_use]
    pub fn address(mut self, address: &str) -> Self {
        self.address = Text::new(address);
        self
    }

    /// Sets the birth date.
    #[must_use]
    pub fn birthdate(mut self, birthdate: &str) -> Self {
        self.birthdate = Text::new(birthdate);
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Text::new(name);
        self
    }

    /// Sets the e-mail address.
    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.email = Text::new(email);
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn phone(mut self, phone: &str) -> Self {
        self.phone = Text::new(phone);
        self
    }
}

impl FixedSize for Entry {
    const SERIALIZED_LEN: usize = std::mem::size_of::<u32>()
        + std::mem::size_of::<EntryId>()
        + 128
        + 20
        + 64
        + 64
        + 16;
}

impl Encode for Entry {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_u32::<LE>(self.line)?;
        writer.write_u32::<LE>(self.id)?;

        self.address.encode_into(writer)?;
        self.birthdate.encode_into(writer)?;
        self.name.encode_into(writer)?;
        self.email.encode_into(writer)?;
        self.phone.encode_into(writer)?;

        Ok(())
    }
}

impl Decode for Entry {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let line = reader.read_u32::<LE>()?;
        let id = reader.read_u32::<LE>()?;

        Ok(Self {
            line,
            id,
            address: Text::decode_from(reader)?,
            birthdate: Text::decode_from(reader)?,
            name: Text::decode_from(reader)?,
            email: Text::decode_from(reader)?,
            phone: Text::decode_from(reader)?,
        })
    }
}
