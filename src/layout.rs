// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::FixedSize,
    header::FileHeader,
    offset::FileOffset,
    slot::{BucketPointer, Slot},
    Method,
};

/// Byte layout of a table file
///
/// ```text
/// [header][bucket 0]..[bucket capacity-1][zone slot 0][zone slot 1]..
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    method: Method,
    capacity: u32,
}

impl Layout {
    /// Creates the layout of a table with `capacity` buckets.
    #[must_use]
    pub fn new(method: Method, capacity: u32) -> Self {
        debug_assert!(capacity > 0);
        Self { method, capacity }
    }

    /// Number of buckets.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Size of one primary array record.
    #[must_use]
    pub fn bucket_len(&self) -> u64 {
        let len = if self.method.uses_bucket_pointers() {
            BucketPointer::SERIALIZED_LEN
        } else {
            Slot::SERIALIZED_LEN
        };
        len as u64
    }

    /// Size of one overflow zone record.
    #[must_use]
    pub fn zone_record_len(&self) -> u64 {
        Slot::SERIALIZED_LEN as u64
    }

    /// Bucket index of a hash digest.
    #[must_use]
    pub fn bucket_index(&self, digest: u32) -> u32 {
        digest % self.capacity
    }

    /// Position of bucket `index`.
    #[must_use]
    pub fn bucket_offset(&self, index: u32) -> FileOffset {
        debug_assert!(index < self.capacity);

        let pos = FileHeader::SERIALIZED_LEN as u64 + u64::from(index) * self.bucket_len();

        // NOTE: The header occupies the first bytes, so a bucket never starts at 0
        #[allow(clippy::expect_used)]
        FileOffset::new(pos).expect("header has non-zero length")
    }

    /// Start of the overflow zone, directly after the primary array.
    #[must_use]
    pub fn zone_start(&self) -> FileOffset {
        let pos = FileHeader::SERIALIZED_LEN as u64 + u64::from(self.capacity) * self.bucket_len();

        #[allow(clippy::expect_used)]
        FileOffset::new(pos).expect("header has non-zero length")
    }

    /// Number of records past the zone start in a file of `len` bytes.
    #[must_use]
    pub fn zone_records(&self, len: u64) -> u64 {
        len.saturating_sub(self.zone_start().get()) / self.zone_record_len()
    }

    /// Returns `true` if `offset` is the start of a zone record inside a file of `len` bytes.
    #[must_use]
    pub fn is_zone_record(&self, offset: FileOffset, len: u64) -> bool {
        let zone_start = self.zone_start().get();
        let pos = offset.get();

        pos >= zone_start
            && (pos - zone_start) % self.zone_record_len() == 0
            && pos + self.zone_record_len() <= len
    }

    /// Returns `true` if a file of `len` bytes can hold this layout.
    ///
    /// The primary array must be complete and the zone must consist of whole
    /// records. Direct tables never have a zone.
    #[must_use]
    pub fn fits(&self, len: u64) -> bool {
        let zone_start = self.zone_start().get();

        if len < zone_start {
            return false;
        }

        if self.method.uses_zone() {
            (len - zone_start) % self.zone_record_len() == 0
        } else {
            len == zone_start
        }
    }
}
