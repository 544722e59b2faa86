// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{vacate, Bucket, Insertion, Located, Predecessor, ResolutionPolicy};
use crate::{entry::EntryId, slot::Slot, store::FileStore, Entry};

/// No collision resolution
///
/// Every entry lives in its home bucket. Inserting into an occupied bucket
/// is rejected, nothing is ever written past the primary array.
#[derive(Copy, Clone, Debug, Default)]
pub struct Direct;

impl ResolutionPolicy for Direct {
    fn insert(
        &self,
        store: &FileStore,
        bucket: Bucket,
        entry: &Entry,
    ) -> crate::Result<Insertion> {
        let home: Slot = store.read_record(bucket.offset)?;

        if home.filled {
            log::trace!(
                "bucket {} holds {}, rejecting {}",
                bucket.index,
                home.entry.id,
                entry.id,
            );
            return Ok(Insertion::Rejected);
        }

        store.write_record(bucket.offset, &Slot::filled(entry.clone(), None))?;

        Ok(Insertion::Inserted)
    }

    fn locate(
        &self,
        store: &FileStore,
        bucket: Bucket,
        id: EntryId,
    ) -> crate::Result<Option<Located>> {
        let home: Slot = store.read_record(bucket.offset)?;

        Ok(home.matches(id).then_some(Located {
            offset: bucket.offset,
            slot: home,
            predecessor: Predecessor::Bucket,
        }))
    }

    fn remove(&self, store: &FileStore, _bucket: Bucket, found: Located) -> crate::Result<()> {
        vacate(store, found)
    }
}
