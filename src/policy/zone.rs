// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{vacate, Bucket, Insertion, Located, Predecessor, ResolutionPolicy};
use crate::{
    coding::FixedSize, entry::EntryId, layout::Layout, offset::FileOffset, slot::Slot,
    store::FileStore, Entry,
};

/// Collision zone
///
/// Colliding entries are appended to an unordered overflow zone after the
/// primary array. Lookups that miss the home bucket scan the whole zone,
/// so lookup cost grows linearly with the number of collisions.
#[derive(Copy, Clone, Debug)]
pub struct CollisionZone {
    layout: Layout,
}

impl CollisionZone {
    /// Creates the policy over `layout`.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    fn scan_zone(&self, store: &FileStore, id: EntryId) -> crate::Result<Option<Located>> {
        let len = store.len()?;
        let record_len = Slot::SERIALIZED_LEN as u64;

        let mut pos = self.layout.zone_start().get();

        while pos + record_len <= len {
            let slot: Slot = store.read_record_at(pos)?;

            if slot.matches(id) {
                // NOTE: The zone starts after the header
                #[allow(clippy::expect_used)]
                let offset = FileOffset::new(pos).expect("zone offset is non-zero");

                return Ok(Some(Located {
                    offset,
                    slot,
                    predecessor: Predecessor::Bucket,
                }));
            }

            pos += record_len;
        }

        Ok(None)
    }
}

impl ResolutionPolicy for CollisionZone {
    fn insert(
        &self,
        store: &FileStore,
        bucket: Bucket,
        entry: &Entry,
    ) -> crate::Result<Insertion> {
        let home: Slot = store.read_record(bucket.offset)?;

        if !home.filled {
            store.write_record(bucket.offset, &Slot::filled(entry.clone(), None))?;
            return Ok(Insertion::Inserted);
        }

        let offset = store.append_offset(self.layout.zone_start())?;
        store.write_record(offset, &Slot::filled(entry.clone(), None))?;

        log::trace!(
            "bucket {} occupied, appended {} to zone at {offset}",
            bucket.index,
            entry.id,
        );

        Ok(Insertion::Collided)
    }

    fn locate(
        &self,
        store: &FileStore,
        bucket: Bucket,
        id: EntryId,
    ) -> crate::Result<Option<Located>> {
        let home: Slot = store.read_record(bucket.offset)?;

        if home.matches(id) {
            return Ok(Some(Located {
                offset: bucket.offset,
                slot: home,
                predecessor: Predecessor::Bucket,
            }));
        }

        self.scan_zone(store, id)
    }

    fn remove(&self, store: &FileStore, _bucket: Bucket, found: Located) -> crate::Result<()> {
        vacate(store, found)
    }
}
