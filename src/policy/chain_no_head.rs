// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{find_in_chain, Bucket, Insertion, Located, Predecessor, ResolutionPolicy};
use crate::{
    entry::EntryId,
    layout::Layout,
    slot::{BucketPointer, Slot},
    store::FileStore,
    Entry,
};

/// Chaining without head records
///
/// The primary array only holds [`BucketPointer`]s. Every entry is a node
/// in the zone, pushed to the front of its bucket's list, so chains are in
/// reverse insertion order.
#[derive(Copy, Clone, Debug)]
pub struct ChainNoHead {
    layout: Layout,
}

impl ChainNoHead {
    /// Creates the policy over `layout`.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

impl ResolutionPolicy for ChainNoHead {
    fn insert(
        &self,
        store: &FileStore,
        bucket: Bucket,
        entry: &Entry,
    ) -> crate::Result<Insertion> {
        let pointer: BucketPointer = store.read_record(bucket.offset)?;
        let old_head = pointer.head;

        let offset = store.append_offset(self.layout.zone_start())?;
        store.write_record(offset, &Slot::filled(entry.clone(), old_head))?;
        store.write_record(bucket.offset, &BucketPointer { head: Some(offset) })?;

        Ok(if old_head.is_some() {
            log::trace!("bucket {} non-empty, pushed {} at {offset}", bucket.index, entry.id);
            Insertion::Collided
        } else {
            Insertion::Inserted
        })
    }

    fn locate(
        &self,
        store: &FileStore,
        bucket: Bucket,
        id: EntryId,
    ) -> crate::Result<Option<Located>> {
        let pointer: BucketPointer = store.read_record(bucket.offset)?;

        find_in_chain(
            store,
            &self.layout,
            bucket,
            pointer.head,
            Predecessor::Bucket,
            id,
        )
    }

    fn remove(&self, store: &FileStore, bucket: Bucket, found: Located) -> crate::Result<()> {
        match found.predecessor {
            Predecessor::Bucket => {
                let pointer = BucketPointer {
                    head: found.slot.link,
                };
                store.write_record(bucket.offset, &pointer)?;
            }
            Predecessor::Node(offset, mut parent) => {
                parent.link = found.slot.link;
                store.write_record(offset, &parent)?;
            }
        }

        Ok(())
    }
}
