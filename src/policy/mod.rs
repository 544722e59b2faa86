// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Collision resolution policies.
//!
//! Each policy implements [`ResolutionPolicy`] over the same file layout
//! primitives; the table only computes the home bucket and dispatches.

mod chain_head;
mod chain_no_head;
mod direct;
mod zone;

pub use chain_head::ChainHead;
pub use chain_no_head::ChainNoHead;
pub use direct::Direct;
pub use zone::CollisionZone;

use crate::{
    entry::EntryId,
    layout::Layout,
    offset::{FileOffset, Link},
    slot::Slot,
    store::FileStore,
    Entry, Method,
};
use enum_dispatch::enum_dispatch;

/// Outcome of an insert
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Insertion {
    /// Stored, the home bucket was free
    Inserted,

    /// Stored, but the home bucket was already occupied
    Collided,

    /// Not stored, because the home bucket was already occupied
    Rejected,
}

impl Insertion {
    /// Returns `true` if the home bucket was occupied.
    #[must_use]
    pub fn collided(self) -> bool {
        !matches!(self, Self::Inserted)
    }

    /// Returns `true` if the entry was written.
    #[must_use]
    pub fn is_stored(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Home bucket of a key
#[derive(Copy, Clone, Debug)]
pub struct Bucket {
    /// Index into the primary array
    pub index: u32,

    /// Position of the bucket record
    pub offset: FileOffset,
}

/// Record that links to a located slot
#[derive(Clone, Debug)]
pub enum Predecessor {
    /// The slot is the bucket record itself, or the bucket pointer links to it
    Bucket,

    /// A chain node links to the slot
    Node(FileOffset, Slot),
}

/// A slot found by [`ResolutionPolicy::locate`]
#[derive(Clone, Debug)]
pub struct Located {
    /// Position of the slot
    pub offset: FileOffset,

    /// The slot, holding the searched entry
    pub slot: Slot,

    /// What links to the slot
    pub predecessor: Predecessor,
}

/// Insert, locate and remove over a table file
#[enum_dispatch]
pub trait ResolutionPolicy {
    /// Stores `entry`, whose home bucket is `bucket`.
    fn insert(&self, store: &FileStore, bucket: Bucket, entry: &Entry)
        -> crate::Result<Insertion>;

    /// Finds the live slot holding `id`.
    fn locate(
        &self,
        store: &FileStore,
        bucket: Bucket,
        id: EntryId,
    ) -> crate::Result<Option<Located>>;

    /// Detaches a slot previously returned by [`ResolutionPolicy::locate`].
    ///
    /// Detached zone records are not reclaimed.
    fn remove(&self, store: &FileStore, bucket: Bucket, found: Located) -> crate::Result<()>;
}

/// One of the four policies
#[enum_dispatch(ResolutionPolicy)]
#[derive(Clone, Debug)]
pub enum AnyPolicy {
    /// See [`Direct`]
    Direct(Direct),

    /// See [`CollisionZone`]
    CollisionZone(CollisionZone),

    /// See [`ChainHead`]
    ChainHead(ChainHead),

    /// See [`ChainNoHead`]
    ChainNoHead(ChainNoHead),
}

impl AnyPolicy {
    /// Creates the policy for `method` over `layout`.
    #[must_use]
    pub fn new(method: Method, layout: Layout) -> Self {
        match method {
            Method::Direct => Direct.into(),
            Method::CollisionZone => CollisionZone::new(layout).into(),
            Method::ChainHead => ChainHead::new(layout).into(),
            Method::ChainNoHead => ChainNoHead::new(layout).into(),
        }
    }
}

/// Marks a located slot as empty, in place.
///
/// The entry bytes stay on disk but are logically void.
fn vacate(store: &FileStore, found: Located) -> crate::Result<()> {
    let mut slot = found.slot;
    slot.filled = false;
    store.write_record(found.offset, &slot)
}

/// Follows zone links from `link` until a slot holding `id` is found.
///
/// Every link must point at a whole zone record, and a chain can never be
/// longer than the zone, otherwise the chain is corrupt.
fn find_in_chain(
    store: &FileStore,
    layout: &Layout,
    bucket: Bucket,
    mut link: Link,
    mut predecessor: Predecessor,
    id: EntryId,
) -> crate::Result<Option<Located>> {
    let len = store.len()?;
    let mut budget = layout.zone_records(len);

    while let Some(offset) = link {
        if budget == 0 || !layout.is_zone_record(offset, len) {
            log::error!(
                "bucket {} links to {offset}, outside of zone or in a cycle",
                bucket.index,
            );
            return Err(crate::Error::CorruptChain {
                bucket: bucket.index,
            });
        }
        budget -= 1;

        let slot: Slot = store.read_record(offset)?;

        if slot.matches(id) {
            return Ok(Some(Located {
                offset,
                slot,
                predecessor,
            }));
        }

        link = slot.link;
        predecessor = Predecessor::Node(offset, slot);
    }

    Ok(None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{coding::Encode, header::FileHeader, Method};
    use test_log::test;

    /// Table file with a zeroed primary array, and a policy over it
    pub struct Fixture {
        pub _dir: tempfile::TempDir,
        pub store: FileStore,
        pub layout: Layout,
        pub policy: AnyPolicy,
    }

    impl Fixture {
        pub fn new(method: Method, capacity: u32) -> crate::Result<Self> {
            let dir = tempfile::tempdir()?;
            let store = FileStore::open(dir.path().join("table.bin"), true)?;
            let layout = Layout::new(method, capacity);

            store.write_record_at(0, &FileHeader { capacity })?;

            #[allow(clippy::cast_possible_truncation)]
            let zeroes = vec![0; (layout.zone_start().get() - 4) as usize];
            store.write_at(4, &zeroes)?;

            Ok(Self {
                _dir: dir,
                store,
                layout,
                policy: AnyPolicy::new(method, layout),
            })
        }

        /// Every key lands in the same bucket
        pub fn bucket(&self) -> Bucket {
            Bucket {
                index: 1,
                offset: self.layout.bucket_offset(1),
            }
        }

        pub fn insert(&self, id: EntryId) -> crate::Result<Insertion> {
            self.policy
                .insert(&self.store, self.bucket(), &Entry::new(id, id))
        }

        pub fn locate(&self, id: EntryId) -> crate::Result<Option<Located>> {
            self.policy.locate(&self.store, self.bucket(), id)
        }

        pub fn remove(&self, id: EntryId) -> crate::Result<bool> {
            match self.locate(id)? {
                Some(found) => {
                    self.policy.remove(&self.store, self.bucket(), found)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        pub fn zone_records(&self) -> crate::Result<u64> {
            Ok(self.layout.zone_records(self.store.len()?))
        }
    }

    #[test]
    fn insertion_flags() {
        assert!(!Insertion::Inserted.collided());
        assert!(Insertion::Inserted.is_stored());

        assert!(Insertion::Collided.collided());
        assert!(Insertion::Collided.is_stored());

        assert!(Insertion::Rejected.collided());
        assert!(!Insertion::Rejected.is_stored());
    }

    #[test]
    fn chain_cycle_is_detected() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainNoHead, 4)?;
        fixture.insert(1)?;
        fixture.insert(2)?;

        // Let the older node link back to the newer one
        let zone_start = fixture.layout.zone_start();
        let newer = FileOffset::new(zone_start.get() + 309).expect("should be non-zero");
        let mut older: Slot = fixture.store.read_record(zone_start)?;
        older.link = Some(newer);
        fixture.store.write_record(zone_start, &older)?;

        assert!(matches!(
            fixture.locate(3),
            Err(crate::Error::CorruptChain { bucket: 1 })
        ));

        Ok(())
    }

    #[test]
    fn chain_link_outside_zone_is_detected() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;
        fixture.insert(1)?;

        let mut head: Slot = fixture.store.read_record(fixture.bucket().offset)?;
        head.link = FileOffset::new(4);
        fixture
            .store
            .write_at(fixture.bucket().offset.get(), &head.encode_into_vec())?;

        assert!(matches!(
            fixture.locate(2),
            Err(crate::Error::CorruptChain { bucket: 1 })
        ));

        Ok(())
    }
}
