// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{find_in_chain, Bucket, Insertion, Located, Predecessor, ResolutionPolicy};
use crate::{entry::EntryId, layout::Layout, slot::Slot, store::FileStore, Entry};

/// Chaining with head records
///
/// The bucket record stores the first entry of its chain and links to the
/// rest. New collisions are spliced in right after the head, so the chain
/// behind the head is ordered newest first:
///
/// ```text
/// [head A] -> [D] -> [C] -> [B]
/// ```
///
/// Removing the head promotes the second node into the bucket record.
/// Detached zone records are never reused.
#[derive(Copy, Clone, Debug)]
pub struct ChainHead {
    layout: Layout,
}

impl ChainHead {
    /// Creates the policy over `layout`.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

impl ResolutionPolicy for ChainHead {
    fn insert(
        &self,
        store: &FileStore,
        bucket: Bucket,
        entry: &Entry,
    ) -> crate::Result<Insertion> {
        let mut head: Slot = store.read_record(bucket.offset)?;

        if !head.filled {
            store.write_record(bucket.offset, &Slot::filled(entry.clone(), None))?;
            return Ok(Insertion::Inserted);
        }

        let offset = store.append_offset(self.layout.zone_start())?;
        store.write_record(offset, &Slot::filled(entry.clone(), head.link))?;

        head.link = Some(offset);
        store.write_record(bucket.offset, &head)?;

        log::trace!(
            "bucket {} occupied, linked {} at {offset}",
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
        let head: Slot = store.read_record(bucket.offset)?;

        // NOTE: An empty head always has an empty chain
        if !head.filled {
            return Ok(None);
        }

        if head.entry.id == id {
            return Ok(Some(Located {
                offset: bucket.offset,
                slot: head,
                predecessor: Predecessor::Bucket,
            }));
        }

        let link = head.link;

        find_in_chain(
            store,
            &self.layout,
            bucket,
            link,
            Predecessor::Node(bucket.offset, head),
            id,
        )
    }

    fn remove(&self, store: &FileStore, bucket: Bucket, found: Located) -> crate::Result<()> {
        match found.predecessor {
            Predecessor::Bucket => {
                if let Some(next) = found.slot.link {
                    let promoted: Slot = store.read_record(next)?;
                    store.write_record(bucket.offset, &promoted)?;

                    log::trace!(
                        "promoted {} from {next} to head of bucket {}",
                        promoted.entry.id,
                        bucket.index,
                    );
                } else {
                    let mut head = found.slot;
                    head.filled = false;
                    store.write_record(bucket.offset, &head)?;
                }
            }
            Predecessor::Node(offset, mut parent) => {
                parent.link = found.slot.link;
                store.write_record(offset, &parent)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        policy::{tests::Fixture, Insertion, Predecessor},
        slot::Slot,
        Method,
    };
    use test_log::test;

    fn chain_ids(fixture: &Fixture) -> crate::Result<Vec<u32>> {
        let head: Slot = fixture.store.read_record(fixture.bucket().offset)?;
        let mut ids = vec![];

        if !head.filled {
            return Ok(ids);
        }
        ids.push(head.entry.id);

        let mut link = head.link;
        while let Some(offset) = link {
            let slot: Slot = fixture.store.read_record(offset)?;
            ids.push(slot.entry.id);
            link = slot.link;
        }

        Ok(ids)
    }

    #[test]
    fn chain_head_splices_after_head() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;

        assert_eq!(Insertion::Inserted, fixture.insert(1)?);
        assert_eq!(Insertion::Collided, fixture.insert(2)?);
        assert_eq!(Insertion::Collided, fixture.insert(3)?);
        assert_eq!(Insertion::Collided, fixture.insert(4)?);

        assert_eq!(vec![1, 4, 3, 2], chain_ids(&fixture)?);
        assert_eq!(3, fixture.zone_records()?);

        Ok(())
    }

    #[test]
    fn chain_head_locate_reports_parent() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;
        fixture.insert(1)?;
        fixture.insert(2)?;
        fixture.insert(3)?;

        let head = fixture.locate(1)?.expect("should exist");
        assert!(matches!(head.predecessor, Predecessor::Bucket));

        // 1 -> 3 -> 2
        let last = fixture.locate(2)?.expect("should exist");
        let middle = fixture.locate(3)?.expect("should exist");

        match last.predecessor {
            Predecessor::Node(offset, parent) => {
                assert_eq!(middle.offset, offset);
                assert_eq!(3, parent.entry.id);
            }
            Predecessor::Bucket => panic!("should have a parent node"),
        }

        Ok(())
    }

    #[test]
    fn chain_head_remove_head_promotes_second() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;
        fixture.insert(1)?;
        fixture.insert(2)?;

        assert!(fixture.remove(1)?);

        let head = fixture.locate(2)?.expect("should exist");
        assert_eq!(fixture.bucket().offset, head.offset);
        assert!(head.slot.link.is_none());
        assert!(fixture.locate(1)?.is_none());
        assert_eq!(vec![2], chain_ids(&fixture)?);

        Ok(())
    }

    #[test]
    fn chain_head_remove_single_head() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;
        fixture.insert(1)?;

        assert!(fixture.remove(1)?);
        assert!(fixture.locate(1)?.is_none());
        assert_eq!(Vec::<u32>::new(), chain_ids(&fixture)?);

        assert_eq!(Insertion::Inserted, fixture.insert(5)?);

        Ok(())
    }

    #[test]
    fn chain_head_remove_inner_nodes() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;
        for id in 1..=5 {
            fixture.insert(id)?;
        }
        assert_eq!(vec![1, 5, 4, 3, 2], chain_ids(&fixture)?);

        assert!(fixture.remove(4)?);
        assert_eq!(vec![1, 5, 3, 2], chain_ids(&fixture)?);

        assert!(fixture.remove(2)?);
        assert_eq!(vec![1, 5, 3], chain_ids(&fixture)?);

        assert!(fixture.remove(5)?);
        assert_eq!(vec![1, 3], chain_ids(&fixture)?);

        assert!(!fixture.remove(4)?);

        for id in [1, 3] {
            assert!(fixture.locate(id)?.is_some());
        }

        Ok(())
    }

    #[test]
    fn chain_head_insert_after_promotion() -> crate::Result<()> {
        let fixture = Fixture::new(Method::ChainHead, 4)?;
        fixture.insert(1)?;
        fixture.insert(2)?;
        fixture.insert(3)?;

        // 1 -> 3 -> 2, becomes 3 -> 2
        fixture.remove(1)?;
        assert_eq!(vec![3, 2], chain_ids(&fixture)?);

        assert_eq!(Insertion::Collided, fixture.insert(4)?);
        assert_eq!(vec![3, 4, 2], chain_ids(&fixture)?);

        // Orphaned node of 3 stays in the zone
        assert_eq!(3, fixture.zone_records()?);

        Ok(())
    }
}
