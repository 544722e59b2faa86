// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::FixedSize,
    entry::EntryId,
    header::FileHeader,
    layout::Layout,
    policy::{AnyPolicy, Bucket, Insertion, ResolutionPolicy},
    store::FileStore,
    Config, Entry, HashFunction, Method,
};
use std::path::Path;

/// A disk-resident hash table
///
/// The table exclusively owns its file for its whole lifetime. The file is
/// closed when the table is dropped.
#[derive(Debug)]
pub struct Table {
    store: FileStore,
    layout: Layout,
    method: Method,
    hash_function: HashFunction,
    policy: AnyPolicy,
}

impl Table {
    /// Opens the table file at `config.path`.
    ///
    /// An empty (or new) file is initialized with a header and a zeroed
    /// primary array. A non-empty file is reused as-is, after checking it
    /// matches the configured capacity and method.
    pub(crate) fn open(config: Config) -> crate::Result<Self> {
        log::debug!("Opening table at {}", config.path.display());

        if config.capacity == 0 {
            return Err(crate::Error::ZeroCapacity);
        }

        let store = FileStore::open(&config.path, config.truncate)?;
        let layout = Layout::new(config.method, config.capacity);

        let table = Self {
            store,
            layout,
            method: config.method,
            hash_function: config.hash_function,
            policy: AnyPolicy::new(config.method, layout),
        };

        if table.store.is_empty()? {
            table.create_new()?;
        } else {
            table.recover()?;
        }

        Ok(table)
    }

    /// Writes the header and an empty primary array.
    fn create_new(&self) -> crate::Result<()> {
        log::trace!(
            "Creating {} table with {} buckets at {}",
            self.method,
            self.capacity(),
            self.path().display(),
        );

        // NOTE: Empty slots and bucket pointers encode to all zeroes, so
        // extending the file yields an empty primary array
        self.store.set_len(self.layout.zone_start().get())?;

        self.store.write_record_at(
            0,
            &FileHeader {
                capacity: self.capacity(),
            },
        )?;

        Ok(())
    }

    /// Validates an existing file against the configured layout.
    fn recover(&self) -> crate::Result<()> {
        let len = self.store.len()?;

        if len < FileHeader::SERIALIZED_LEN as u64 {
            return Err(crate::Error::InvalidLayout {
                method: self.method,
                len,
            });
        }

        let header: FileHeader = self.store.read_record_at(0)?;

        if header.capacity != self.capacity() {
            return Err(crate::Error::CapacityMismatch {
                stored: header.capacity,
                configured: self.capacity(),
            });
        }

        if !self.layout.fits(len) {
            return Err(crate::Error::InvalidLayout {
                method: self.method,
                len,
            });
        }

        log::debug!(
            "Recovered {} table at {} with {} zone records",
            self.method,
            self.path().display(),
            self.layout.zone_records(len),
        );

        Ok(())
    }

    fn bucket(&self, id: EntryId) -> Bucket {
        let index = self.bucket_index(id);

        Bucket {
            index,
            offset: self.layout.bucket_offset(index),
        }
    }

    /// Home bucket index of `id`.
    #[must_use]
    pub fn bucket_index(&self, id: EntryId) -> u32 {
        self.layout.bucket_index(self.hash_function.hash(id))
    }

    /// Inserts an entry.
    ///
    /// The caller guarantees that no live entry with the same identifier
    /// exists; only the direct method notices a duplicate (as a collision).
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn insert(&mut self, entry: &Entry) -> crate::Result<Insertion> {
        let bucket = self.bucket(entry.id);
        let insertion = self.policy.insert(&self.store, bucket, entry)?;

        if insertion == Insertion::Rejected {
            log::warn!(
                "Rejected entry {} (line {}), bucket {} is occupied",
                entry.id,
                entry.line,
                bucket.index,
            );
        }

        Ok(insertion)
    }

    /// Retrieves the entry with the given identifier.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn search(&self, id: EntryId) -> crate::Result<Option<Entry>> {
        let bucket = self.bucket(id);

        Ok(self
            .policy
            .locate(&self.store, bucket, id)?
            .map(|found| found.slot.entry))
    }

    /// Returns `true` if an entry with the given identifier exists.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn contains(&self, id: EntryId) -> crate::Result<bool> {
        self.search(id).map(|entry| entry.is_some())
    }

    /// Removes the entry with the given identifier, returning it.
    ///
    /// The space of the removed record is not reclaimed.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn remove(&mut self, id: EntryId) -> crate::Result<Option<Entry>> {
        let bucket = self.bucket(id);

        let Some(found) = self.policy.locate(&self.store, bucket, id)? else {
            return Ok(None);
        };

        log::trace!("Removing {id} at {} from bucket {}", found.offset, bucket.index);

        let entry = found.slot.entry.clone();
        self.policy.remove(&self.store, bucket, found)?;

        Ok(Some(entry))
    }

    /// Number of buckets.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.layout.capacity()
    }

    /// Collision resolution method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Hash function.
    #[must_use]
    pub fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Path of the table file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Size of the table file in bytes.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn disk_space(&self) -> crate::Result<u64> {
        Ok(self.store.len()?)
    }

    /// Number of records in the overflow zone, including detached ones.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn overflow_records(&self) -> crate::Result<u64> {
        Ok(self.layout.zone_records(self.store.len()?))
    }

    /// Flushes the table file to disk.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn sync(&self) -> crate::Result<()> {
        Ok(self.store.sync()?)
    }
}
