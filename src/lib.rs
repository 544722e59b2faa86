// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A disk-resident hash table of fixed-size person records.
//!
//! ##### About
//!
//! This crate exports a [`Table`] that stores [`Entry`] records in a single
//! binary file, keyed by a 32-bit identifier.
//!
//! The file starts with a small header, followed by a primary array of
//! `capacity` buckets. A key is mapped to its home bucket by one of several
//! [`HashFunction`]s, reduced modulo the capacity.
//!
//! When two keys share a home bucket, the configured [`Method`] decides what
//! happens:
//!
//! - `Direct`: the second key is rejected
//! - `CollisionZone`: the key is appended to an overflow zone that is scanned linearly
//! - `ChainHead`: buckets hold the first entry and link to a chain in the overflow zone
//! - `ChainNoHead`: buckets only hold a pointer, every entry lives in the overflow zone
//!
//! All integers are stored little-endian and every record has a fixed size,
//! so the position of any bucket is computed, never searched for.
//!
//! Space of removed overflow records is never reclaimed, the file only grows.
//!
//! ```
//! # let folder = tempfile::tempdir()?;
//! use hashfile::{Config, Entry, Insertion, Method};
//!
//! let mut table = Config::new(folder.path().join("table.bin"))
//!     .capacity(100)
//!     .method(Method::ChainHead)
//!     .open()?;
//!
//! assert_eq!(Insertion::Inserted, table.insert(&Entry::new(1, 5).name("Ana"))?);
//! assert_eq!(Insertion::Collided, table.insert(&Entry::new(2, 105).name("Bia"))?);
//!
//! let entry = table.search(105)?.expect("should exist");
//! assert_eq!("Bia", entry.name.as_str());
//!
//! assert!(table.remove(5)?.is_some());
//! assert!(table.search(5)?.is_none());
//! #
//! # Ok::<(), hashfile::Error>(())
//! ```

#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::option_if_let_else)]
#![warn(clippy::redundant_feature_names)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

macro_rules! fail_iter {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => return Some(Err(e.into())),
        }
    };
}

#[doc(hidden)]
pub mod coding;

/// Configuration
mod config;

mod entry;
mod error;

/// Hash functions
pub mod hash;

#[doc(hidden)]
pub mod header;

/// Loading entries from CSV datasets
pub mod ingest;

#[doc(hidden)]
pub mod layout;

mod method;

#[doc(hidden)]
pub mod offset;

mod policy;

#[doc(hidden)]
pub mod slot;

#[doc(hidden)]
pub mod store;

mod table;

pub use {
    config::{Config, DEFAULT_CAPACITY},
    entry::{Entry, EntryId, Text},
    error::{Error, Result},
    hash::HashFunction,
    method::Method,
    policy::Insertion,
    table::Table,
};

#[doc(hidden)]
pub use offset::{FileOffset, Link};

#[doc(hidden)]
#[must_use]
#[allow(missing_docs, clippy::missing_errors_doc, clippy::unwrap_used)]
pub fn get_tmp_folder() -> tempfile::TempDir {
    if let Ok(p) = std::env::var("HASHFILE_TMP_FOLDER") {
        tempfile::tempdir_in(p)
    } else {
        tempfile::tempdir()
    }
    .unwrap()
}
