// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{HashFunction, Method, Table};
use std::path::{Path, PathBuf};

/// Default number of buckets
pub const DEFAULT_CAPACITY: u32 = 10_000;

/// Table configuration builder
#[derive(Clone, Debug)]
pub struct Config {
    /// Table file path
    #[doc(hidden)]
    pub path: PathBuf,

    /// Number of buckets in the primary array
    ///
    /// Once set, the capacity is fixed (in the file header)
    pub capacity: u32,

    /// Hash function keys are hashed with
    pub hash_function: HashFunction,

    /// Collision resolution method
    ///
    /// The method is not stored in the file, it has to match on every open
    pub method: Method,

    /// Discard existing file contents on open
    pub truncate: bool,
}

impl Config {
    /// Initializes a new config
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().into(),
            capacity: DEFAULT_CAPACITY,
            hash_function: HashFunction::default(),
            method: Method::default(),
            truncate: false,
        }
    }

    /// Sets the number of buckets.
    ///
    /// Defaults to 10000.
    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the hash function.
    ///
    /// Defaults to [`HashFunction::Division`].
    #[must_use]
    pub fn hash_function(mut self, hash_function: HashFunction) -> Self {
        self.hash_function = hash_function;
        self
    }

    /// Sets the collision resolution method.
    ///
    /// Defaults to [`Method::Direct`].
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// If `true`, an existing file is emptied and a fresh table is created.
    ///
    /// Defaults to `false`, which reopens an existing table.
    #[must_use]
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Opens a table using the config.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs, or an existing file does not
    /// match the configured capacity and method.
    pub fn open(self) -> crate::Result<Table> {
        Table::open(self)
    }
}
