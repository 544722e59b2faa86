// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::str::FromStr;

/// Collision resolution method
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// No resolution: an insert into an occupied bucket is rejected
    #[default]
    Direct,

    /// Colliding entries are appended to an overflow zone that is scanned linearly
    CollisionZone,

    /// Each bucket stores the first entry and links to its chain in the zone
    ChainHead,

    /// Each bucket only points to its chain, all entries live in the zone
    ChainNoHead,
}

impl Method {
    /// All methods
    pub const ALL: [Self; 4] = [
        Self::Direct,
        Self::CollisionZone,
        Self::ChainHead,
        Self::ChainNoHead,
    ];

    /// Stable name, used in file names and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::CollisionZone => "collision-zone",
            Self::ChainHead => "chain-head",
            Self::ChainNoHead => "chain-no-head",
        }
    }

    /// Returns `true` if the primary array holds bucket pointers instead of slots.
    #[must_use]
    pub fn uses_bucket_pointers(self) -> bool {
        matches!(self, Self::ChainNoHead)
    }

    /// Returns `true` if records are ever appended past the primary array.
    #[must_use]
    pub fn uses_zone(self) -> bool {
        !matches!(self, Self::Direct)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown collision resolution method {s:?}"))
    }
}
