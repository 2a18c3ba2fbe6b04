//! Shared id newtypes used across the grid model, word supply and engine.
//!
//! These are thin wrappers around `usize` rather than bare indices so that a
//! `SlotId` can't accidentally be passed where an `EntryId` is expected (or
//! vice versa); the CSP engine juggles several different index spaces at
//! once and that mistake is easy to make.

use std::fmt;

/// The maximum supported slot length. Grid sizes are bounded accordingly.
pub const MAX_SLOT_LENGTH: usize = 21;

macro_rules! index_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub usize);

        impl $name {
            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_type!(SlotId);
index_type!(CrossingId);
index_type!(EntryId);

/// Orientation of a slot within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Across,
    Down,
}

impl Orientation {
    #[must_use]
    pub fn perpendicular(self) -> Orientation {
        match self {
            Orientation::Across => Orientation::Down,
            Orientation::Down => Orientation::Across,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Across => write!(f, "Across"),
            Orientation::Down => write!(f, "Down"),
        }
    }
}
